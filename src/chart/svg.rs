//! Plotters-powered SVG rendering for the browser dashboard.
//!
//! Every chart is drawn into an in-memory SVG string with a light grey plot
//! area, white grid lines and a muted categorical palette. Bars, boxes and
//! pie sectors are drawn from basic elements (rectangles, paths, polygons),
//! so only the `line_series` and `svg_backend` Plotters features are needed.

use std::error::Error;
use std::f64::consts::PI;

use plotters::chart::ChartContext;
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::FontStyle;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::analysis::format_thousands;
use crate::chart::{BarChart, BoxChart, ChartSpec, HistogramChart, LineChart, PieChart};
use crate::error::AppError;

type DrawResult = Result<(), Box<dyn Error>>;

const PLOT_BACKGROUND: RGBColor = RGBColor(234, 234, 242);
const TEXT_COLOR: RGBColor = RGBColor(38, 38, 38);
const PALETTE: [RGBColor; 10] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
    RGBColor(218, 139, 195),
    RGBColor(140, 140, 140),
    RGBColor(204, 185, 116),
    RGBColor(100, 181, 205),
];

const FONT: &str = "sans-serif";
const MAX_X_LABELS: usize = 10;

pub fn palette(idx: usize) -> RGBColor {
    PALETTE[idx % PALETTE.len()]
}

/// Render a chart into a standalone `<svg>` document.
pub fn render(spec: &ChartSpec, size: (u32, u32)) -> Result<String, AppError> {
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, size).into_drawing_area();
        let drawn = root
            .fill(&WHITE)
            .map_err(|e| -> Box<dyn Error> { Box::new(e) })
            .and_then(|_| {
                if spec.is_empty() {
                    draw_empty(&root, spec.title())
                } else {
                    match spec {
                        ChartSpec::Line(c) => draw_line(&root, c),
                        ChartSpec::Bar(c) => draw_bar(&root, c),
                        ChartSpec::Pie(c) => draw_pie(&root, c),
                        ChartSpec::Histogram(c) => draw_histogram(&root, c),
                        ChartSpec::Box(c) => draw_box(&root, c),
                    }
                }
            });
        drawn.map_err(|e| AppError::runtime(format!("Failed to render chart '{}': {e}", spec.title())))?;
        root.present()
            .map_err(|e| AppError::runtime(format!("Failed to finish chart '{}': {e}", spec.title())))?;
    }
    Ok(out)
}

fn draw_empty(root: &DrawingArea<SVGBackend<'_>, Shift>, title: &str) -> DrawResult {
    let area = root.titled(title, (FONT, 18).into_font().color(&TEXT_COLOR))?;
    let (w, h) = area.dim_in_pixel();
    let style = (FONT, 14)
        .into_font()
        .color(&TEXT_COLOR)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new("No data", (w as i32 / 2, h as i32 / 2), style))?;
    Ok(())
}

fn draw_line(root: &DrawingArea<SVGBackend<'_>, Shift>, spec: &LineChart) -> DrawResult {
    let n = spec.points.len();
    let y_max = padded_max(spec.points.iter().map(|(_, v)| *v));
    let labels: Vec<&str> = spec.points.iter().map(|(l, _)| l.as_str()).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, (FONT, 18).into_font().color(&TEXT_COLOR))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(72)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

    chart.plotting_area().fill(&PLOT_BACKGROUND)?;
    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(n.min(MAX_X_LABELS))
        .y_labels(6)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_label_formatter(&|y| format_thousands(*y, 0))
        .bold_line_style(&WHITE)
        .light_line_style(&WHITE.mix(0.5))
        .axis_style(&TEXT_COLOR.mix(0.3))
        .label_style((FONT, 11).into_font().color(&TEXT_COLOR))
        .draw()?;

    let color = palette(0);
    let xy: Vec<(f64, f64)> = spec
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i as f64, *v))
        .collect();
    chart.draw_series(LineSeries::new(xy.iter().copied(), color.stroke_width(2)))?;
    chart.draw_series(xy.iter().map(|&p| Circle::new(p, 3, color.filled())))?;

    Ok(())
}

fn draw_bar(root: &DrawingArea<SVGBackend<'_>, Shift>, spec: &BarChart) -> DrawResult {
    let n = spec.bars.len();
    let y_max = padded_max(spec.bars.iter().map(|(_, v)| *v));
    let labels: Vec<&str> = spec.bars.iter().map(|(l, _)| l.as_str()).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, (FONT, 18).into_font().color(&TEXT_COLOR))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(72)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

    chart.plotting_area().fill(&PLOT_BACKGROUND)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(n.min(MAX_X_LABELS * 2))
        .y_labels(6)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_label_formatter(&|y| format_thousands(*y, 0))
        .bold_line_style(&WHITE)
        .light_line_style(&WHITE.mix(0.5))
        .axis_style(&TEXT_COLOR.mix(0.3))
        .label_style((FONT, 11).into_font().color(&TEXT_COLOR))
        .draw()?;

    let color = palette(0);
    chart.draw_series(spec.bars.iter().enumerate().map(|(i, (_, v))| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *v)], color.filled())
    }))?;

    Ok(())
}

fn draw_pie(root: &DrawingArea<SVGBackend<'_>, Shift>, spec: &PieChart) -> DrawResult {
    let area = root.titled(&spec.title, (FONT, 18).into_font().color(&TEXT_COLOR))?;
    let (w, h) = area.dim_in_pixel();
    let legend_width = 140i32;
    let cx = (w as i32 - legend_width) / 2;
    let cy = h as i32 / 2;
    let outer = (cx.min(cy) - 12).max(10) as f64;
    let inner = outer * spec.hole.clamp(0.0, 0.95);

    let total: usize = spec.slices.iter().map(|s| s.value).sum();
    let label_style = (FONT, 12)
        .into_font()
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Center));

    // Slices run clockwise from 12 o'clock.
    let mut start = -PI / 2.0;
    for (idx, slice) in spec.slices.iter().enumerate() {
        let sweep = 2.0 * PI * slice.value as f64 / total.max(1) as f64;
        let end = start + sweep;
        let color = palette(idx);

        area.draw(&Polygon::new(
            annulus_sector((cx, cy), inner, outer, start, end),
            color.filled(),
        ))?;

        let mid = start + sweep / 2.0;
        let r = (inner + outer) / 2.0;
        let at = (
            cx + (r * mid.cos()).round() as i32,
            cy + (r * mid.sin()).round() as i32,
        );
        let text = format!("{}\n{:.1}%", slice.value, slice.percent);
        for (line_no, line) in text.lines().enumerate() {
            area.draw(&Text::new(
                line.to_string(),
                (at.0, at.1 - 7 + 14 * line_no as i32),
                label_style.clone(),
            ))?;
        }
        start = end;
    }

    let legend_x = w as i32 - legend_width + 10;
    for (idx, slice) in spec.slices.iter().enumerate() {
        let y = 24 + idx as i32 * 22;
        area.draw(&Rectangle::new([(legend_x, y - 6), (legend_x + 12, y + 6)], palette(idx).filled()))?;
        area.draw(&Text::new(
            slice.label.clone(),
            (legend_x + 18, y),
            (FONT, 12)
                .into_font()
                .color(&TEXT_COLOR)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
    }

    Ok(())
}

fn draw_histogram(root: &DrawingArea<SVGBackend<'_>, Shift>, spec: &HistogramChart) -> DrawResult {
    let bins = spec.edges.len().saturating_sub(1);
    let (x0, x1) = match (spec.edges.first(), spec.edges.last()) {
        (Some(a), Some(b)) if b > a => (*a, *b),
        _ => return draw_empty(root, &spec.title),
    };

    let mut stacked = vec![0usize; bins];
    for (_, counts) in &spec.series {
        for (t, c) in stacked.iter_mut().zip(counts) {
            *t += c;
        }
    }
    let y_max = padded_max(stacked.iter().map(|v| *v as f64));

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, (FONT, 18).into_font().color(&TEXT_COLOR))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, 0f64..y_max)?;

    chart.plotting_area().fill(&PLOT_BACKGROUND)?;
    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(8)
        .y_labels(6)
        .x_label_formatter(&|x| format_thousands(*x, 0))
        .y_label_formatter(&|y| format_thousands(*y, 0))
        .bold_line_style(&WHITE)
        .light_line_style(&WHITE.mix(0.5))
        .axis_style(&TEXT_COLOR.mix(0.3))
        .label_style((FONT, 11).into_font().color(&TEXT_COLOR))
        .draw()?;

    let mut base = vec![0usize; bins];
    for (idx, (term, counts)) in spec.series.iter().enumerate() {
        let color = palette(idx);
        let mut rects = Vec::with_capacity(bins);
        for (bin, count) in counts.iter().enumerate().filter(|(_, c)| **c > 0) {
            let lo = base[bin] as f64;
            let hi = lo + *count as f64;
            rects.push(Rectangle::new(
                [(spec.edges[bin], lo), (spec.edges[bin + 1], hi)],
                color.mix(0.85).filled(),
            ));
            base[bin] += count;
        }
        chart
            .draw_series(rects)?
            .label(term.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    let terms: Vec<&str> = spec.series.iter().map(|(t, _)| t.as_str()).collect();
    draw_titled_legend(&mut chart, &spec.legend_title, &terms)?;

    Ok(())
}

fn draw_box(root: &DrawingArea<SVGBackend<'_>, Shift>, spec: &BoxChart) -> DrawResult {
    let n = spec.categories.len();
    let groups = spec.groups.len().max(1);
    let y_max = padded_max(spec.boxes.iter().map(|b| b.max));
    let y_min = spec
        .boxes
        .iter()
        .map(|b| b.min)
        .fold(f64::INFINITY, f64::min)
        .min(0.0);
    let labels: Vec<&str> = spec.categories.iter().map(String::as_str).collect();

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, (FONT, 18).into_font().color(&TEXT_COLOR))
        .margin(12)
        .x_label_area_size(44)
        .y_label_area_size(72)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)?;

    chart.plotting_area().fill(&PLOT_BACKGROUND)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(n.min(MAX_X_LABELS * 2))
        .y_labels(6)
        .x_label_formatter(&|x| category_label(&labels, *x))
        .y_label_formatter(&|y| format_thousands(*y, 0))
        .bold_line_style(&WHITE)
        .light_line_style(&WHITE.mix(0.5))
        .axis_style(&TEXT_COLOR.mix(0.3))
        .label_style((FONT, 10).into_font().color(&TEXT_COLOR))
        .draw()?;

    // Each category slot is 0.8 wide, split evenly between groups.
    let slot = 0.8 / groups as f64;
    let half = slot * 0.35;

    for (g, group) in spec.groups.iter().enumerate() {
        let color = palette(g);
        let centre_of = |purpose: &str| {
            let cat = spec.categories.iter().position(|c| c == purpose).unwrap_or(0);
            cat as f64 - 0.4 + slot * (g as f64 + 0.5)
        };
        let boxes: Vec<_> = spec.boxes.iter().filter(|b| &b.term == group).collect();

        chart
            .draw_series(boxes.iter().map(|b| {
                let x = centre_of(b.purpose.as_str());
                Rectangle::new([(x - half, b.q1), (x + half, b.q3)], color.mix(0.6).filled())
            }))?
            .label(group.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));

        let stroke = color.stroke_width(1);
        for b in &boxes {
            let x = centre_of(b.purpose.as_str());
            let segments = [
                vec![(x - half, b.median), (x + half, b.median)],
                vec![(x, b.q3), (x, b.upper_whisker)],
                vec![(x, b.q1), (x, b.lower_whisker)],
                vec![(x - half / 2.0, b.upper_whisker), (x + half / 2.0, b.upper_whisker)],
                vec![(x - half / 2.0, b.lower_whisker), (x + half / 2.0, b.lower_whisker)],
            ];
            chart.draw_series(segments.into_iter().map(|s| PathElement::new(s, stroke)))?;
            chart.draw_series(b.outliers.iter().map(|v| Circle::new((x, *v), 2, color.filled())))?;
        }
    }

    let terms: Vec<&str> = spec.groups.iter().map(String::as_str).collect();
    draw_titled_legend(&mut chart, &spec.legend_title, &terms)?;

    Ok(())
}

/// Series legend in the top-right corner with `title` above the entries.
fn draw_titled_legend<'a>(
    chart: &mut ChartContext<'a, SVGBackend<'a>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    title: &str,
    labels: &[&str],
) -> DrawResult {
    let area = chart.plotting_area().strip_coord_spec();
    let (w, _) = area.dim_in_pixel();
    let chars = labels.iter().map(|l| l.chars().count()).chain([title.chars().count()]).max().unwrap_or(0);
    let width = chars as i32 * 7 + 40;
    let x = (w as i32 - width - 8).max(0);

    area.draw(&Text::new(
        title.to_string(),
        (x, 6),
        (FONT, 12, FontStyle::Bold)
            .into_font()
            .color(&TEXT_COLOR)
            .pos(Pos::new(HPos::Left, VPos::Top)),
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::Coordinate(x, 24))
        .background_style(&WHITE.mix(0.85))
        .border_style(&TEXT_COLOR.mix(0.3))
        .label_font((FONT, 12).into_font().color(&TEXT_COLOR))
        .draw()?;
    Ok(())
}

/// Label for a categorical axis position; blank between categories.
fn category_label(labels: &[&str], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).map(|s| s.to_string()).unwrap_or_default()
}

/// Upper y bound with 10% headroom; at least 1 so empty-ish series still draw.
fn padded_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0, f64::max);
    if max <= 0.0 { 1.0 } else { max * 1.1 }
}

/// Polygon outline of a ring sector between angles `a0` and `a1` (radians).
fn annulus_sector(centre: (i32, i32), inner: f64, outer: f64, a0: f64, a1: f64) -> Vec<(i32, i32)> {
    let steps = (((a1 - a0).abs() / (PI / 90.0)).ceil() as usize).max(2);
    let point = |r: f64, a: f64| {
        (
            centre.0 + (r * a.cos()).round() as i32,
            centre.1 + (r * a.sin()).round() as i32,
        )
    };

    let mut pts = Vec::with_capacity(2 * (steps + 1));
    for i in 0..=steps {
        let a = a0 + (a1 - a0) * i as f64 / steps as f64;
        pts.push(point(outer, a));
    }
    for i in (0..=steps).rev() {
        let a = a0 + (a1 - a0) * i as f64 / steps as f64;
        pts.push(point(inner, a));
    }
    pts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{PieSlice, TERM_LEGEND};

    #[test]
    fn category_labels_only_on_integers() {
        let labels = ["Monday", "Tuesday"];
        assert_eq!(category_label(&labels, 0.0), "Monday");
        assert_eq!(category_label(&labels, 1.0), "Tuesday");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
    }

    #[test]
    fn padded_max_has_floor() {
        assert_eq!(padded_max(std::iter::empty()), 1.0);
        assert!((padded_max([10.0, 5.0].into_iter()) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn sector_is_closed_ring() {
        let pts = annulus_sector((100, 100), 25.0, 50.0, 0.0, PI / 2.0);
        assert_eq!(pts.first(), Some(&(150, 100)));
        assert_eq!(pts.last(), Some(&(125, 100)));
    }

    #[test]
    fn renders_svg_documents() {
        let bar = ChartSpec::Bar(BarChart {
            title: "Distribution of Loans by Grade".to_string(),
            x_label: "Grade".to_string(),
            y_label: "Number of Loans".to_string(),
            bars: vec![("A".to_string(), 3.0), ("B".to_string(), 5.0)],
        });
        let svg = render(&bar, (400, 300)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Distribution of Loans by Grade"));

        let pie = ChartSpec::Pie(PieChart {
            title: "Distribution of Loans by Condition".to_string(),
            hole: 0.5,
            slices: vec![
                PieSlice { label: "Good Loan".to_string(), value: 3, percent: 75.0 },
                PieSlice { label: "Bad Loan".to_string(), value: 1, percent: 25.0 },
            ],
        });
        let svg = render(&pie, (400, 300)).unwrap();
        assert!(svg.contains("75.0%"));

        let empty = ChartSpec::Histogram(HistogramChart {
            title: "Loan Amount Distribution by Condition".to_string(),
            x_label: "Loan Amount".to_string(),
            y_label: "count".to_string(),
            legend_title: TERM_LEGEND.to_string(),
            edges: Vec::new(),
            series: Vec::new(),
        });
        let svg = render(&empty, (400, 300)).unwrap();
        assert!(svg.contains("No data"));

        let histogram = ChartSpec::Histogram(HistogramChart {
            title: "Loan Amount Distribution by Condition".to_string(),
            x_label: "Loan Amount".to_string(),
            y_label: "count".to_string(),
            legend_title: TERM_LEGEND.to_string(),
            edges: vec![100.0, 200.0, 300.0],
            series: vec![("36 months".to_string(), vec![1, 0]), ("60 months".to_string(), vec![0, 1])],
        });
        let svg = render(&histogram, (400, 300)).unwrap();
        assert!(svg.contains("36 months"));
        assert!(svg.contains(TERM_LEGEND));
    }
}
