//! Plotters-powered time-series widget for Ratatui.
//!
//! Plotters output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`. The x axis is days since the common era so the
//! tick formatter can turn positions back into dates.

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::analysis::TimePoint;

/// A render-only line chart over dates. Bounds are computed by `new`.
pub struct TimeSeriesChart<'a> {
    pub points: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> TimeSeriesChart<'a> {
    /// Chart over `series`, which must outlive the widget.
    pub fn new(series: &'a [(f64, f64)]) -> Self {
        let (x_bounds, y_bounds) = bounds(series);
        Self {
            points: series,
            x_bounds,
            y_bounds,
        }
    }
}

/// Convert time points to plot coordinates.
pub fn to_series(points: &[TimePoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|p| (p.date.num_days_from_ce() as f64, p.value))
        .collect()
}

pub fn fmt_day(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn fmt_value(v: f64) -> String {
    if v.abs() >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v.abs() >= 1_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

fn bounds(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y1, y0) = (f64::NEG_INFINITY, 0.0);
    for &(x, y) in points {
        x0 = x0.min(x);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    if !(x0.is_finite() && x1.is_finite()) {
        (x0, x1) = (0.0, 1.0);
    }
    if x1 <= x0 {
        (x0, x1) = (x0 - 1.0, x1 + 1.0);
    }
    if !y1.is_finite() || y1 <= y0 {
        y1 = 1.0;
    }
    ([x0, x1], [y0, y1 * 1.05])
}

impl<'a> Widget for TimeSeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }
        if self.points.is_empty() {
            buf.set_string(area.x, area.y, "No data", Style::default().fg(Color::Yellow));
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are noise at terminal resolution.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(4)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_day(*v))
                .y_label_formatter(&|v| fmt_value(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255);
            chart.draw_series(LineSeries::new(self.points.iter().copied(), &line_color))?;

            // Circle radii are mis-scaled by the ratatui backend; pixels read as dots.
            chart.draw_series(
                self.points
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), WHITE)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_axis_round_trips_dates() {
        let date = NaiveDate::from_ymd_opt(2014, 3, 9).unwrap();
        let points = to_series(&[TimePoint { date, value: 4.0 }]);
        assert_eq!(fmt_day(points[0].0), "2014-03-09");
    }

    #[test]
    fn single_point_bounds_are_widened() {
        let series = [(10.0, 5.0)];
        let chart = TimeSeriesChart::new(&series);
        assert_eq!(chart.x_bounds, [9.0, 11.0]);
        assert_eq!(chart.y_bounds[0], 0.0);
        assert!(chart.y_bounds[1] > 5.0);
    }

    #[test]
    fn values_are_abbreviated() {
        assert_eq!(fmt_value(950.0), "950");
        assert_eq!(fmt_value(12_400.0), "12k");
        assert_eq!(fmt_value(2_500_000.0), "2.5M");
    }
}
