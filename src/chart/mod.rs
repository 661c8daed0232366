//! Chart specifications.
//!
//! A `ChartSpec` is a render-only description of one chart: titles, axis
//! labels and the already-aggregated series. Building specs is separate from
//! drawing them so the HTML page, the JSON export and the terminal UI all
//! read the same numbers.

use serde::Serialize;

use crate::analysis::{AmountHistogram, BoxStats, CategoryCount, ConditionShare, TimePoint};
use crate::dashboard::{FinancialViews, OverviewViews, ViewId};

pub mod svg;

/// Legend title used by the term-coloured charts.
pub const TERM_LEGEND: &str = "Loan Term";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartSpec {
    Line(LineChart),
    Bar(BarChart),
    Pie(PieChart),
    Histogram(HistogramChart),
    Box(BoxChart),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Line(c) => &c.title,
            ChartSpec::Bar(c) => &c.title,
            ChartSpec::Pie(c) => &c.title,
            ChartSpec::Histogram(c) => &c.title,
            ChartSpec::Box(c) => &c.title,
        }
    }

    /// True when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Line(c) => c.points.is_empty(),
            ChartSpec::Bar(c) => c.bars.is_empty(),
            ChartSpec::Pie(c) => c.slices.is_empty(),
            ChartSpec::Histogram(c) => c.series.is_empty(),
            ChartSpec::Box(c) => c.boxes.is_empty(),
        }
    }
}

/// Line with point markers over a categorical (date) axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
    pub percent: f64,
}

/// Donut chart; `hole` is the inner radius as a fraction of the outer one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub hole: f64,
    pub slices: Vec<PieSlice>,
}

/// Stacked histogram, one colour per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    pub edges: Vec<f64>,
    pub series: Vec<(String, Vec<usize>)>,
}

/// Grouped box plot: one slot per category, one box per group inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    pub categories: Vec<String>,
    pub groups: Vec<String>,
    pub boxes: Vec<BoxStats>,
}

pub fn loans_over_time(points: &[TimePoint]) -> ChartSpec {
    ChartSpec::Line(LineChart {
        title: "Number of Loans Issued Over Time".to_string(),
        x_label: "Issue Date".to_string(),
        y_label: "Number of Loans".to_string(),
        points: date_points(points),
    })
}

pub fn amount_over_time(points: &[TimePoint]) -> ChartSpec {
    ChartSpec::Line(LineChart {
        title: "Total Loan Amount Issued Over Time".to_string(),
        x_label: "Issue Date".to_string(),
        y_label: "Total Loan Amount".to_string(),
        points: date_points(points),
    })
}

pub fn loans_by_weekday(days: &[CategoryCount]) -> ChartSpec {
    ChartSpec::Bar(BarChart {
        title: "Distribution of Loans by Day of the Week".to_string(),
        x_label: "Day of the Week".to_string(),
        y_label: "Number of Loans".to_string(),
        bars: category_bars(days),
    })
}

pub fn condition_share(shares: &[ConditionShare]) -> ChartSpec {
    ChartSpec::Pie(PieChart {
        title: "Distribution of Loans by Condition".to_string(),
        hole: 0.5,
        slices: shares
            .iter()
            .map(|s| PieSlice {
                label: s.condition.label().to_string(),
                value: s.count,
                percent: s.percent,
            })
            .collect(),
    })
}

pub fn grade_distribution(grades: &[CategoryCount]) -> ChartSpec {
    ChartSpec::Bar(BarChart {
        title: "Distribution of Loans by Grade".to_string(),
        x_label: "Grade".to_string(),
        y_label: "Number of Loans".to_string(),
        bars: category_bars(grades),
    })
}

pub fn amount_histogram(histogram: &AmountHistogram) -> ChartSpec {
    ChartSpec::Histogram(HistogramChart {
        title: "Loan Amount Distribution by Condition".to_string(),
        x_label: "Loan Amount".to_string(),
        y_label: "count".to_string(),
        legend_title: TERM_LEGEND.to_string(),
        edges: histogram.edges.clone(),
        series: histogram
            .series
            .iter()
            .map(|s| (s.term.clone(), s.counts.clone()))
            .collect(),
    })
}

pub fn purpose_box(boxes: &[BoxStats]) -> ChartSpec {
    let mut categories: Vec<String> = Vec::new();
    let mut groups: Vec<String> = Vec::new();
    for b in boxes {
        if !categories.contains(&b.purpose) {
            categories.push(b.purpose.clone());
        }
        if !groups.contains(&b.term) {
            groups.push(b.term.clone());
        }
    }
    ChartSpec::Box(BoxChart {
        title: "Loan Amount Distribution by Purpose".to_string(),
        x_label: "Loan Purpose".to_string(),
        y_label: "Loan Amount".to_string(),
        legend_title: TERM_LEGEND.to_string(),
        categories,
        groups,
        boxes: boxes.to_vec(),
    })
}

/// Spec for an overview view; `None` for the condition-dependent ones.
pub fn overview_chart(view: ViewId, views: &OverviewViews) -> Option<ChartSpec> {
    match view {
        ViewId::LoansOverTime => Some(loans_over_time(&views.loans_per_date)),
        ViewId::AmountOverTime => Some(amount_over_time(&views.amount_per_date)),
        ViewId::LoansByWeekday => Some(loans_by_weekday(&views.loans_per_weekday)),
        ViewId::ConditionShare => Some(condition_share(&views.condition_share)),
        ViewId::GradeDistribution => Some(grade_distribution(&views.grade_counts)),
        ViewId::Metrics | ViewId::AmountHistogram | ViewId::PurposeBox => None,
    }
}

/// Spec for a condition-dependent view.
pub fn financial_chart(view: ViewId, views: &FinancialViews) -> Option<ChartSpec> {
    match view {
        ViewId::AmountHistogram => Some(amount_histogram(&views.histogram)),
        ViewId::PurposeBox => Some(purpose_box(&views.boxes)),
        _ => None,
    }
}

fn date_points(points: &[TimePoint]) -> Vec<(String, f64)> {
    points
        .iter()
        .map(|p| (p.date.format("%Y-%m-%d").to_string(), p.value))
        .collect()
}

fn category_bars(counts: &[CategoryCount]) -> Vec<(String, f64)> {
    counts.iter().map(|c| (c.label.clone(), c.count as f64)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{loans_per_weekday, purpose_box_stats};
    use crate::analysis::test_support::{loan, loan_with};
    use crate::domain::LoanCondition;

    #[test]
    fn weekday_bars_follow_calendar_order() {
        let records = vec![
            loan("1", 1.0, "2014-01-12"),
            loan("2", 1.0, "2014-01-07"),
            loan("3", 1.0, "2014-01-06"),
        ];
        let ChartSpec::Bar(bar) = loans_by_weekday(&loans_per_weekday(&records)) else {
            panic!("expected bar chart");
        };
        let labels: Vec<&str> = bar.bars.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, ["Monday", "Tuesday", "Sunday"]);
        assert_eq!(bar.y_label, "Number of Loans");
    }

    #[test]
    fn box_chart_collects_categories_and_groups() {
        let records = vec![
            loan_with("1", 10.0, LoanCondition::Good, "car", "36 months"),
            loan_with("2", 20.0, LoanCondition::Good, "house", "60 months"),
            loan_with("3", 30.0, LoanCondition::Good, "car", "60 months"),
        ];
        let ChartSpec::Box(chart) = purpose_box(&purpose_box_stats(&records)) else {
            panic!("expected box chart");
        };
        assert_eq!(chart.categories, ["car", "house"]);
        assert_eq!(chart.groups, ["36 months", "60 months"]);
        assert_eq!(chart.boxes.len(), 3);
        assert_eq!(chart.legend_title, "Loan Term");
    }
}
