//! Plain-text terminal summary of a dashboard session.
//!
//! Formatting lives here so the analysis code stays free of presentation
//! details and output changes stay localized.

use crate::analysis::{BoxStats, CategoryCount, TimePoint, format_thousands};
use crate::dashboard::Dashboard;

/// Format the full summary: dataset, tiles, aggregates, selected-condition views.
pub fn format_summary(dash: &Dashboard) -> String {
    let table = dash.table();
    let overview = dash.overview();
    let mut out = String::new();

    out.push_str("=== loandash - Loan Portfolio Summary ===\n");
    out.push_str(&format!("Source: {}\n", table.source.display()));
    out.push_str(&format!(
        "Rows: read={} loaded={} skipped={}\n",
        table.rows_read,
        table.len(),
        table.row_errors.len()
    ));

    out.push_str("\nMetrics:\n");
    for tile in overview.metrics.tiles() {
        out.push_str(&format!("  {:<24} {:>16}\n", tile.label, tile.value));
    }

    out.push_str("\nLoans issued over time:\n");
    out.push_str(&format_series(&overview.loans_per_date, 0));
    out.push_str("\nLoan amount over time:\n");
    out.push_str(&format_series(&overview.amount_per_date, 0));

    out.push_str("\nLoans by day of the week:\n");
    out.push_str(&format_counts(&overview.loans_per_weekday));

    out.push_str("\nLoans by condition:\n");
    for share in &overview.condition_share {
        out.push_str(&format!(
            "  {:<12} {:>10} {:>7.1}%\n",
            share.condition.label(),
            format_thousands(share.count as f64, 0),
            share.percent
        ));
    }

    out.push_str("\nLoans by grade:\n");
    out.push_str(&format_counts(&overview.grade_counts));

    let financial = dash.financial();
    out.push_str(&format!(
        "\nFinancial analysis ({}; {} loans):\n",
        financial.condition.label(),
        format_thousands(financial.rows as f64, 0)
    ));
    let histogram = &financial.histogram;
    if histogram.is_empty() {
        out.push_str("  (no loans)\n");
    } else {
        out.push_str(&format!(
            "  Histogram: {} bins over [{}, {}]\n",
            histogram.bins(),
            format_thousands(histogram.edges[0], 0),
            format_thousands(histogram.edges[histogram.edges.len() - 1], 0)
        ));
        for series in &histogram.series {
            let total: usize = series.counts.iter().sum();
            out.push_str(&format!("    {:<14} {:>8}\n", series.term, total));
        }
        out.push_str(&format_boxes(&financial.boxes));
    }

    out
}

/// First date, last date and the peak of a daily series.
fn format_series(points: &[TimePoint], decimals: usize) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return "  (empty)\n".to_string();
    };
    let peak = points
        .iter()
        .max_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(first);
    format!(
        "  {} dates from {} to {} | peak {} on {}\n",
        points.len(),
        first.date,
        last.date,
        format_thousands(peak.value, decimals),
        peak.date
    )
}

fn format_counts(counts: &[CategoryCount]) -> String {
    if counts.is_empty() {
        return "  (empty)\n".to_string();
    }
    counts
        .iter()
        .map(|c| format!("  {:<12} {:>10}\n", c.label, format_thousands(c.count as f64, 0)))
        .collect()
}

fn format_boxes(boxes: &[BoxStats]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {:<20} {:<10} {:>6} {:>10} {:>10} {:>10} {:>8}\n",
        "Purpose", "Term", "N", "Q1", "Median", "Q3", "Outliers"
    ));
    for b in boxes {
        out.push_str(&format!(
            "  {:<20} {:<10} {:>6} {:>10} {:>10} {:>10} {:>8}\n",
            truncate(&b.purpose, 20),
            truncate(&b.term, 10),
            b.n,
            format_thousands(b.q1, 0),
            format_thousands(b.median, 0),
            format_thousands(b.q3, 0),
            b.outliers.len()
        ));
    }
    out
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width.saturating_sub(1)).collect();
        t.push('~');
        t
    }
}
