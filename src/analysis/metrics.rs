//! Headline metrics shown as tiles at the top of the dashboard.

use serde::Serialize;

use crate::domain::LoanRecord;

/// Whole-table scalar aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub total_loans: usize,
    pub total_amount: f64,
    /// Percent.
    pub avg_interest_rate: f64,
    pub avg_loan_amount: f64,
}

/// A labelled, pre-formatted metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTile {
    pub label: &'static str,
    pub value: String,
    pub help: &'static str,
}

/// Compute the metric summary over every record (means of an empty slice are 0).
pub fn summarize(records: &[LoanRecord]) -> MetricSummary {
    let total_loans = records.len();
    let total_amount: f64 = records.iter().map(|r| r.loan_amount).sum();
    let total_rate: f64 = records.iter().map(|r| r.interest_rate).sum();

    let (avg_interest_rate, avg_loan_amount) = if total_loans == 0 {
        (0.0, 0.0)
    } else {
        let n = total_loans as f64;
        (total_rate / n, total_amount / n)
    };

    MetricSummary {
        total_loans,
        total_amount,
        avg_interest_rate,
        avg_loan_amount,
    }
}

impl MetricSummary {
    /// Tiles in display order: the first two go in the left column, the
    /// last two in the right column.
    pub fn tiles(&self) -> [MetricTile; 4] {
        [
            MetricTile {
                label: "Total Loans",
                value: format_thousands(self.total_loans as f64, 0),
                help: "Total Number of Loans",
            },
            MetricTile {
                label: "Total Loan Amount",
                value: format!("${}", format_thousands(self.total_amount, 0)),
                help: "Sum of All Loan Amounts",
            },
            MetricTile {
                label: "Average Interest Rate",
                value: format!("{}%", format_thousands(self.avg_interest_rate, 2)),
                help: "Percentage of the loan amount that the borrower has to pay",
            },
            MetricTile {
                label: "Average Loan Amount",
                value: format!("${}", format_thousands(self.avg_loan_amount, 0)),
                help: "Average loan amount across all loans",
            },
        ]
    }
}

/// Format with a fixed number of decimals and `,` thousands separators.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::loan;

    #[test]
    fn three_loan_scenario() {
        let records = vec![
            loan("1", 100.0, "2014-01-06"),
            loan("2", 200.0, "2014-01-07"),
            loan("3", 300.0, "2014-01-08"),
        ];
        let summary = summarize(&records);
        let tiles = summary.tiles();
        assert_eq!(tiles[0].label, "Total Loans");
        assert_eq!(tiles[0].value, "3");
        assert_eq!(tiles[1].label, "Total Loan Amount");
        assert_eq!(tiles[1].value, "$600");
        assert_eq!(tiles[3].value, "$200");
    }

    #[test]
    fn averages_match_direct_computation() {
        let mut records = vec![loan("1", 1000.0, "2014-01-06"), loan("2", 3000.0, "2014-01-06")];
        records[0].interest_rate = 10.0;
        records[1].interest_rate = 13.0;
        let summary = summarize(&records);
        assert_eq!(summary.total_loans, 2);
        assert!((summary.total_amount - 4000.0).abs() < 1e-9);
        assert!((summary.avg_loan_amount - 2000.0).abs() < 1e-9);
        assert!((summary.avg_interest_rate - 11.5).abs() < 1e-9);
        assert_eq!(summary.tiles()[2].value, "11.50%");
    }

    #[test]
    fn empty_table_has_zero_means() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_loans, 0);
        assert_eq!(summary.avg_loan_amount, 0.0);
        assert_eq!(summary.tiles()[1].value, "$0");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0.0, 0), "0");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(-12345.0, 0), "-12,345");
        assert_eq!(format_thousands(-0.001, 0), "0");
    }
}
