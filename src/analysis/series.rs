//! Time-based aggregates: per issue date and per weekday.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{LoanRecord, WEEKDAY_ORDER, weekday_name};

/// One point of a date-indexed series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A count attached to a category label, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Number of loans issued on each date, ascending by date.
pub fn loans_per_date(records: &[LoanRecord]) -> Vec<TimePoint> {
    let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for r in records {
        *by_date.entry(r.issue_date).or_default() += 1;
    }
    by_date
        .into_iter()
        .map(|(date, n)| TimePoint { date, value: n as f64 })
        .collect()
}

/// Total loan amount issued on each date, ascending by date.
pub fn amount_per_date(records: &[LoanRecord]) -> Vec<TimePoint> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in records {
        *by_date.entry(r.issue_date).or_default() += r.loan_amount;
    }
    by_date
        .into_iter()
        .map(|(date, value)| TimePoint { date, value })
        .collect()
}

/// Number of loans per issue weekday, Monday first.
///
/// Weekdays with no loans are left out, so the output only ever contains
/// days that occur in the data, in calendar order.
pub fn loans_per_weekday(records: &[LoanRecord]) -> Vec<CategoryCount> {
    let mut counts = [0usize; 7];
    for r in records {
        counts[r.issue_weekday.num_days_from_monday() as usize] += 1;
    }
    WEEKDAY_ORDER
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(day, count)| CategoryCount {
            label: weekday_name(*day).to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::loan;
    use chrono::Weekday;

    #[test]
    fn per_date_series_are_sorted_and_aggregated() {
        let records = vec![
            loan("1", 100.0, "2014-02-01"),
            loan("2", 50.0, "2014-01-01"),
            loan("3", 25.0, "2014-02-01"),
        ];
        let counts = loans_per_date(&records);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].date.to_string(), "2014-01-01");
        assert_eq!(counts[0].value, 1.0);
        assert_eq!(counts[1].value, 2.0);

        let sums = amount_per_date(&records);
        assert_eq!(sums[1].value, 125.0);
    }

    #[test]
    fn weekday_order_ignores_input_order() {
        let mut records = vec![
            loan("1", 1.0, "2014-01-05"),
            loan("2", 1.0, "2014-01-04"),
            loan("3", 1.0, "2014-01-08"),
            loan("4", 1.0, "2014-01-06"),
            loan("5", 1.0, "2014-01-05"),
        ];
        records.reverse();
        let days = loans_per_weekday(&records);
        let labels: Vec<&str> = days.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["Monday", "Wednesday", "Saturday", "Sunday"]);
        assert_eq!(days[3].count, 2);
        assert_eq!(records[0].issue_weekday, Weekday::Sun);
    }
}
