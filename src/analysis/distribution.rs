//! Categorical and conditional distributions.
//!
//! - condition share (pie) and grade counts (bar) over the whole table
//! - condition filter feeding the two dependent views
//! - loan-amount histogram split by term
//! - loan-amount box statistics per (purpose, term)

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::series::CategoryCount;
use crate::domain::{LoanCondition, LoanRecord};

/// Whisker reach, in multiples of the interquartile range.
const WHISKER_IQR: f64 = 1.5;

/// Count and share of one loan condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionShare {
    pub condition: LoanCondition,
    pub count: usize,
    /// 0..=100.
    pub percent: f64,
}

/// Counts per condition, Good first; absent conditions are omitted.
pub fn condition_counts(records: &[LoanRecord]) -> Vec<ConditionShare> {
    let total = records.len();
    LoanCondition::ALL
        .into_iter()
        .filter_map(|condition| {
            let count = records.iter().filter(|r| r.loan_condition == condition).count();
            (count > 0).then(|| ConditionShare {
                condition,
                count,
                percent: 100.0 * count as f64 / total as f64,
            })
        })
        .collect()
}

/// Counts per grade, sorted by grade label.
pub fn grade_counts(records: &[LoanRecord]) -> Vec<CategoryCount> {
    let mut by_grade: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        *by_grade.entry(r.grade.as_str()).or_default() += 1;
    }
    by_grade
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// Rows whose condition equals `condition`, in input order.
pub fn filter_by_condition(records: &[LoanRecord], condition: LoanCondition) -> Vec<LoanRecord> {
    records
        .iter()
        .filter(|r| r.loan_condition == condition)
        .cloned()
        .collect()
}

/// Per-term bin counts of a histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermCounts {
    pub term: String,
    pub counts: Vec<usize>,
}

/// Equal-width histogram of loan amounts, one count series per term.
///
/// `edges` has `bins + 1` entries; bin `i` covers `[edges[i], edges[i + 1])`
/// and the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountHistogram {
    pub edges: Vec<f64>,
    pub series: Vec<TermCounts>,
}

impl AmountHistogram {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Stacked height of each bin.
    pub fn totals(&self) -> Vec<usize> {
        let mut totals = vec![0usize; self.bins()];
        for s in &self.series {
            for (t, c) in totals.iter_mut().zip(&s.counts) {
                *t += c;
            }
        }
        totals
    }
}

pub fn amount_histogram(records: &[LoanRecord], bins: usize) -> AmountHistogram {
    let bins = bins.max(1);
    if records.is_empty() {
        return AmountHistogram {
            edges: Vec::new(),
            series: Vec::new(),
        };
    }

    let (min, max) = records.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(r.loan_amount), hi.max(r.loan_amount))
    });
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };
    let edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();

    let mut series: Vec<TermCounts> = Vec::new();
    for r in records {
        let idx = (((r.loan_amount - min) / width).floor() as usize).min(bins - 1);
        let pos = match series.iter().position(|s| s.term == r.term) {
            Some(pos) => pos,
            None => {
                series.push(TermCounts {
                    term: r.term.clone(),
                    counts: vec![0; bins],
                });
                series.len() - 1
            }
        };
        series[pos].counts[idx] += 1;
    }

    AmountHistogram { edges, series }
}

/// Five-number summary plus whiskers and outliers for one box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub purpose: String,
    pub term: String,
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Box statistics of loan amount for every (purpose, term) pair, in order
/// of first appearance.
pub fn purpose_box_stats(records: &[LoanRecord]) -> Vec<BoxStats> {
    let mut groups: Vec<((&str, &str), Vec<f64>)> = Vec::new();
    for r in records {
        let key = (r.purpose.as_str(), r.term.as_str());
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(r.loan_amount),
            None => groups.push((key, vec![r.loan_amount])),
        }
    }

    groups
        .into_iter()
        .map(|((purpose, term), mut values)| {
            values.sort_by(f64::total_cmp);
            box_stats(purpose, term, &values)
        })
        .collect()
}

/// `sorted` must be non-empty and ascending.
fn box_stats(purpose: &str, term: &str, sorted: &[f64]) -> BoxStats {
    let q1 = quantile(sorted, 0.25);
    let median = quantile(sorted, 0.5);
    let q3 = quantile(sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - WHISKER_IQR * iqr;
    let hi_fence = q3 + WHISKER_IQR * iqr;

    let lower_whisker = sorted.iter().copied().find(|v| *v >= lo_fence).unwrap_or(q1);
    let upper_whisker = sorted.iter().rev().copied().find(|v| *v <= hi_fence).unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();

    BoxStats {
        purpose: purpose.to_string(),
        term: term.to_string(),
        n: sorted.len(),
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        lower_whisker,
        upper_whisker,
        outliers,
    }
}

/// Linear interpolation between order statistics (`p` in `[0, 1]`).
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{loan, loan_with};

    #[test]
    fn condition_filter_partitions_the_table() {
        let records = vec![
            loan_with("1", 100.0, LoanCondition::Good, "car", "36 months"),
            loan_with("2", 200.0, LoanCondition::Bad, "car", "36 months"),
            loan_with("3", 300.0, LoanCondition::Good, "house", "60 months"),
        ];
        let good = filter_by_condition(&records, LoanCondition::Good);
        let bad = filter_by_condition(&records, LoanCondition::Bad);
        assert_eq!(good.len() + bad.len(), records.len());
        assert!(bad.iter().all(|r| r.loan_condition == LoanCondition::Bad));
        assert_eq!(good[1].id, "3");
    }

    #[test]
    fn condition_share_percentages() {
        let records = vec![
            loan_with("1", 1.0, LoanCondition::Good, "a", "t"),
            loan_with("2", 1.0, LoanCondition::Good, "a", "t"),
            loan_with("3", 1.0, LoanCondition::Good, "a", "t"),
            loan_with("4", 1.0, LoanCondition::Bad, "a", "t"),
        ];
        let shares = condition_counts(&records);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].condition, LoanCondition::Good);
        assert_eq!(shares[0].count, 3);
        assert!((shares[1].percent - 25.0).abs() < 1e-9);

        let only_good = condition_counts(&records[..2]);
        assert_eq!(only_good.len(), 1);
    }

    #[test]
    fn grades_are_sorted() {
        let mut records = vec![loan("1", 1.0, "2014-01-01"), loan("2", 1.0, "2014-01-01"), loan("3", 1.0, "2014-01-01")];
        records[0].grade = "C".to_string();
        records[1].grade = "A".to_string();
        records[2].grade = "C".to_string();
        let grades = grade_counts(&records);
        assert_eq!(grades[0].label, "A");
        assert_eq!(grades[1].count, 2);
    }

    #[test]
    fn histogram_bins_cover_range() {
        let records: Vec<_> = (0..=10)
            .map(|i| {
                let term = if i % 2 == 0 { "36 months" } else { "60 months" };
                loan_with(&i.to_string(), i as f64 * 100.0, LoanCondition::Good, "car", term)
            })
            .collect();
        let hist = amount_histogram(&records, 5);
        assert_eq!(hist.bins(), 5);
        assert_eq!(hist.edges[0], 0.0);
        assert_eq!(hist.edges[5], 1000.0);
        assert_eq!(hist.series[0].term, "36 months");
        assert_eq!(hist.totals().iter().sum::<usize>(), 11);
        // The max value lands in the last (right-closed) bin.
        assert_eq!(hist.totals()[4], 3);
    }

    #[test]
    fn histogram_handles_degenerate_input() {
        assert!(amount_histogram(&[], 30).is_empty());

        let same = vec![
            loan_with("1", 500.0, LoanCondition::Good, "car", "36 months"),
            loan_with("2", 500.0, LoanCondition::Good, "car", "36 months"),
        ];
        let hist = amount_histogram(&same, 30);
        assert_eq!(hist.bins(), 30);
        assert_eq!(hist.series[0].counts[0], 2);
    }

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.5), 2.5);
        assert_eq!(quantile(&v, 0.25), 1.75);
        assert_eq!(quantile(&[7.0], 0.9), 7.0);
    }

    #[test]
    fn box_stats_flag_outliers() {
        let mut records: Vec<_> = [10.0, 11.0, 12.0, 13.0, 14.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, v)| loan_with(&i.to_string(), *v, LoanCondition::Good, "car", "36 months"))
            .collect();
        records.push(loan_with("x", 50.0, LoanCondition::Good, "house", "60 months"));

        let stats = purpose_box_stats(&records);
        assert_eq!(stats.len(), 2);
        let car = &stats[0];
        assert_eq!(car.purpose, "car");
        assert_eq!(car.n, 6);
        assert_eq!(car.outliers, vec![100.0]);
        assert_eq!(car.upper_whisker, 14.0);
        assert_eq!(car.lower_whisker, 10.0);
        assert_eq!(stats[1].median, 50.0);
    }
}
