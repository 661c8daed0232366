//! Synthetic loan dataset generation.
//!
//! Produces rows in the same CSV schema the loader reads, with raw purposes
//! (underscores included) so normalization is exercised end to end. Output
//! is fully determined by the seed.

use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};
use serde::Serialize;
use tracing::info;

use crate::domain::{LoanCondition, weekday_name};
use crate::error::AppError;

const PURPOSES: [&str; 8] = [
    "debt_consolidation",
    "credit_card",
    "home_improvement",
    "major_purchase",
    "small_business",
    "car",
    "medical",
    "other",
];

/// Relative frequency of each purpose, same order as `PURPOSES`.
const PURPOSE_WEIGHTS: [u32; 8] = [45, 22, 8, 5, 4, 4, 3, 9];

const GRADES: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];
const GRADE_WEIGHTS: [u32; 7] = [18, 29, 26, 16, 7, 3, 1];

/// Base interest rate (percent) per grade.
const GRADE_RATES: [f64; 7] = [7.2, 10.9, 13.8, 17.1, 19.9, 23.4, 25.8];

/// Probability that a loan of each grade turns bad.
const GRADE_BAD_RATE: [f64; 7] = [0.03, 0.06, 0.09, 0.13, 0.17, 0.22, 0.27];

const MIN_AMOUNT: f64 = 500.0;
const MAX_AMOUNT: f64 = 35_000.0;

/// One output row, in input-schema column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    pub id: String,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub issue_date: String,
    pub issue_weekday: &'static str,
    pub purpose: &'static str,
    pub term: &'static str,
    pub loan_condition: &'static str,
    pub grade: &'static str,
}

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    /// First possible issue date; dates span one year from here.
    pub start: NaiveDate,
}

impl SampleConfig {
    pub fn new(rows: usize, seed: u64) -> Self {
        Self {
            rows,
            seed,
            start: NaiveDate::from_ymd_opt(2014, 1, 1).unwrap_or_default(),
        }
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SampleRow>, AppError> {
    if config.rows == 0 {
        return Err(AppError::input("Sample row count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let amount_dist = LogNormal::new(12_000f64.ln(), 0.55)
        .map_err(|e| AppError::runtime(format!("Amount distribution error: {e}")))?;
    let rate_noise =
        Normal::new(0.0, 0.9).map_err(|e| AppError::runtime(format!("Rate distribution error: {e}")))?;
    let span_days = config
        .start
        .with_year(config.start.year() + 1)
        .map(|end| (end - config.start).num_days())
        .unwrap_or(365);

    let mut rows = Vec::with_capacity(config.rows);
    for i in 0..config.rows {
        let grade_idx = weighted_index(&mut rng, &GRADE_WEIGHTS);
        let purpose_idx = weighted_index(&mut rng, &PURPOSE_WEIGHTS);

        let raw_amount: f64 = amount_dist.sample(&mut rng);
        let loan_amount = (raw_amount.clamp(MIN_AMOUNT, MAX_AMOUNT) / 25.0).round() * 25.0;

        // Larger loans skew to the longer term.
        let long_term_prob = if loan_amount > 15_000.0 { 0.45 } else { 0.18 };
        let term = if rng.gen_bool(long_term_prob) { "60 months" } else { "36 months" };

        let mut rate = GRADE_RATES[grade_idx] + rate_noise.sample(&mut rng);
        if term == "60 months" {
            rate += 1.5;
        }
        let interest_rate = (rate.max(5.0) * 100.0).round() / 100.0;

        let condition = if rng.gen_bool(GRADE_BAD_RATE[grade_idx]) {
            LoanCondition::Bad
        } else {
            LoanCondition::Good
        };

        let issue_date = config.start + Duration::days(rng.gen_range(0..span_days));

        rows.push(SampleRow {
            id: format!("{}", 1_000_001 + i),
            loan_amount,
            interest_rate,
            issue_date: issue_date.format("%Y-%m-%d").to_string(),
            issue_weekday: weekday_name(issue_date.weekday()),
            purpose: PURPOSES[purpose_idx],
            term,
            loan_condition: condition.label(),
            grade: GRADES[grade_idx],
        });
    }

    Ok(rows)
}

/// Write rows as CSV with a header line.
pub fn write_sample_csv(path: &Path, rows: &[SampleRow]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::runtime(format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::runtime(format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| AppError::runtime(format!("Failed to write sample row {}: {e}", row.id)))?;
    }
    wtr.flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush sample CSV: {e}")))?;
    info!(rows = rows.len(), path = %path.display(), "wrote sample dataset");
    Ok(())
}

fn weighted_index(rng: &mut StdRng, weights: &[u32]) -> usize {
    let total: u32 = weights.iter().sum();
    let mut pick = rng.gen_range(0..total);
    for (idx, w) in weights.iter().enumerate() {
        if pick < *w {
            return idx;
        }
        pick -= w;
    }
    weights.len() - 1
}
