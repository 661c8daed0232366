//! Shared domain types.
//!
//! The loan table is a flat list of `LoanRecord`s; everything the dashboard
//! shows is derived from it. Categorical fields with a fixed vocabulary
//! (condition, weekday) are enums; open vocabularies (purpose, term, grade)
//! stay as normalized strings.

use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data_input/loan_clean.csv";

/// Number of histogram bins for the loan-amount distribution.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Pixel size of charts rendered into the browser dashboard.
pub const DEFAULT_CHART_SIZE: (u32, u32) = (640, 420);

/// Binary loan performance classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum LoanCondition {
    #[serde(rename = "Good Loan")]
    #[value(name = "good")]
    Good,
    #[serde(rename = "Bad Loan")]
    #[value(name = "bad")]
    Bad,
}

impl LoanCondition {
    /// Dropdown order.
    pub const ALL: [LoanCondition; 2] = [LoanCondition::Good, LoanCondition::Bad];

    pub fn label(self) -> &'static str {
        match self {
            LoanCondition::Good => "Good Loan",
            LoanCondition::Bad => "Bad Loan",
        }
    }

    /// Short token used in URLs and element ids.
    pub fn slug(self) -> &'static str {
        match self {
            LoanCondition::Good => "good",
            LoanCondition::Bad => "bad",
        }
    }

    /// Parse a dataset value: the label only ("Good Loan"), case-insensitive.
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|c| s.eq_ignore_ascii_case(c.label()))
    }

    /// Parse a query value: the label ("Good Loan") or the slug ("good"),
    /// case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| s.eq_ignore_ascii_case(c.label()) || s.eq_ignore_ascii_case(c.slug()))
    }

    pub fn toggle(self) -> Self {
        match self {
            LoanCondition::Good => LoanCondition::Bad,
            LoanCondition::Bad => LoanCondition::Good,
        }
    }
}

impl std::fmt::Display for LoanCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Category order for weekday charts.
pub const WEEKDAY_ORDER: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One row of the loan dataset after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanRecord {
    pub id: String,
    /// Currency units.
    pub loan_amount: f64,
    /// Percent, e.g. `12.5` for 12.5%.
    pub interest_rate: f64,
    pub issue_date: NaiveDate,
    pub issue_weekday: Weekday,
    /// Underscores already replaced with spaces.
    pub purpose: String,
    pub term: String,
    pub loan_condition: LoanCondition,
    pub grade: String,
}

/// Resolved runtime configuration for a dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub initial_condition: LoanCondition,
    pub histogram_bins: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl DashboardConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            initial_condition: LoanCondition::Good,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            chart_width: DEFAULT_CHART_SIZE.0,
            chart_height: DEFAULT_CHART_SIZE.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_parse_accepts_labels_and_slugs() {
        assert_eq!(LoanCondition::parse("Good Loan"), Some(LoanCondition::Good));
        assert_eq!(LoanCondition::parse(" bad loan "), Some(LoanCondition::Bad));
        assert_eq!(LoanCondition::parse("bad"), Some(LoanCondition::Bad));
        assert_eq!(LoanCondition::parse("Default"), None);

        assert_eq!(LoanCondition::from_label(" good loan "), Some(LoanCondition::Good));
        assert_eq!(LoanCondition::from_label("good"), None);
        assert_eq!(LoanCondition::from_label("Bad"), None);
    }

    #[test]
    fn weekday_order_starts_monday() {
        let names: Vec<&str> = WEEKDAY_ORDER.iter().map(|d| weekday_name(*d)).collect();
        assert_eq!(
            names,
            ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
    }
}
