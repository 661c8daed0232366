//! Aggregations over the loan table.
//!
//! Every function here is a pure function of a record slice, so views can be
//! recomputed independently of one another.

pub mod distribution;
pub mod metrics;
pub mod series;

pub use distribution::*;
pub use metrics::*;
pub use series::*;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Datelike, NaiveDate};

    use crate::domain::{LoanCondition, LoanRecord};

    pub fn loan(id: &str, amount: f64, date: &str) -> LoanRecord {
        let issue_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        LoanRecord {
            id: id.to_string(),
            loan_amount: amount,
            interest_rate: 10.0,
            issue_date,
            issue_weekday: issue_date.weekday(),
            purpose: "credit card".to_string(),
            term: "36 months".to_string(),
            loan_condition: LoanCondition::Good,
            grade: "B".to_string(),
        }
    }

    pub fn loan_with(id: &str, amount: f64, condition: LoanCondition, purpose: &str, term: &str) -> LoanRecord {
        LoanRecord {
            loan_condition: condition,
            purpose: purpose.to_string(),
            term: term.to_string(),
            ..loan(id, amount, "2014-01-06")
        }
    }
}
