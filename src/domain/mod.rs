//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - the normalized loan row (`LoanRecord`)
//! - fixed vocabularies (`LoanCondition`, weekday ordering)
//! - session configuration (`DashboardConfig`)

pub mod types;

pub use types::*;
