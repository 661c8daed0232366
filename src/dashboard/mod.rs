//! Dashboard session: one loaded table, cached views, explicit updates.
//!
//! The table is loaded once per session and every view is computed from it
//! up front. After that the only ways to change anything are the events in
//! `DashboardEvent`:
//!
//! - `SelectCondition` recomputes just the two views that depend on the
//!   condition filter (`AmountHistogram`, `PurposeBox`)
//! - `Refresh` re-reads the dataset and recomputes everything
//!
//! Each view carries a revision counter that is bumped when it is recomputed,
//! so front-ends can redraw only what changed.

use tracing::{debug, info};

use crate::analysis::{
    self, AmountHistogram, BoxStats, CategoryCount, ConditionShare, MetricSummary, TimePoint,
};
use crate::domain::{DashboardConfig, LoanCondition};
use crate::error::AppError;
use crate::io::ingest::{LoanTable, load_loans};

const VIEW_COUNT: usize = 8;

/// Every view the dashboard renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Metrics,
    LoansOverTime,
    AmountOverTime,
    LoansByWeekday,
    ConditionShare,
    GradeDistribution,
    AmountHistogram,
    PurposeBox,
}

impl ViewId {
    pub const ALL: [ViewId; VIEW_COUNT] = [
        ViewId::Metrics,
        ViewId::LoansOverTime,
        ViewId::AmountOverTime,
        ViewId::LoansByWeekday,
        ViewId::ConditionShare,
        ViewId::GradeDistribution,
        ViewId::AmountHistogram,
        ViewId::PurposeBox,
    ];

    /// Views fed by the condition-filtered table.
    pub const CONDITION_DEPENDENT: [ViewId; 2] = [ViewId::AmountHistogram, ViewId::PurposeBox];

    /// Stable snake_case identifier used in JSON output.
    pub fn name(self) -> &'static str {
        match self {
            ViewId::Metrics => "metrics",
            ViewId::LoansOverTime => "loans_over_time",
            ViewId::AmountOverTime => "amount_over_time",
            ViewId::LoansByWeekday => "loans_by_weekday",
            ViewId::ConditionShare => "condition_share",
            ViewId::GradeDistribution => "grade_distribution",
            ViewId::AmountHistogram => "amount_histogram",
            ViewId::PurposeBox => "purpose_box",
        }
    }

    pub fn is_condition_dependent(self) -> bool {
        Self::CONDITION_DEPENDENT.contains(&self)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Navigable pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Everything: tiles, time series, loan performance, financial analysis.
    Overview,
    /// Only the condition-filtered financial analysis.
    Financial,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Financial => "Financial Analysis",
        }
    }
}

/// A user input that may change what the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    SelectCondition(LoanCondition),
    Refresh,
}

/// Views computed from the full, unfiltered table.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewViews {
    pub metrics: MetricSummary,
    pub loans_per_date: Vec<TimePoint>,
    pub amount_per_date: Vec<TimePoint>,
    pub loans_per_weekday: Vec<CategoryCount>,
    pub condition_share: Vec<ConditionShare>,
    pub grade_counts: Vec<CategoryCount>,
}

/// Views computed from the rows matching one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialViews {
    pub condition: LoanCondition,
    /// Number of rows behind both charts.
    pub rows: usize,
    pub histogram: AmountHistogram,
    pub boxes: Vec<BoxStats>,
}

pub fn compute_overview(table: &LoanTable) -> OverviewViews {
    let records = &table.records;
    OverviewViews {
        metrics: analysis::summarize(records),
        loans_per_date: analysis::loans_per_date(records),
        amount_per_date: analysis::amount_per_date(records),
        loans_per_weekday: analysis::loans_per_weekday(records),
        condition_share: analysis::condition_counts(records),
        grade_counts: analysis::grade_counts(records),
    }
}

pub fn compute_financial(table: &LoanTable, condition: LoanCondition, bins: usize) -> FinancialViews {
    let filtered = analysis::filter_by_condition(&table.records, condition);
    FinancialViews {
        condition,
        rows: filtered.len(),
        histogram: analysis::amount_histogram(&filtered, bins),
        boxes: analysis::purpose_box_stats(&filtered),
    }
}

/// A loaded dashboard session.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    table: LoanTable,
    condition: LoanCondition,
    overview: OverviewViews,
    financial: FinancialViews,
    revisions: [u64; VIEW_COUNT],
}

impl Dashboard {
    /// Load the configured dataset and compute every view.
    pub fn load(config: DashboardConfig) -> Result<Self, AppError> {
        let table = load_loans(&config.data_path)?;
        Ok(Self::from_table(config, table))
    }

    /// Build a session around an already-loaded table.
    pub fn from_table(config: DashboardConfig, table: LoanTable) -> Self {
        let condition = config.initial_condition;
        let overview = compute_overview(&table);
        let financial = compute_financial(&table, condition, config.histogram_bins);
        Self {
            config,
            table,
            condition,
            overview,
            financial,
            revisions: [1; VIEW_COUNT],
        }
    }

    /// Handle one event and return the views that were recomputed.
    pub fn apply(&mut self, event: DashboardEvent) -> Result<Vec<ViewId>, AppError> {
        match event {
            DashboardEvent::SelectCondition(condition) => Ok(self.select_condition(condition)),
            DashboardEvent::Refresh => self.refresh(),
        }
    }

    /// Switch the condition filter; a no-op when it is already selected.
    pub fn select_condition(&mut self, condition: LoanCondition) -> Vec<ViewId> {
        if condition == self.condition {
            return Vec::new();
        }
        self.condition = condition;
        self.financial = compute_financial(&self.table, condition, self.config.histogram_bins);
        self.bump(&ViewId::CONDITION_DEPENDENT);
        debug!(condition = %condition, rows = self.financial.rows, "recomputed condition views");
        ViewId::CONDITION_DEPENDENT.to_vec()
    }

    /// Re-read the dataset from disk.
    ///
    /// On failure the current table and views are kept.
    pub fn refresh(&mut self) -> Result<Vec<ViewId>, AppError> {
        let table = load_loans(&self.config.data_path)?;
        self.overview = compute_overview(&table);
        self.financial = compute_financial(&table, self.condition, self.config.histogram_bins);
        self.table = table;
        self.bump(&ViewId::ALL);
        info!(rows = self.table.len(), "dashboard refreshed");
        Ok(ViewId::ALL.to_vec())
    }

    /// Financial views for an arbitrary condition, without changing the
    /// selection. Used to pre-render both dropdown states.
    pub fn financial_for(&self, condition: LoanCondition) -> FinancialViews {
        if condition == self.condition {
            return self.financial.clone();
        }
        compute_financial(&self.table, condition, self.config.histogram_bins)
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn table(&self) -> &LoanTable {
        &self.table
    }

    pub fn condition(&self) -> LoanCondition {
        self.condition
    }

    pub fn overview(&self) -> &OverviewViews {
        &self.overview
    }

    pub fn financial(&self) -> &FinancialViews {
        &self.financial
    }

    pub fn revision(&self, view: ViewId) -> u64 {
        self.revisions[view.index()]
    }

    fn bump(&mut self, views: &[ViewId]) {
        for view in views {
            self.revisions[view.index()] += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::loan_with;
    use std::path::PathBuf;

    fn table() -> LoanTable {
        LoanTable {
            records: vec![
                loan_with("1", 100.0, LoanCondition::Good, "car", "36 months"),
                loan_with("2", 200.0, LoanCondition::Bad, "car", "60 months"),
                loan_with("3", 300.0, LoanCondition::Bad, "house", "36 months"),
            ],
            source: PathBuf::from("mem.csv"),
            row_errors: Vec::new(),
            rows_read: 3,
        }
    }

    #[test]
    fn selecting_condition_recomputes_only_dependent_views() {
        let mut dash = Dashboard::from_table(DashboardConfig::new("mem.csv"), table());
        assert_eq!(dash.financial().rows, 1);

        let changed = dash.apply(DashboardEvent::SelectCondition(LoanCondition::Bad)).unwrap();
        assert_eq!(changed, ViewId::CONDITION_DEPENDENT.to_vec());
        assert_eq!(dash.revision(ViewId::AmountHistogram), 2);
        assert_eq!(dash.revision(ViewId::PurposeBox), 2);
        assert_eq!(dash.revision(ViewId::Metrics), 1);
        assert_eq!(dash.revision(ViewId::GradeDistribution), 1);

        assert_eq!(dash.financial().condition, LoanCondition::Bad);
        assert_eq!(dash.financial().rows, 2);
        assert_eq!(dash.financial().histogram.totals().iter().sum::<usize>(), 2);
        assert!(dash.financial().boxes.iter().all(|b| b.n > 0));
        let box_rows: usize = dash.financial().boxes.iter().map(|b| b.n).sum();
        assert_eq!(box_rows, 2);
    }

    #[test]
    fn reselecting_same_condition_is_noop() {
        let mut dash = Dashboard::from_table(DashboardConfig::new("mem.csv"), table());
        let changed = dash.select_condition(LoanCondition::Good);
        assert!(changed.is_empty());
        assert_eq!(dash.revision(ViewId::AmountHistogram), 1);
    }

    #[test]
    fn financial_for_does_not_change_selection() {
        let dash = Dashboard::from_table(DashboardConfig::new("mem.csv"), table());
        let bad = dash.financial_for(LoanCondition::Bad);
        assert_eq!(bad.rows, 2);
        assert_eq!(dash.condition(), LoanCondition::Good);
    }

    #[test]
    fn failed_refresh_keeps_current_data() {
        let mut dash = Dashboard::from_table(DashboardConfig::new("/nonexistent/loans.csv"), table());
        let err = dash.apply(DashboardEvent::Refresh).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(dash.table().len(), 3);
        assert_eq!(dash.revision(ViewId::Metrics), 1);
    }
}
