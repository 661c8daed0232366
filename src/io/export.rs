//! JSON snapshot of every computed view.
//!
//! The snapshot is the portable form of a dashboard session: headline
//! metrics, the formatted tiles and one chart spec per view. Condition
//! dependent views appear once per condition so a consumer does not need to
//! re-run the filter.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::analysis::{MetricSummary, MetricTile};
use crate::chart::{self, ChartSpec};
use crate::dashboard::{Dashboard, ViewId};
use crate::domain::LoanCondition;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tool: &'static str,
    pub source: String,
    pub rows_read: usize,
    pub rows_loaded: usize,
    pub row_errors: usize,
    pub selected_condition: LoanCondition,
    pub metrics: MetricSummary,
    pub tiles: Vec<MetricTile>,
    pub views: Vec<ViewSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub view: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<LoanCondition>,
    pub chart: ChartSpec,
}

/// Collect the snapshot for the current session.
pub fn snapshot(dash: &Dashboard) -> Snapshot {
    let table = dash.table();
    let overview = dash.overview();

    let mut views: Vec<ViewSnapshot> = ViewId::ALL
        .iter()
        .filter_map(|view| {
            chart::overview_chart(*view, overview).map(|chart| ViewSnapshot {
                view: view.name(),
                condition: None,
                chart,
            })
        })
        .collect();

    for condition in LoanCondition::ALL {
        let financial = dash.financial_for(condition);
        for view in ViewId::CONDITION_DEPENDENT {
            if let Some(chart) = chart::financial_chart(view, &financial) {
                views.push(ViewSnapshot {
                    view: view.name(),
                    condition: Some(condition),
                    chart,
                });
            }
        }
    }

    Snapshot {
        tool: "loandash",
        source: table.source.display().to_string(),
        rows_read: table.rows_read,
        rows_loaded: table.len(),
        row_errors: table.row_errors.len(),
        selected_condition: dash.condition(),
        metrics: overview.metrics.clone(),
        tiles: overview.metrics.tiles().to_vec(),
        views,
    }
}

/// Write the snapshot as pretty-printed JSON.
pub fn write_snapshot_json(path: &Path, dash: &Dashboard) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::runtime(format!("Failed to create snapshot JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &snapshot(dash))
        .map_err(|e| AppError::runtime(format!("Failed to write snapshot JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::loan_with;
    use crate::domain::DashboardConfig;
    use crate::io::ingest::LoanTable;
    use std::path::PathBuf;

    #[test]
    fn snapshot_lists_dependent_views_per_condition() {
        let table = LoanTable {
            records: vec![
                loan_with("1", 100.0, LoanCondition::Good, "car", "36 months"),
                loan_with("2", 300.0, LoanCondition::Bad, "car", "60 months"),
            ],
            source: PathBuf::from("mem.csv"),
            row_errors: Vec::new(),
            rows_read: 2,
        };
        let dash = Dashboard::from_table(DashboardConfig::new("mem.csv"), table);
        let snap = snapshot(&dash);

        assert_eq!(snap.rows_loaded, 2);
        assert_eq!(snap.views.len(), 5 + 2 * 2);
        let histograms: Vec<_> = snap.views.iter().filter(|v| v.view == "amount_histogram").collect();
        assert_eq!(histograms.len(), 2);
        assert_eq!(histograms[1].condition, Some(LoanCondition::Bad));

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["selected_condition"], "Good Loan");
        assert_eq!(json["tiles"][1]["value"], "$400");
        assert_eq!(json["views"][0]["chart"]["kind"], "line");
        assert!(json["views"][0].get("condition").is_none());
    }
}
