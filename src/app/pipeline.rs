//! Shared "load a dashboard" logic used by every front-end.
//!
//! dataset path resolution -> `DashboardConfig` -> `Dashboard::load`
//!
//! The summary, HTML, server and TUI front-ends then only deal with
//! presentation.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cli::ViewArgs;
use crate::cli::picker;
use crate::dashboard::Dashboard;
use crate::domain::{DEFAULT_DATA_PATH, DashboardConfig};
use crate::error::AppError;

/// Upper bound for `--bins`.
pub const MAX_BINS: usize = 1000;

/// Where the dataset path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Explicit,
    Default,
    Picked,
}

/// Resolve the dataset path: explicit flag or env, then the default location,
/// then the interactive picker when stdin is a terminal.
pub fn resolve_data_path(explicit: Option<&Path>) -> Result<(PathBuf, DataSource), AppError> {
    resolve_data_path_with(explicit, Path::new(DEFAULT_DATA_PATH), std::io::stdin().is_terminal())
}

fn resolve_data_path_with(
    explicit: Option<&Path>,
    default: &Path,
    interactive: bool,
) -> Result<(PathBuf, DataSource), AppError> {
    if let Some(path) = explicit {
        return Ok((path.to_path_buf(), DataSource::Explicit));
    }
    if default.is_file() {
        return Ok((default.to_path_buf(), DataSource::Default));
    }
    if interactive {
        return picker::prompt_for_dataset().map(|p| (p, DataSource::Picked));
    }
    Err(AppError::input(format!(
        "No dataset: '{}' does not exist. Pass --data <file.csv> or set LOANDASH_DATA.",
        default.display()
    )))
}

/// Build the session config from resolved inputs.
pub fn dashboard_config(data_path: PathBuf, view: &ViewArgs, chart_size: Option<(u32, u32)>) -> Result<DashboardConfig, AppError> {
    if !(1..=MAX_BINS).contains(&view.bins) {
        return Err(AppError::input(format!("--bins must be between 1 and {MAX_BINS}.")));
    }
    let mut config = DashboardConfig::new(data_path);
    config.initial_condition = view.condition;
    config.histogram_bins = view.bins;
    if let Some((w, h)) = chart_size {
        if w < 200 || h < 150 {
            return Err(AppError::input(format!("Chart size {w}x{h} is too small (min 200x150).")));
        }
        config.chart_width = w;
        config.chart_height = h;
    }
    Ok(config)
}

/// Resolve, configure and load a dashboard.
pub fn load_dashboard(
    explicit: Option<&Path>,
    view: &ViewArgs,
    chart_size: Option<(u32, u32)>,
) -> Result<Dashboard, AppError> {
    let (path, source) = resolve_data_path(explicit)?;
    debug!(path = %path.display(), ?source, "resolved dataset");
    let config = dashboard_config(path, view, chart_size)?;
    let dash = Dashboard::load(config)?;
    info!(
        rows = dash.table().len(),
        skipped = dash.table().row_errors.len(),
        condition = %dash.condition(),
        "dashboard ready"
    );
    Ok(dash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoanCondition;

    fn view() -> ViewArgs {
        ViewArgs {
            condition: LoanCondition::Bad,
            bins: 12,
        }
    }

    #[test]
    fn explicit_path_wins() {
        let (path, source) =
            resolve_data_path_with(Some(Path::new("x.csv")), Path::new("/nonexistent.csv"), false).unwrap();
        assert_eq!(path, PathBuf::from("x.csv"));
        assert_eq!(source, DataSource::Explicit);
    }

    #[test]
    fn default_used_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("loan_clean.csv");
        std::fs::write(&default, "id\n").unwrap();
        let (path, source) = resolve_data_path_with(None, &default, false).unwrap();
        assert_eq!(path, default);
        assert_eq!(source, DataSource::Default);
    }

    #[test]
    fn missing_default_without_terminal_is_input_error() {
        let err = resolve_data_path_with(None, Path::new("/nonexistent/loan_clean.csv"), false).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn config_carries_view_options() {
        let config = dashboard_config(PathBuf::from("a.csv"), &view(), Some((800, 500))).unwrap();
        assert_eq!(config.initial_condition, LoanCondition::Bad);
        assert_eq!(config.histogram_bins, 12);
        assert_eq!((config.chart_width, config.chart_height), (800, 500));

        let bad = ViewArgs { bins: 0, ..view() };
        assert_eq!(dashboard_config(PathBuf::from("a.csv"), &bad, None).unwrap_err().exit_code(), 2);
        assert!(dashboard_config(PathBuf::from("a.csv"), &view(), Some((10, 10))).is_err());
    }

    #[test]
    fn bins_are_bounded() {
        let at_max = ViewArgs { bins: MAX_BINS, ..view() };
        assert_eq!(dashboard_config(PathBuf::from("a.csv"), &at_max, None).unwrap().histogram_bins, MAX_BINS);

        let huge = ViewArgs { bins: 65_536, ..view() };
        assert_eq!(dashboard_config(PathBuf::from("a.csv"), &huge, None).unwrap_err().exit_code(), 2);
    }
}
