//! Command-line parsing for the loan dashboard.
//!
//! Parsing and dispatch stay separate from the analysis and rendering code.
//! Flags backed by environment variables can also be set in a `.env` file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_CHART_SIZE, DEFAULT_HISTOGRAM_BINS, LoanCondition};
use crate::server::DEFAULT_ADDR;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "loandash", version, about = "Loan portfolio dashboard")]
pub struct Cli {
    /// Loan dataset CSV (default: data_input/loan_clean.csv, else an interactive picker).
    #[arg(long, global = true, env = "LOANDASH_DATA", value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the metric tiles and aggregates; optionally export a JSON snapshot.
    Summary(SummaryArgs),
    /// Write the dashboard as static HTML pages.
    Render(RenderArgs),
    /// Serve the dashboard over HTTP.
    Serve(ServeArgs),
    /// Launch the interactive terminal dashboard.
    Tui(ViewArgs),
    /// Write a synthetic loan dataset.
    Sample(SampleArgs),
}

/// Options shared by every command that shows the dashboard.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// Initially selected loan condition.
    #[arg(long, value_enum, default_value_t = LoanCondition::Good)]
    pub condition: LoanCondition,

    /// Histogram bins for the loan-amount distribution (1 to 1000).
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    pub bins: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Write a JSON snapshot of every view.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output directory for index.html and financial.html.
    #[arg(long, value_name = "DIR", default_value = "dashboard")]
    pub out: PathBuf,

    /// Chart width in pixels.
    #[arg(long, default_value_t = DEFAULT_CHART_SIZE.0)]
    pub chart_width: u32,

    /// Chart height in pixels.
    #[arg(long, default_value_t = DEFAULT_CHART_SIZE.1)]
    pub chart_height: u32,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Listen address.
    #[arg(long, env = "LOANDASH_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of loans to generate.
    #[arg(long, default_value_t = 5_000)]
    pub rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(long, value_name = "CSV", default_value = crate::domain::DEFAULT_DATA_PATH)]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "loandash", "serve", "--data", "x.csv", "-vv", "--condition", "bad", "--addr", "0.0.0.0:9000",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("x.csv")));
        assert_eq!(cli.verbose, 2);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.view.condition, LoanCondition::Bad);
        assert_eq!(args.addr, "0.0.0.0:9000");
        assert_eq!(args.view.bins, 30);
    }

    #[test]
    fn sample_defaults() {
        let cli = Cli::try_parse_from(["loandash", "sample", "--rows", "10"]).unwrap();
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.rows, 10);
        assert_eq!(args.seed, 42);
        assert_eq!(args.out, PathBuf::from("data_input/loan_clean.csv"));
    }

    #[test]
    fn rejects_unknown_condition() {
        assert!(Cli::try_parse_from(["loandash", "tui", "--condition", "default"]).is_err());
    }
}
