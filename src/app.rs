//! Top-level application orchestration.
//!
//! `src/main.rs` is tiny; this module is the real main that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - loads the dashboard and hands it to the chosen front-end

use std::path::Path;

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, RenderArgs, SampleArgs, ServeArgs, SummaryArgs, ViewArgs};
use crate::dashboard::Page;
use crate::error::AppError;
use crate::html::{self, RenderMode};

pub mod pipeline;

const SUBCOMMANDS: [&str; 6] = ["summary", "render", "serve", "tui", "sample", "help"];

/// Entry point for the `loandash` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    // The TUI owns the terminal; log lines on stderr would corrupt it.
    if !matches!(cli.command, Command::Tui(_)) {
        crate::logging::init(cli.verbose, cli.quiet)?;
    }

    let data = cli.data.as_deref();
    match cli.command {
        Command::Summary(args) => handle_summary(data, args),
        Command::Render(args) => handle_render(data, args),
        Command::Serve(args) => handle_serve(data, args),
        Command::Tui(args) => handle_tui(data, args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_summary(data: Option<&Path>, args: SummaryArgs) -> Result<(), AppError> {
    let dash = pipeline::load_dashboard(data, &args.view, None)?;
    println!("{}", crate::report::format_summary(&dash));

    if let Some(path) = &args.json {
        crate::io::export::write_snapshot_json(path, &dash)?;
        info!(path = %path.display(), "wrote snapshot");
    }
    Ok(())
}

fn handle_render(data: Option<&Path>, args: RenderArgs) -> Result<(), AppError> {
    let dash = pipeline::load_dashboard(data, &args.view, Some((args.chart_width, args.chart_height)))?;

    std::fs::create_dir_all(&args.out)
        .map_err(|e| AppError::runtime(format!("Failed to create '{}': {e}", args.out.display())))?;

    for page in [Page::Overview, Page::Financial] {
        let body = html::render_page(&dash, page, RenderMode::Static)?;
        let path = args.out.join(html::page_file_name(page));
        std::fs::write(&path, body)
            .map_err(|e| AppError::runtime(format!("Failed to write '{}': {e}", path.display())))?;
        info!(page = page.title(), path = %path.display(), "wrote page");
        println!("{}", path.display());
    }
    Ok(())
}

fn handle_serve(data: Option<&Path>, args: ServeArgs) -> Result<(), AppError> {
    let dash = pipeline::load_dashboard(data, &args.view, None)?;
    crate::server::serve(dash, &args.addr)
}

fn handle_tui(data: Option<&Path>, args: ViewArgs) -> Result<(), AppError> {
    let dash = pipeline::load_dashboard(data, &args, None)?;
    crate::tui::run(dash)
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig::new(args.rows, args.seed);
    let rows = crate::data::generate_sample(&config)?;
    crate::data::write_sample_csv(&args.out, &rows)?;
    println!("Wrote {} loans to {}", rows.len(), args.out.display());
    Ok(())
}

/// Rewrite argv so a bare `loandash` serves the browser dashboard.
///
/// - `loandash`                 -> `loandash serve`
/// - `loandash --data x.csv`    -> `loandash serve --data x.csv`
/// - help/version or any argv naming a subcommand -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let has_subcommand_or_help = argv.iter().skip(1).any(|a| {
        SUBCOMMANDS.contains(&a.as_str()) || matches!(a.as_str(), "-h" | "--help" | "-V" | "--version")
    });
    if !has_subcommand_or_help {
        argv.insert(1.min(argv.len()), "serve".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_serves() {
        assert_eq!(rewrite_args(args(&["loandash"])), args(&["loandash", "serve"]));
        assert_eq!(
            rewrite_args(args(&["loandash", "--data", "x.csv"])),
            args(&["loandash", "serve", "--data", "x.csv"])
        );
    }

    #[test]
    fn explicit_subcommand_untouched() {
        let argv = args(&["loandash", "--data", "x.csv", "summary"]);
        assert_eq!(rewrite_args(argv.clone()), argv);
        let help = args(&["loandash", "--help"]);
        assert_eq!(rewrite_args(help.clone()), help);
    }
}
