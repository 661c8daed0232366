//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the level comes from the CLI
//! verbosity flags. Output goes to stderr so stdout stays clean for reports.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Map `-v` / `-q` counts to a default filter directive.
pub fn level_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global fmt subscriber.
///
/// Calling this twice is an error from `tracing`; callers do it once from
/// `app::run`.
pub fn init(verbose: u8, quiet: bool) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("loandash={}", level_directive(verbose, quiet))));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| AppError::runtime(format!("Failed to install logger: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(level_directive(2, true), "warn");
        assert_eq!(level_directive(0, false), "info");
        assert_eq!(level_directive(1, false), "debug");
        assert_eq!(level_directive(5, false), "trace");
    }
}
