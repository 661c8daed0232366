//! `loandash` library crate.
//!
//! The binary (`loandash`) is a thin wrapper around this library so that
//! loading, aggregation and rendering are testable without spawning
//! processes, and every front-end (terminal summary, static HTML, HTTP
//! server, TUI) shares one `dashboard::Dashboard` session type.

pub mod analysis;
pub mod app;
pub mod chart;
pub mod cli;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod error;
pub mod html;
pub mod io;
pub mod logging;
pub mod report;
pub mod server;
pub mod tui;
