//! CLI module
//!
//! Command-line interface for harvest runs.
//!
//! # Commands
//!
//! - `fetch` - Harvest every target and write snapshots and exports
//! - `validate` - Check config, targets and windows without any request
//! - `endpoints` - List built-in datasets

mod commands;
mod harvest;
mod runner;

pub use commands::{Cli, Commands, FetchArgs, TOKEN_ENV};
pub use harvest::{Harvest, RunSummary, TargetSummary};
pub use runner::{apply_overrides, Runner};
