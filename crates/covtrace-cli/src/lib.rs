//! Crate implementing the CLI commands.

mod cli;
mod config;
mod handler;
mod run;

pub use self::cli::{CliAction, CliAttachTarget, CliOpts, CliSessionArgs};
pub use self::config::DebugConfig;
pub use self::handler::{ExceptionTriage, ReportingHandler, SessionSummary};
pub use self::run::evaluate_run;
