//! Command-line client for a FAIR EVA evaluation service.

pub mod api_client;
pub mod config;
pub mod error;
pub mod probe;
pub mod runner;
pub mod search;

pub use error::{CliError, CliResult};
pub use runner::{EvaluationContext, Outcome, RunOptions, run};
