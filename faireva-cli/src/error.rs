use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// sysexits(3) codes used for fatal failures.
pub mod exit_code {
    pub const USAGE: i32 = 64;
    pub const DATA: i32 = 65;
    pub const NO_INPUT: i32 = 66;
    pub const UNAVAILABLE: i32 = 69;
    pub const CANT_CREATE: i32 = 73;
    pub const IO: i32 = 74;
    pub const PROTOCOL: i32 = 76;
    pub const CONFIG: i32 = 78;
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("FAIR-eva API was not able to launch: {host}:{port} unreachable after {attempts} attempts")]
    ServiceUnavailable {
        host: String,
        port: u16,
        attempts: u32,
    },

    #[error("Error returned by FAIR-EVA API: {status} {reason}")]
    RemoteEvaluation { status: u16, reason: String },

    #[error("Could not find results for search query: {0}")]
    NotFound(String),

    #[error("The search function is only available for the following plugins: {supported} (requested: {plugin})")]
    SearchUnsupported { plugin: String, supported: String },

    #[error("An identifier or a search query is required")]
    MissingIdentifier,

    #[error("{0}")]
    Core(#[from] faireva_core::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Configuration(_) | CliError::Settings(_) => exit_code::CONFIG,
            CliError::ServiceUnavailable { .. } => exit_code::UNAVAILABLE,
            CliError::RemoteEvaluation { status, .. } => i32::from(*status),
            CliError::NotFound(_) => exit_code::NO_INPUT,
            CliError::SearchUnsupported { .. } | CliError::MissingIdentifier => exit_code::USAGE,
            CliError::Core(faireva_core::Error::UnsupportedFormat(_)) => exit_code::USAGE,
            CliError::Core(
                faireva_core::Error::Io(_)
                | faireva_core::Error::Csv(_)
                | faireva_core::Error::Arrow(_),
            ) => exit_code::CANT_CREATE,
            CliError::Core(_) => exit_code::DATA,
            CliError::Http(e) if e.is_connect() || e.is_timeout() => exit_code::UNAVAILABLE,
            CliError::Http(_) => exit_code::PROTOCOL,
            CliError::Io(_) => exit_code::IO,
        }
    }
}
