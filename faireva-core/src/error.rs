use thiserror::Error;

use crate::model::Principle;

#[derive(Error, Debug)]
pub enum Error {
    // catalog
    #[error("Unknown indicator: {name}")]
    UnresolvedIndicator { name: String },
    #[error("Indicator defined more than once in catalog: {name}")]
    DuplicateIndicator { name: String },

    // aggregation
    #[error("No weighted indicators to score for principle: {principle}")]
    EmptyPrinciple { principle: Principle },
    #[error("No weighted indicators to compute a total score")]
    EmptyEvaluation,

    // persistence
    #[error("Output file format not supported: {0}")]
    UnsupportedFormat(String),
    #[error("Score for indicator {indicator} is not numeric: {value}")]
    InvalidScore { indicator: String, value: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
