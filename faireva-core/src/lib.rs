//! # faireva-core
//!
//! Client-side logic for FAIR EVA assessments: everything that happens to an
//! evaluator response once it has been received.
//!
//! - [`catalog`]: the RDA indicator catalog (internal name → published ID, description)
//! - [`model`]: request/response shapes of the evaluator and search APIs
//! - [`aggregate`]: weighted principle and total scores
//! - [`render`]: message normalization, indicator/summary tables, raw JSON
//! - [`persist`]: CSV and Feather output files
//!
//! ```text
//! EvaluationResponse → EvaluationResult → ScoreAggregator → ScoreSummary
//!                                       ↘ collect_score_rows → tables / files
//! ```

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod model;
pub mod persist;
pub mod render;
pub mod table;

pub use aggregate::{Score, ScoreAggregator, ScoreSummary};
pub use catalog::{IndicatorCatalog, IndicatorCatalogEntry, Priority};
pub use error::{Error, Result};
pub use model::{
    Candidate, EvaluationRequest, EvaluationResponse, EvaluationResult, Message, Principle,
    PrincipleResult, RawIndicatorResult,
};
pub use persist::{OutputFormat, ResultPersister};
pub use render::{OutputMode, ScoreRow};
