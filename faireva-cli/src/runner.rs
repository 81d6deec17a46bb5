//! One evaluation run: readiness gate, endpoint and identifier resolution,
//! evaluation, scoring, output and optional persistence.

use std::io::Write;
use std::path::PathBuf;

use faireva_core::{
    EvaluationRequest, IndicatorCatalog, OutputFormat, OutputMode, ResultPersister,
    ScoreAggregator,
    render::{collect_score_rows, render_raw, render_tables},
};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    api_client::ApiClient,
    config::Settings,
    error::{CliError, CliResult},
    probe::{ReadinessProbe, RetryPolicy},
    search::{Prompt, SearchDisambiguator},
};

pub const EVALUATOR_LOGS_BANNER: &str = "----- Evaluator logs -----";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub identifier: Option<String>,
    pub search: Option<String>,
    pub plugin: String,
    pub repository: Option<String>,
    pub output: OutputMode,
    pub evaluator_logs: bool,
    pub store_feather: bool,
    pub store_csv: bool,
}

impl RunOptions {
    fn formats(&self) -> Vec<OutputFormat> {
        let mut formats = Vec::new();
        if self.store_feather {
            formats.push(OutputFormat::Feather);
        }
        if self.store_csv {
            formats.push(OutputFormat::Csv);
        }
        formats
    }
}

/// Values resolved while a run progresses and consumed by its later steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationContext {
    pub identifier: String,
    pub plugin: String,
    pub metadata_endpoint: String,
    /// Title of the record chosen through search
    pub title: Option<String>,
}

impl EvaluationContext {
    pub fn request(&self) -> EvaluationRequest {
        EvaluationRequest::new(&self.identifier, &self.plugin, &self.metadata_endpoint)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Evaluated {
        context: EvaluationContext,
        stored: Vec<PathBuf>,
    },
    /// Search ran but the operator did not pick a record.
    NothingSelected,
}

pub async fn run<P: Prompt, W: Write>(
    settings: &Settings,
    options: &RunOptions,
    prompt: P,
    out: &mut W,
) -> CliResult<Outcome> {
    let catalog = IndicatorCatalog::rda()?;

    let (host, port) = settings.probe_target()?;
    ReadinessProbe::tcp(RetryPolicy::from(settings), settings.connect_timeout)
        .wait_until_ready(&host, port)
        .await?;

    let client = ApiClient::new(settings)?;
    let metadata_endpoint = match &options.repository {
        Some(repository) => repository.clone(),
        None => client.metadata_endpoint(&options.plugin).await?,
    };

    let (identifier, title) = match &options.search {
        Some(query) => {
            let selected = SearchDisambiguator::new(prompt)
                .disambiguate(&client, &options.plugin, &metadata_endpoint, query, out)
                .await?;
            match selected {
                Some(candidate) => (candidate.id, Some(candidate.title)),
                None => {
                    info!("No item selected, nothing to evaluate");
                    return Ok(Outcome::NothingSelected);
                }
            }
        }
        None => (
            options
                .identifier
                .clone()
                .ok_or(CliError::MissingIdentifier)?,
            None,
        ),
    };

    let context = EvaluationContext {
        identifier,
        plugin: options.plugin.clone(),
        metadata_endpoint,
        title,
    };
    match &context.title {
        Some(title) => info!("Evaluating \"{}\" with id: {}", title, context.identifier),
        None => info!("Evaluating item with id : {}", context.identifier),
    }

    let response = client.evaluate(&context.request()).await?;
    let formats = options.formats();
    let rows = if matches!(options.output, OutputMode::Table { .. }) || !formats.is_empty() {
        let mut result = response.result_for(&context.identifier)?;
        debug!("FAIR results for (meta)data ID: {:?}", result);
        let rows = collect_score_rows(&result, &catalog)?;
        if let OutputMode::Table { totals } = options.output {
            let summary = if totals {
                Some(ScoreAggregator::new(&catalog).aggregate(&mut result)?)
            } else {
                None
            };
            write!(out, "{}", render_tables(&rows, summary.as_ref()))?;
        }
        rows
    } else {
        Vec::new()
    };

    if options.output == OutputMode::Raw {
        let raw = response
            .raw_result(&context.identifier)
            .cloned()
            .unwrap_or_else(|| json!({}));
        writeln!(out, "{}", render_raw(&raw)?)?;
    }

    if options.evaluator_logs {
        writeln!(out, "\n{}", EVALUATOR_LOGS_BANNER)?;
        for line in &response.evaluator_logs {
            writeln!(out, "{}", line)?;
        }
    }

    let persister = ResultPersister::new(&settings.output_dir);
    let stored = formats
        .into_iter()
        .map(|format| persister.persist_as(&context.identifier, &rows, format))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Outcome::Evaluated { context, stored })
}
