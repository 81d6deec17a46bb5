use std::{io, path::PathBuf, process};

use clap::Parser;
use faireva_cli::{
    CliResult,
    config::Settings,
    runner::{Outcome, RunOptions, run},
    search::StdinPrompt,
};
use faireva_core::OutputMode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Evaluate the FAIRness of a (meta)data record with a FAIR EVA service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Identifier of the (meta)data record
    #[arg(short, long, required_unless_present = "search")]
    id: Option<String>,

    /// Evaluator plugin, e.g. oai-pmh or epos
    #[arg(short, long)]
    plugin: String,

    /// Metadata endpoint; looked up from the plugin when omitted
    #[arg(short, long)]
    repository: Option<String>,

    /// FAIR EVA evaluation endpoint
    #[arg(long, env = "FAIR_EVA_API_ENDPOINT")]
    api_endpoint: Option<String>,

    /// Print the raw JSON result instead of tables
    #[arg(short, long)]
    json: bool,

    /// Also print per-principle and total scores
    #[arg(long)]
    totals: bool,

    /// Print the evaluator's log lines after the result
    #[arg(long)]
    logs: bool,

    /// Free-text search for the record to evaluate
    #[arg(short, long)]
    search: Option<String>,

    /// Store the scores as a Feather file
    #[arg(long)]
    store_feather: bool,

    /// Store the scores as a CSV file
    #[arg(long)]
    store_csv: bool,

    /// Directory holding settings.json
    #[arg(long, env = "FAIR_EVA_CONFIG_DIR")]
    config_dir: Option<String>,

    /// Directory for stored result files
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            identifier: self.id.clone(),
            search: self.search.clone(),
            plugin: self.plugin.clone(),
            repository: self.repository.clone(),
            output: if self.json {
                OutputMode::Raw
            } else {
                OutputMode::Table {
                    totals: self.totals,
                }
            },
            evaluator_logs: self.logs,
            store_feather: self.store_feather,
            store_csv: self.store_csv,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    match execute(&cli).await {
        Ok(Outcome::Evaluated { context, .. }) => {
            debug!("Evaluation of {} finished", context.identifier)
        }
        Ok(Outcome::NothingSelected) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

async fn execute(cli: &Cli) -> CliResult<Outcome> {
    let settings = Settings::initialize(
        cli.config_dir.clone(),
        cli.api_endpoint.clone(),
        cli.output_dir.clone(),
    )?;
    debug!("Settings: {:?}", settings);

    run(&settings, &cli.run_options(), StdinPrompt, &mut io::stdout()).await
}
