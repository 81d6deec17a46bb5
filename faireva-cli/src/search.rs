//! Interactive resolution of a free-text query into a record identifier.

use std::io::{self, BufRead, Write};

use faireva_core::{Candidate, render::candidates_table};
use tracing::{info, warn};

use crate::{
    api_client::ApiClient,
    error::{CliError, CliResult},
};

/// Plugins whose metadata endpoint offers free-text search.
pub const SEARCHABLE_PLUGINS: [&str; 2] = ["epos", "epos_prod"];

pub const MAX_SELECTION_ATTEMPTS: usize = 5;

pub fn supports_search(plugin: &str) -> bool {
    SEARCHABLE_PLUGINS.contains(&plugin)
}

/// A valid index in `[0, candidate_count)`, if `input` is one.
pub fn parse_index(input: &str, candidate_count: usize) -> Option<usize> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|index| *index < candidate_count)
}

/// First valid index among at most `max_attempts` inputs.
pub fn resolve_selection<I, S>(
    inputs: I,
    candidate_count: usize,
    max_attempts: usize,
) -> Option<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for input in inputs.into_iter().take(max_attempts) {
        let input = input.as_ref();
        match parse_index(input, candidate_count) {
            Some(index) => return Some(index),
            None => warn!(
                "Invalid choice {:?}: please introduce an integer between 0 and {}",
                input,
                candidate_count.saturating_sub(1)
            ),
        }
    }
    None
}

#[cfg_attr(test, mockall::automock)]
pub trait Prompt {
    /// Shows `question` and reads one answer; `None` once input is exhausted.
    fn ask(&mut self, question: &str) -> Option<String>;
}

pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Option<String> {
        print!("{}", question);
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end().to_string()),
        }
    }
}

pub struct SearchDisambiguator<P> {
    prompt: P,
    max_attempts: usize,
}

impl<P: Prompt> SearchDisambiguator<P> {
    pub fn new(prompt: P) -> Self {
        Self {
            prompt,
            max_attempts: MAX_SELECTION_ATTEMPTS,
        }
    }

    /// Searches `metadata_endpoint` for `query` and lets the operator pick a result.
    /// `Ok(None)` means no valid choice was made.
    pub async fn disambiguate<W: Write>(
        &mut self,
        client: &ApiClient,
        plugin: &str,
        metadata_endpoint: &str,
        query: &str,
        out: &mut W,
    ) -> CliResult<Option<Candidate>> {
        if !supports_search(plugin) {
            info!(
                "The search function is only available for the following plugins: {}",
                SEARCHABLE_PLUGINS.join(", ")
            );
            return Err(CliError::SearchUnsupported {
                plugin: plugin.to_string(),
                supported: SEARCHABLE_PLUGINS.join(", "),
            });
        }

        let candidates = client.search(metadata_endpoint, query).await?;
        self.choose(candidates, out)
    }

    /// Prints the candidate table and reads the operator's choice.
    pub fn choose<W: Write>(
        &mut self,
        candidates: Vec<Candidate>,
        out: &mut W,
    ) -> CliResult<Option<Candidate>> {
        writeln!(out, "{}", candidates_table(&candidates))?;
        out.flush()?;

        let question = format!(
            "Please choose the index of the item you want to evaluate (from 0 to {}): ",
            candidates.len().saturating_sub(1)
        );
        let prompt = &mut self.prompt;
        let answers = std::iter::from_fn(|| prompt.ask(&question));

        match resolve_selection(answers, candidates.len(), self.max_attempts) {
            Some(index) => Ok(candidates.into_iter().nth(index)),
            None => {
                info!("Max tries, restart program");
                Ok(None)
            }
        }
    }
}
