//! Rendering of evaluation results as tables or JSON.

use serde::Serialize;
use serde_json::Value;

use crate::{
    aggregate::ScoreSummary,
    catalog::IndicatorCatalog,
    error::Result,
    model::{Candidate, EvaluationResult, Message, MessageRecord, Principle},
    table::TextTable,
};

pub const NOT_AVAILABLE: &str = "Not available";

const INDICATOR_MAX_WIDTH: usize = 40;
const OUTPUT_MAX_WIDTH: usize = 60;
const TITLE_MAX_WIDTH: usize = 100;
const CANDIDATE_DIVIDER_EVERY: usize = 5;

/// How a result is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// The evaluator's result document, unmodified
    Raw,
    /// Indicator table, optionally preceded by a per-principle summary
    Table { totals: bool },
}

/// Flattens an indicator message into table text.
pub fn normalize_message(message: &Message) -> String {
    match message {
        Message::Text(text) => text.clone(),
        Message::Mapping(map) => Value::Object(map.clone()).to_string(),
        Message::Empty => NOT_AVAILABLE.to_string(),
        Message::Lines(lines) => lines.join("\n"),
        Message::Records(records) => match records.as_slice() {
            [] => NOT_AVAILABLE.to_string(),
            [single] => single
                .message_text()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            many => many
                .iter()
                .map(annotated_record)
                .collect::<Vec<_>>()
                .join("\n"),
        },
    }
}

fn annotated_record(record: &MessageRecord) -> String {
    let message = record
        .message_text()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let points = record.points_text().unwrap_or_else(|| "NA".to_string());
    format!("{} (points: {})", message, points)
}

/// One line of the indicator table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub indicator_id: String,
    pub description: String,
    pub score: String,
    pub message: String,
}

impl ScoreRow {
    fn into_cells(self) -> Vec<String> {
        vec![self.indicator_id, self.description, self.score, self.message]
    }
}

/// Builds indicator rows principle by principle, in display order.
pub fn collect_score_rows(
    result: &EvaluationResult,
    catalog: &IndicatorCatalog,
) -> Result<Vec<ScoreRow>> {
    result
        .indicators()
        .map(|(_, indicator)| {
            let entry = catalog.resolve(&indicator.name)?;
            Ok(ScoreRow {
                indicator_id: entry.id.to_string(),
                description: entry.description.to_string(),
                score: format!("{:.2}", indicator.points),
                message: normalize_message(&indicator.message),
            })
        })
        .collect()
}

pub fn indicator_table(rows: &[ScoreRow]) -> TextTable {
    let mut table = TextTable::new(["ID", "Indicator", "Score", "Output"])
        .with_max_width("Indicator", INDICATOR_MAX_WIDTH)
        .with_max_width("Output", OUTPUT_MAX_WIDTH);
    for row in rows {
        table.add_row(row.clone().into_cells());
    }
    table
}

/// Principle scores, a rule, then the total.
pub fn summary_table(summary: &ScoreSummary) -> TextTable {
    let mut table = TextTable::new(["FAIR principle", "Score"]);
    for (index, principle) in Principle::ALL.iter().enumerate() {
        let cells = vec![
            principle.capitalized(),
            summary.score(*principle).to_string(),
        ];
        if index + 1 == Principle::ALL.len() {
            table.add_row_with_divider(cells);
        } else {
            table.add_row(cells);
        }
    }
    table.add_row(vec!["Total".to_string(), summary.total.to_string()]);
    table
}

/// Search candidates with their selectable index.
pub fn candidates_table(candidates: &[Candidate]) -> TextTable {
    let mut table = TextTable::new(["Title", "Index"]).with_max_width("Title", TITLE_MAX_WIDTH);
    for (index, candidate) in candidates.iter().enumerate() {
        let cells = vec![candidate.title.clone(), index.to_string()];
        if (index + 1) % CANDIDATE_DIVIDER_EVERY == 0 {
            table.add_row_with_divider(cells);
        } else {
            table.add_row(cells);
        }
    }
    table
}

/// Renders the tabular view; the summary table comes first when given.
pub fn render_tables(rows: &[ScoreRow], summary: Option<&ScoreSummary>) -> String {
    let mut out = String::new();
    if let Some(summary) = summary {
        out.push_str(&summary_table(summary).render());
    }
    out.push_str(&indicator_table(rows).render());
    out
}

pub fn render_raw(raw: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(raw)?)
}
