//! Wire and domain models for the FAIR evaluator API.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;
use tracing::debug;

use crate::error::Result;

/// Language tag sent with every evaluation request.
pub const DEFAULT_LANG: &str = "EN";

/// The four FAIR principles, in scoring and display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Principle {
    Findable,
    Accessible,
    Interoperable,
    Reusable,
}

impl Principle {
    pub const ALL: [Principle; 4] = [
        Principle::Findable,
        Principle::Accessible,
        Principle::Interoperable,
        Principle::Reusable,
    ];

    /// Name with a leading capital, as shown in summary tables.
    pub fn capitalized(&self) -> String {
        let name = self.to_string();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Request body for the evaluation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub id: String,
    pub repo: String,
    pub oai_base: String,
    pub lang: String,
}

impl EvaluationRequest {
    pub fn new(id: &str, repo: &str, oai_base: &str) -> Self {
        Self {
            id: id.to_string(),
            repo: repo.to_string(),
            oai_base: oai_base.to_string(),
            lang: DEFAULT_LANG.to_string(),
        }
    }
}

/// One `{message, points}` item of a structured indicator message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Value>,
}

impl MessageRecord {
    /// The record's message as text; non-string values use their JSON form.
    pub fn message_text(&self) -> Option<String> {
        match &self.message {
            None | Some(Value::Null) => None,
            Some(value) => Some(value_text(value)),
        }
    }

    pub fn points_text(&self) -> Option<String> {
        self.points.as_ref().map(value_text)
    }

    fn into_value(self) -> Value {
        let mut record = Map::new();
        if let Some(message) = self.message {
            record.insert("message".to_string(), message);
        }
        if let Some(points) = self.points {
            record.insert("points".to_string(), points);
        }
        Value::Object(record)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// The shapes an indicator message takes in evaluator responses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Message {
    Text(String),
    Mapping(Map<String, Value>),
    #[default]
    Empty,
    Lines(Vec<String>),
    Records(Vec<MessageRecord>),
}

impl TryFrom<Value> for Message {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Message::Empty),
            Value::String(text) => Ok(Message::Text(text)),
            Value::Bool(_) | Value::Number(_) => Ok(Message::Text(value.to_string())),
            Value::Object(map) => Ok(Message::Mapping(map)),
            Value::Array(items) if items.is_empty() => Ok(Message::Empty),
            Value::Array(items) => {
                if items.iter().all(Value::is_string) {
                    let lines = items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(line) => Some(line),
                            _ => None,
                        })
                        .collect();
                    return Ok(Message::Lines(lines));
                }
                serde_json::from_value(Value::Array(items))
                    .map(Message::Records)
                    .map_err(|e| format!("Unsupported indicator message shape: {}", e))
            }
        }
    }
}

impl From<Message> for Value {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Value::String(text),
            Message::Mapping(map) => Value::Object(map),
            Message::Empty => Value::Array(Vec::new()),
            Message::Lines(lines) => Value::Array(lines.into_iter().map(Value::String).collect()),
            Message::Records(records) => Value::Array(
                records
                    .into_iter()
                    .map(MessageRecord::into_value)
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorScore {
    pub weight: f64,
}

/// Result of a single indicator test as returned by the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIndicatorResult {
    pub name: String,
    pub points: f64,
    pub score: IndicatorScore,
    #[serde(default, rename = "msg", alias = "message")]
    pub message: Message,

    /// Display description, attached during aggregation
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    /// Display name, attached during aggregation
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub name_smart: Option<String>,
}

/// Indicator results of one principle, keyed by internal indicator name, in the order
/// the evaluator sent them.
pub type PrincipleResult = IndexMap<String, RawIndicatorResult>;

/// Per-principle indicator results for one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(default)]
    pub findable: PrincipleResult,
    #[serde(default)]
    pub accessible: PrincipleResult,
    #[serde(default)]
    pub interoperable: PrincipleResult,
    #[serde(default)]
    pub reusable: PrincipleResult,
}

impl EvaluationResult {
    pub fn principle(&self, principle: Principle) -> &PrincipleResult {
        match principle {
            Principle::Findable => &self.findable,
            Principle::Accessible => &self.accessible,
            Principle::Interoperable => &self.interoperable,
            Principle::Reusable => &self.reusable,
        }
    }

    pub fn principle_mut(&mut self, principle: Principle) -> &mut PrincipleResult {
        match principle {
            Principle::Findable => &mut self.findable,
            Principle::Accessible => &mut self.accessible,
            Principle::Interoperable => &mut self.interoperable,
            Principle::Reusable => &mut self.reusable,
        }
    }

    /// Iterates indicators principle by principle, in display order.
    pub fn indicators(&self) -> impl Iterator<Item = (Principle, &RawIndicatorResult)> {
        Principle::ALL.into_iter().flat_map(move |principle| {
            self.principle(principle)
                .values()
                .map(move |indicator| (principle, indicator))
        })
    }

    pub fn indicator_count(&self) -> usize {
        Principle::ALL
            .iter()
            .map(|principle| self.principle(*principle).len())
            .sum()
    }
}

/// Response envelope of the evaluation endpoint: one entry per evaluated identifier
/// plus the evaluator's log lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    #[serde(default)]
    pub evaluator_logs: Vec<String>,
    #[serde(flatten)]
    pub results: Map<String, Value>,
}

impl EvaluationResponse {
    /// The result for `identifier` exactly as the evaluator sent it.
    pub fn raw_result(&self, identifier: &str) -> Option<&Value> {
        self.results.get(identifier)
    }

    /// Typed result for `identifier`; an identifier missing from the response yields
    /// an empty result.
    pub fn result_for(&self, identifier: &str) -> Result<EvaluationResult> {
        match self.raw_result(identifier) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => {
                debug!("No results returned for identifier: {}", identifier);
                Ok(EvaluationResult::default())
            }
        }
    }
}

/// A record offered by the metadata search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Option<SearchResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub distributions: Vec<Candidate>,
}

impl SearchResponse {
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.results
            .map(|results| results.distributions)
            .unwrap_or_default()
    }
}
