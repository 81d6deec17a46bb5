use faireva_core::{
    Candidate, EvaluationRequest, EvaluationResponse, model::SearchResponse,
};
use reqwest::{Client, StatusCode, Url, header::ACCEPT};
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    config::Settings,
    error::{CliError, CliResult},
};

pub struct ApiClient {
    client: Client,
    api_url: Url,
    endpoints_url: Url,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> CliResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()?;
        Ok(Self {
            client,
            api_url: settings.api_url()?,
            endpoints_url: settings.endpoints_url()?,
        })
    }

    /// Asks the evaluator which metadata endpoint backs `plugin`.
    pub async fn metadata_endpoint(&self, plugin: &str) -> CliResult<String> {
        let response = self
            .client
            .get(self.endpoints_url.clone())
            .query(&[("plugin", plugin)])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                let accepted = match response.json::<Value>().await {
                    Ok(Value::Object(plugins)) => {
                        plugins.keys().cloned().collect::<Vec<_>>().join(", ")
                    }
                    _ => "unknown".to_string(),
                };
                Err(CliError::Configuration(format!(
                    "Input plugin not found: {}. The accepted plugins are: {}",
                    plugin, accepted
                )))
            }
            status if status.is_success() => match response.json::<Value>().await? {
                Value::String(endpoint) => {
                    debug!("Metadata endpoint for plugin {}: {}", plugin, endpoint);
                    Ok(endpoint)
                }
                other => Err(CliError::Configuration(format!(
                    "Unexpected endpoint for plugin {}: {}",
                    plugin, other
                ))),
            },
            status => Err(CliError::Configuration(format!(
                "Endpoint lookup for plugin {} failed: {}",
                plugin, status
            ))),
        }
    }

    pub async fn evaluate(&self, request: &EvaluationRequest) -> CliResult<EvaluationResponse> {
        debug!("Evaluation request: {:?}", request);
        let response = self
            .client
            .post(self.api_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            error!("Error returned by FAIR-EVA API: {}", reason);
            debug!("{}", response.text().await.unwrap_or_default());
            return Err(CliError::RemoteEvaluation {
                status: status.as_u16(),
                reason,
            });
        }

        let data = response.json::<EvaluationResponse>().await?;
        debug!("FAIR results (raw) from FAIR-EVA: {:?}", data);
        Ok(data)
    }

    /// Free-text search against a metadata endpoint; an empty hit list is an error.
    pub async fn search(&self, metadata_endpoint: &str, query: &str) -> CliResult<Vec<Candidate>> {
        let url = format!("{}/resources/search", metadata_endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[("facets", "false"), ("q", query)])
            .send()
            .await?
            .error_for_status()?;

        let candidates = response.json::<SearchResponse>().await?.into_candidates();
        if candidates.is_empty() {
            error!("Could not find results for search query: {}", query);
            return Err(CliError::NotFound(query.to_string()));
        }
        debug!("Search for {:?} returned {} candidates", query, candidates.len());
        Ok(candidates)
    }
}
