use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{SkyscoutError, SkyscoutResult};
use crate::prompts;

/// Parameters for one flight search.
///
/// Round-trip is derived from the presence of a return date; the
/// constructors are the only way to build one, so the two can never
/// disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl SearchParameters {
    pub fn one_way(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: NaiveDate,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date,
            return_date: None,
        }
    }

    pub fn round_trip(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date,
            return_date: Some(return_date),
        }
    }

    pub fn is_round_trip(&self) -> bool {
        self.return_date.is_some()
    }

    pub fn trip_type(&self) -> &'static str {
        if self.is_round_trip() {
            "round-trip"
        } else {
            "one-way"
        }
    }
}

/// Name of the one function declared to the model.
pub const SEARCH_FLIGHTS: &str = "search_flights";

/// The single function schema offered to the model on every chat turn.
pub fn search_flights_declaration() -> crate::types::FunctionDeclaration {
    crate::types::FunctionDeclaration {
        name: SEARCH_FLIGHTS.to_string(),
        description: Some("Search for flights on Kayak.com".to_string()),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "origin": {
                    "type": "string",
                    "description": "Origin airport code (e.g., SFO)"
                },
                "destination": {
                    "type": "string",
                    "description": "Destination airport code (e.g., JFK)"
                },
                "departure_date": {
                    "type": "string",
                    "description": "Departure date in MM/DD format (e.g., 05/15)"
                },
                "return_date": {
                    "type": "string",
                    "description": "Return date in MM/DD format (e.g., 05/22), omit for one-way"
                }
            },
            "required": ["origin", "destination", "departure_date"]
        }),
    }
}

/// Outcome of one search: the agent's verbatim report, or why it failed.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Success {
        parameters: SearchParameters,
        details: String,
    },
    Failure {
        message: String,
    },
}

/// The browsing agent seam.
///
/// The real implementation drives a live, non-headless browser session
/// against Kayak; a call is long-running and not cancellable. The agent's
/// browser context is a single shared resource, so callers must serialize.
#[async_trait]
pub trait BrowserAgent: Send + Sync {
    async fn run_task(&self, task: &str, policy: &str) -> SkyscoutResult<String>;
}

/// HTTP client for the browser-automation daemon.
#[derive(Debug, Clone)]
pub struct AgentClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize, Debug)]
struct AgentTaskRequest<'a> {
    task: &'a str,
    policy: &'a str,
}

#[derive(Deserialize, Debug)]
struct AgentTaskResponse {
    report: Option<String>,
    error: Option<String>,
}

impl AgentClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Checks that the agent daemon is reachable.
    pub async fn test_connection(&self) -> bool {
        let url = format!("{}/health", self.base_url.trim_end_matches('/'));
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Agent daemon health check failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl BrowserAgent for AgentClient {
    async fn run_task(&self, task: &str, policy: &str) -> SkyscoutResult<String> {
        let url = format!("{}/run", self.base_url.trim_end_matches('/'));
        debug!("Dispatching browsing task to {}", url);

        // The daemon holds the browser session open for the whole task;
        // no request timeout here.
        let response = self
            .client
            .post(&url)
            .json(&AgentTaskRequest { task, policy })
            .send()
            .await
            .map_err(|e| SkyscoutError::RequestError(format!("Failed to reach agent daemon: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SkyscoutError::HttpError {
                status_code: status.as_u16(),
                message: format!("Agent daemon request failed: {}", body),
            });
        }

        let body: AgentTaskResponse = response
            .json()
            .await
            .map_err(|e| SkyscoutError::ParsingError(format!("Failed to parse agent response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(SkyscoutError::AgentFailure(error));
        }

        body.report
            .ok_or_else(|| SkyscoutError::ResponseError("Agent returned no report".to_string()))
    }
}

/// Runs flight searches through a browsing agent.
pub struct FlightSearcher<A: BrowserAgent + ?Sized> {
    agent: std::sync::Arc<A>,
}

impl<A: BrowserAgent + ?Sized> FlightSearcher<A> {
    pub fn new(agent: std::sync::Arc<A>) -> Self {
        Self { agent }
    }

    /// Runs one search. Long-running; never returns an error: any agent
    /// failure is folded into `SearchOutcome::Failure`.
    pub async fn search(&self, params: &SearchParameters) -> SearchOutcome {
        info!(
            "Starting Kayak flight search for {} to {} ({})",
            params.origin,
            params.destination,
            params.trip_type()
        );

        let task = prompts::search_task(params);
        match self.agent.run_task(&task, prompts::AGENT_POLICY).await {
            Ok(details) => SearchOutcome::Success {
                parameters: params.clone(),
                details,
            },
            Err(e) => {
                warn!("Flight search failed: {}", e);
                SearchOutcome::Failure {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingAgent;

    #[async_trait]
    impl BrowserAgent for FailingAgent {
        async fn run_task(&self, _task: &str, _policy: &str) -> SkyscoutResult<String> {
            Err(SkyscoutError::AgentFailure("browser crashed".to_string()))
        }
    }

    struct RecordingAgent {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BrowserAgent for RecordingAgent {
        async fn run_task(&self, task: &str, policy: &str) -> SkyscoutResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(task.contains("kayak.com") || task.contains("Kayak"));
            assert!(policy.contains("ONLY visit Kayak.com"));
            Ok("Cheapest: Delta $250".to_string())
        }
    }

    fn params() -> SearchParameters {
        SearchParameters::one_way(
            "SFO",
            "JFK",
            chrono::NaiveDate::from_ymd_opt(2026, 5, 15).unwrap(),
        )
    }

    #[test]
    fn trip_type_follows_return_date() {
        assert_eq!(params().trip_type(), "one-way");
        assert!(!params().is_round_trip());

        let rt = SearchParameters::round_trip(
            "SFO",
            "JFK",
            chrono::NaiveDate::from_ymd_opt(2026, 5, 15).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2026, 5, 22).unwrap(),
        );
        assert_eq!(rt.trip_type(), "round-trip");
        assert!(rt.is_round_trip());
    }

    #[tokio::test]
    async fn agent_failure_becomes_a_failure_outcome() {
        let searcher = FlightSearcher::new(Arc::new(FailingAgent));
        match searcher.search(&params()).await {
            SearchOutcome::Failure { message } => {
                assert!(message.contains("browser crashed"));
            }
            SearchOutcome::Success { .. } => panic!("expected a failure outcome"),
        }
    }

    #[tokio::test]
    async fn success_wraps_the_report_verbatim() {
        let agent = Arc::new(RecordingAgent {
            calls: AtomicUsize::new(0),
        });
        let searcher = FlightSearcher::new(agent.clone());

        match searcher.search(&params()).await {
            SearchOutcome::Success { parameters, details } => {
                assert_eq!(parameters, params());
                assert_eq!(details, "Cheapest: Delta $250");
            }
            SearchOutcome::Failure { message } => panic!("unexpected failure: {}", message),
        }
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    }
}
