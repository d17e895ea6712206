use std::sync::Arc;

use chrono::{Local, NaiveDate};
use log::{debug, info};
use serde_json::Value;

use skyscout_core::client::{LanguageModel, ModelReply};
use skyscout_core::dates;
use skyscout_core::errors::{SkyscoutError, SkyscoutResult};
use skyscout_core::prompts;
use skyscout_core::search::{
    search_flights_declaration, BrowserAgent, FlightSearcher, SearchOutcome, SearchParameters,
    SEARCH_FLIGHTS,
};
use skyscout_core::types::{ChatMessage, FunctionCall};

/// One interactive conversation.
///
/// Holds the ordered transcript and drives the turn state machine: a user
/// turn yields either a direct model reply, or a dispatched flight search
/// followed by a second model call that narrates the result. Turns are
/// processed one at a time; argument and search failures are folded into
/// assistant-visible text so the session can always take the next turn.
pub struct ChatSession {
    model: Arc<dyn LanguageModel>,
    searcher: FlightSearcher<dyn BrowserAgent>,
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(model: Arc<dyn LanguageModel>, agent: Arc<dyn BrowserAgent>) -> Self {
        Self {
            model,
            searcher: FlightSearcher::new(agent),
            transcript: vec![ChatMessage::system(prompts::CHAT_SYSTEM_PROMPT)],
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Processes one user turn and returns the assistant's reply.
    ///
    /// Only model-transport errors propagate; everything else is recovered
    /// into the returned text.
    pub async fn process_turn(&mut self, user_text: &str) -> SkyscoutResult<String> {
        self.transcript.push(ChatMessage::user(user_text));

        let declaration = search_flights_declaration();
        let reply = self
            .model
            .complete(&self.transcript, Some(&declaration))
            .await?;

        match reply {
            ModelReply::Text(text) => {
                self.transcript.push(ChatMessage::assistant(text.clone()));
                Ok(text)
            }
            ModelReply::FunctionCall(call) if call.name == SEARCH_FLIGHTS => {
                self.dispatch_search(call).await
            }
            ModelReply::FunctionCall(call) => {
                debug!("Model requested unknown function: {}", call.name);
                let text = format!(
                    "I tried to use a capability I don't have ({}). \
                     Could you rephrase your request?",
                    call.name
                );
                self.transcript.push(ChatMessage::assistant(text.clone()));
                Ok(text)
            }
        }
    }

    async fn dispatch_search(&mut self, call: FunctionCall) -> SkyscoutResult<String> {
        let today = Local::now().date_naive();
        let params = match parse_search_arguments(&call.arguments, today) {
            Ok(params) => params,
            Err(e) => {
                let text = format!(
                    "I couldn't start that search: {}. \
                     Please give me the origin, destination, and dates again.",
                    e
                );
                self.transcript.push(ChatMessage::assistant(text.clone()));
                return Ok(text);
            }
        };

        let progress = format!(
            "I'll search for flights from {} to {} for you. This might take a minute...",
            params.origin, params.destination
        );
        self.transcript.push(ChatMessage::assistant(progress));

        info!(
            "Dispatching flight search: {} -> {} on {}",
            params.origin, params.destination, params.departure_date
        );
        match self.searcher.search(&params).await {
            SearchOutcome::Success { parameters, details } => {
                let prompt = prompts::analysis_prompt(&parameters, &details);
                self.transcript.push(ChatMessage::user(prompt));

                match self.model.complete(&self.transcript, None).await? {
                    ModelReply::Text(summary) => {
                        self.transcript
                            .push(ChatMessage::assistant(summary.clone()));
                        Ok(summary)
                    }
                    ModelReply::FunctionCall(call) => {
                        // No tools were offered; fall back to the raw report
                        // rather than dropping the turn.
                        debug!("Unexpected function call in summary reply: {}", call.name);
                        let text = format!(
                            "I found flight results but couldn't put together a summary. \
                             Here is the raw report:\n{}",
                            details
                        );
                        self.transcript.push(ChatMessage::assistant(text.clone()));
                        Ok(text)
                    }
                }
            }
            SearchOutcome::Failure { message } => {
                let text = format!(
                    "I couldn't complete the flight search. Error: {}. \
                     Please try again with different search parameters.",
                    message
                );
                self.transcript.push(ChatMessage::assistant(text.clone()));
                Ok(text)
            }
        }
    }
}

fn required_string(args: &Value, field: &str) -> SkyscoutResult<String> {
    args.get(field)
        .ok_or_else(|| {
            SkyscoutError::MalformedFunctionArguments(format!("missing field '{}'", field))
        })?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            SkyscoutError::MalformedFunctionArguments(format!("field '{}' is not a string", field))
        })
}

/// Validates the model's `search_flights` arguments and normalizes its
/// short-form dates. An empty `return_date` is treated as absent.
fn parse_search_arguments(args: &Value, today: NaiveDate) -> SkyscoutResult<SearchParameters> {
    if !args.is_object() {
        return Err(SkyscoutError::MalformedFunctionArguments(
            "arguments are not an object".to_string(),
        ));
    }

    let origin = required_string(args, "origin")?;
    let destination = required_string(args, "destination")?;
    let departure_raw = required_string(args, "departure_date")?;

    let return_raw = match args.get("return_date") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let s = value.as_str().ok_or_else(|| {
                SkyscoutError::MalformedFunctionArguments(
                    "field 'return_date' is not a string".to_string(),
                )
            })?;
            if s.trim().is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
    };

    let departure = dates::normalize_departure(&departure_raw, today)?;
    match return_raw {
        Some(raw) => {
            let return_date = dates::normalize_return(&raw, departure)?;
            Ok(SearchParameters::round_trip(
                origin,
                destination,
                departure,
                return_date,
            ))
        }
        None => Ok(SearchParameters::one_way(origin, destination, departure)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use skyscout_core::types::FunctionDeclaration;

    /// Replays a fixed script of model replies, recording each call.
    struct ScriptedModel {
        replies: Mutex<Vec<ModelReply>>,
        calls: AtomicUsize,
        tool_offered: Mutex<Vec<bool>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<ModelReply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
                tool_offered: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(
            &self,
            _transcript: &[ChatMessage],
            tool: Option<&FunctionDeclaration>,
        ) -> SkyscoutResult<ModelReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.tool_offered.lock().unwrap().push(tool.is_some());
            let mut replies = self.replies.lock().unwrap();
            assert!(!replies.is_empty(), "model called more times than scripted");
            Ok(replies.remove(0))
        }
    }

    struct StubAgent {
        calls: AtomicUsize,
        result: std::result::Result<String, String>,
    }

    impl StubAgent {
        fn succeeding(report: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Ok(report.to_string()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Err(message.to_string()),
            })
        }
    }

    #[async_trait]
    impl BrowserAgent for StubAgent {
        async fn run_task(&self, _task: &str, _policy: &str) -> SkyscoutResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(report) => Ok(report.clone()),
                Err(message) => Err(SkyscoutError::AgentFailure(message.clone())),
            }
        }
    }

    fn search_call(args: Value) -> ModelReply {
        ModelReply::FunctionCall(FunctionCall {
            name: SEARCH_FLIGHTS.to_string(),
            arguments: args,
        })
    }

    #[tokio::test]
    async fn direct_reply_appends_two_entries() {
        let model = ScriptedModel::new(vec![ModelReply::Text("Pack a light jacket.".to_string())]);
        let agent = StubAgent::succeeding("unused");
        let mut session = ChatSession::new(model.clone(), agent.clone());
        let baseline = session.transcript().len();

        let reply = session.process_turn("What's Seattle like in May?").await.unwrap();

        assert_eq!(reply, "Pack a light jacket.");
        assert_eq!(session.transcript().len(), baseline + 2);
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_turn_appends_four_entries_and_runs_agent_once() {
        let model = ScriptedModel::new(vec![
            search_call(json!({
                "origin": "SFO",
                "destination": "JFK",
                "departure_date": "05/15",
                "return_date": "05/22"
            })),
            ModelReply::Text("Cheapest is Delta at $250.".to_string()),
        ]);
        let agent = StubAgent::succeeding("Delta $250, nonstop, 5h30m");
        let mut session = ChatSession::new(model.clone(), agent.clone());
        let baseline = session.transcript().len();

        let reply = session
            .process_turn("Find me a flight from SFO to JFK leaving 05/15 returning 05/22")
            .await
            .unwrap();

        assert_eq!(reply, "Cheapest is Delta at $250.");
        // user, progress, analysis prompt, summary
        assert_eq!(session.transcript().len(), baseline + 4);
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
        assert_eq!(model.call_count(), 2);
        // The tool is offered on the first call only.
        assert_eq!(*model.tool_offered.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn missing_destination_never_reaches_the_agent() {
        let model = ScriptedModel::new(vec![search_call(json!({
            "origin": "SFO",
            "departure_date": "05/15"
        }))]);
        let agent = StubAgent::succeeding("unused");
        let mut session = ChatSession::new(model.clone(), agent.clone());
        let baseline = session.transcript().len();

        let reply = session.process_turn("flights please").await.unwrap();

        assert!(reply.contains("couldn't start that search"));
        assert!(reply.contains("destination"));
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.transcript().len(), baseline + 2);
    }

    #[tokio::test]
    async fn non_string_argument_is_rejected() {
        let model = ScriptedModel::new(vec![search_call(json!({
            "origin": "SFO",
            "destination": "JFK",
            "departure_date": 515
        }))]);
        let agent = StubAgent::succeeding("unused");
        let mut session = ChatSession::new(model, agent.clone());

        let reply = session.process_turn("flights please").await.unwrap();

        assert!(reply.contains("departure_date"));
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn search_failure_is_recovered_and_session_stays_usable() {
        let model = ScriptedModel::new(vec![
            search_call(json!({
                "origin": "SFO",
                "destination": "JFK",
                "departure_date": "05/15"
            })),
            ModelReply::Text("Of course, happy to help.".to_string()),
        ]);
        let agent = StubAgent::failing("browser crashed");
        let mut session = ChatSession::new(model.clone(), agent.clone());
        let baseline = session.transcript().len();

        let reply = session.process_turn("one way SFO to JFK 05/15").await.unwrap();

        assert!(reply.contains("browser crashed"));
        // user, progress, failure message; no second model call
        assert_eq!(session.transcript().len(), baseline + 3);
        assert_eq!(model.call_count(), 1);

        // The session takes the next turn normally.
        let next = session.process_turn("thanks anyway").await.unwrap();
        assert_eq!(next, "Of course, happy to help.");
    }

    #[tokio::test]
    async fn function_call_in_summary_reply_falls_back_to_the_raw_report() {
        let model = ScriptedModel::new(vec![
            search_call(json!({
                "origin": "SFO",
                "destination": "JFK",
                "departure_date": "05/15"
            })),
            // The summary call offers no tools, but the model asks for one
            // anyway.
            search_call(json!({})),
            ModelReply::Text("You're welcome.".to_string()),
        ]);
        let agent = StubAgent::succeeding("Delta $250, nonstop, 5h30m");
        let mut session = ChatSession::new(model.clone(), agent.clone());
        let baseline = session.transcript().len();

        let reply = session.process_turn("one way SFO to JFK 05/15").await.unwrap();

        assert!(reply.contains("Delta $250, nonstop, 5h30m"));
        // user, progress, analysis prompt, fallback assistant entry
        assert_eq!(session.transcript().len(), baseline + 4);
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);

        // The anomaly never escapes the session; the next turn proceeds.
        let next = session.process_turn("thanks").await.unwrap();
        assert_eq!(next, "You're welcome.");
    }

    #[tokio::test]
    async fn unknown_function_name_is_recovered() {
        let model = ScriptedModel::new(vec![ModelReply::FunctionCall(FunctionCall {
            name: "book_hotel".to_string(),
            arguments: json!({}),
        })]);
        let agent = StubAgent::succeeding("unused");
        let mut session = ChatSession::new(model, agent.clone());

        let reply = session.process_turn("book me a hotel").await.unwrap();

        assert!(reply.contains("book_hotel"));
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_return_date_becomes_one_way() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let params = parse_search_arguments(
            &json!({
                "origin": "SFO",
                "destination": "JFK",
                "departure_date": "07/04",
                "return_date": ""
            }),
            today,
        )
        .unwrap();

        assert!(!params.is_round_trip());
        assert_eq!(
            params.departure_date,
            NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()
        );
    }
}
