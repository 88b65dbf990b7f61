//! Chat orchestrator: resolves hotel references, records the conversation and
//! delegates each turn to the reasoning engine.

use std::sync::Arc;

use tracing::{debug, info, warn};

use ghumloo_core::config::{ChatConfig, GhumlooConfig};
use ghumloo_core::types::{HotelId, Turn};
use ghumloo_tools::{HotelDirectory, RatePlanSource};

use crate::annotation::{annotate, strip_annotations};
use crate::engine::{EngineRequest, ReasoningEngine, ToolSpec};
use crate::error::ChatError;
use crate::prompt::SYSTEM_INSTRUCTION;
use crate::resolver::HotelReferenceResolver;
use crate::session::SessionStore;
use crate::toolbox::{tool_specs, HotelToolbox};

/// Placeholder used in logs when a resolved id has no display name.
const UNKNOWN_HOTEL_NAME: &str = "this hotel";

/// Result of one conversational turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Session key the turn ran in.
    pub session_id: String,
    /// Answer with hidden annotations removed. May be empty.
    pub answer: String,
}

/// Coordinates sessions, reference resolution and the reasoning engine.
pub struct HotelChatOrchestrator {
    engine: Arc<dyn ReasoningEngine>,
    directory: Arc<dyn HotelDirectory>,
    rates: Arc<dyn RatePlanSource>,
    resolver: HotelReferenceResolver,
    sessions: SessionStore,
    system_instruction: String,
    tools: Vec<ToolSpec>,
    preview_limit: usize,
    config: ChatConfig,
}

impl HotelChatOrchestrator {
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        directory: Arc<dyn HotelDirectory>,
        rates: Arc<dyn RatePlanSource>,
        config: &GhumlooConfig,
    ) -> Self {
        let system_instruction = config
            .llm
            .system_prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| SYSTEM_INSTRUCTION.to_string());

        Self {
            engine,
            directory,
            rates,
            resolver: HotelReferenceResolver,
            sessions: SessionStore::new(config.chat.session_timeout_minutes),
            system_instruction,
            tools: tool_specs(),
            preview_limit: config.hotel_api.preview_limit,
            config: config.chat.clone(),
        }
    }

    /// Run one turn.
    ///
    /// Only invalid input is reported as an error. Engine failures become an
    /// apology answer that is recorded like any other reply.
    pub async fn turn(
        &self,
        session_key: Option<&str>,
        utterance: &str,
    ) -> Result<TurnOutcome, ChatError> {
        if utterance.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let limit = self.config.max_message_length;
        if limit > 0 && utterance.chars().count() > limit {
            return Err(ChatError::MessageTooLong(limit));
        }

        let key = self.session_key(session_key);
        let handle = self.sessions.get_or_create(&key)?;
        let mut session = handle.lock().await;

        let resolved: Option<(HotelId, String)> = {
            let memory = session
                .memory
                .lock()
                .map_err(|e| ChatError::StorageError(format!("hotel memory lock poisoned: {}", e)))?;
            self.resolver
                .resolve(utterance, memory.index(), memory.focus())
                .map(|id| {
                    let name = memory
                        .index()
                        .display_name(&id)
                        .unwrap_or(UNKNOWN_HOTEL_NAME)
                        .to_string();
                    (id, name)
                })
        };

        let content = match resolved {
            Some((hotel_id, hotel_name)) => {
                debug!(session = %key, hotel_id = %hotel_id, hotel_name = %hotel_name, "Resolved hotel reference");
                annotate(utterance, &hotel_id)
            }
            None => utterance.to_string(),
        };
        session.record(Turn::user(content));

        let toolbox = HotelToolbox::new(
            Arc::clone(&self.directory),
            Arc::clone(&self.rates),
            Arc::clone(&session.memory),
            self.preview_limit,
        );
        let request = EngineRequest {
            system_instruction: &self.system_instruction,
            history: &session.history,
            tools: &self.tools,
        };

        let answer = match self.engine.respond(request, &toolbox).await {
            Ok(content) => content.into_answer(),
            Err(e) => {
                warn!(session = %key, error = %e, "Reasoning engine failed");
                format!("Sorry, error occurred: {}", e)
            }
        };
        session.record(Turn::assistant(answer.clone()));
        info!(session = %key, turns = session.history.len(), "Turn complete");

        Ok(TurnOutcome {
            session_id: key,
            answer: strip_annotations(&answer),
        })
    }

    /// Forget a session entirely.
    pub fn reset(&self, session_key: &str) -> Result<(), ChatError> {
        self.sessions.reset(session_key)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn session_key(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(&self.config.default_session)
            .to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{LazyLock, Mutex};

    use async_trait::async_trait;
    use regex::Regex;
    use serde_json::{json, Value};

    use ghumloo_core::types::{HotelListing, Role};
    use ghumloo_tools::{SearchOutcome, StayDates, ToolError};

    use crate::engine::{AssistantContent, Segment, ToolCall, ToolExecutor};

    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[hotel_id:([^\]]+)\]").unwrap());
    static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

    // ---- Fakes ----

    struct TajDirectory;

    #[async_trait]
    impl HotelDirectory for TajDirectory {
        async fn search(&self, query: &str) -> SearchOutcome {
            if !query.to_lowercase().contains("taj") {
                return SearchOutcome::NotFound;
            }
            let hotels = vec![
                HotelListing::new(1, "Taj Mahal Palace"),
                HotelListing::new(2, "Vivanta Dwarka"),
                HotelListing::new(3, "Ginger Noida"),
            ];
            SearchOutcome::Found { total: hotels.len(), hotels }
        }
    }

    #[derive(Default)]
    struct RecordingRates {
        calls: Mutex<Vec<(HotelId, String, String)>>,
    }

    #[async_trait]
    impl RatePlanSource for RecordingRates {
        async fn rate_plan(&self, hotel_id: &HotelId, stay: &StayDates) -> Result<Value, ToolError> {
            self.calls.lock().unwrap().push((
                hotel_id.clone(),
                stay.check_in_str(),
                stay.check_out_str(),
            ));
            Ok(json!({ "status": true, "rooms": [{ "room_name": "Deluxe", "price": 4200 }] }))
        }
    }

    /// Prices the tagged hotel when a tag is present, otherwise searches.
    #[derive(Default)]
    struct AgentLikeEngine {
        histories: Mutex<Vec<Vec<Turn>>>,
    }

    #[async_trait]
    impl ReasoningEngine for AgentLikeEngine {
        async fn respond(
            &self,
            request: EngineRequest<'_>,
            tools: &dyn ToolExecutor,
        ) -> Result<AssistantContent, ChatError> {
            self.histories.lock().unwrap().push(request.history.to_vec());
            let last = request.history.last().map(|t| t.content.clone()).unwrap_or_default();

            let call = match TAG_RE.captures(&last) {
                Some(caps) => {
                    let dates: Vec<&str> = DATE_RE.find_iter(&last).map(|m| m.as_str()).collect();
                    ToolCall::new(
                        "get_rate_plan",
                        json!({ "id": caps[1].parse::<u64>().unwrap(), "checkIn": dates[0], "checkOut": dates[1] }),
                    )
                }
                None => ToolCall::new("get_hotels", json!({ "user_query": last })),
            };
            let result = tools.execute(&call).await;
            Ok(AssistantContent::Segments(vec![
                Segment::text(format!("Done: {}", call.name)),
                Segment {
                    kind: "tool_result".to_string(),
                    text: result.to_string(),
                },
            ]))
        }
    }

    struct FixedEngine(Result<AssistantContent, String>);

    #[async_trait]
    impl ReasoningEngine for FixedEngine {
        async fn respond(
            &self,
            _request: EngineRequest<'_>,
            _tools: &dyn ToolExecutor,
        ) -> Result<AssistantContent, ChatError> {
            self.0.clone().map_err(ChatError::Llm)
        }
    }

    fn orchestrator(engine: Arc<dyn ReasoningEngine>, rates: Arc<RecordingRates>) -> HotelChatOrchestrator {
        HotelChatOrchestrator::new(engine, Arc::new(TajDirectory), rates, &GhumlooConfig::default())
    }

    fn fixed(answer: &str) -> HotelChatOrchestrator {
        orchestrator(
            Arc::new(FixedEngine(Ok(AssistantContent::Plain(answer.to_string())))),
            Arc::default(),
        )
    }

    // ---- End to end ----

    #[tokio::test]
    async fn test_search_then_option_reference_prices_that_hotel() {
        let engine = Arc::new(AgentLikeEngine::default());
        let rates = Arc::new(RecordingRates::default());
        let orch = orchestrator(engine.clone(), Arc::clone(&rates));

        let first = orch.turn(None, "Taj").await.unwrap();
        assert_eq!(first.answer, "Done: get_hotels");

        let second = orch
            .turn(None, "check price of option 2, checkin 2025-12-20 checkout 2025-12-21")
            .await
            .unwrap();
        assert_eq!(second.answer, "Done: get_rate_plan");

        assert_eq!(
            *rates.calls.lock().unwrap(),
            vec![(HotelId::from(2), "2025-12-20".to_string(), "2025-12-21".to_string())]
        );

        let histories = engine.histories.lock().unwrap();
        let sent = &histories[1].last().unwrap().content;
        assert!(sent.ends_with("[hotel_id:2]"));

        let handle = orch.sessions.get_or_create("default").unwrap();
        let session = handle.lock().await;
        assert_eq!(session.memory.lock().unwrap().focus(), Some(&HotelId::from(2)));
    }

    #[tokio::test]
    async fn test_anaphora_after_search_uses_first_result() {
        let engine = Arc::new(AgentLikeEngine::default());
        let rates = Arc::new(RecordingRates::default());
        let orch = orchestrator(engine, Arc::clone(&rates));

        orch.turn(Some("s1"), "Taj hotels").await.unwrap();
        orch.turn(Some("s1"), "iski price 2025-12-20 to 2025-12-22").await.unwrap();

        assert_eq!(rates.calls.lock().unwrap()[0].0, HotelId::from(1));
    }

    #[tokio::test]
    async fn test_history_records_annotated_user_and_raw_answer() {
        let orch = fixed("Sure [hotel_id:7] here you go");
        {
            let handle = orch.sessions.get_or_create("default").unwrap();
            let session = handle.lock().await;
            session.memory.lock().unwrap().focus_on(HotelId::from(7));
        }

        let outcome = orch.turn(None, "this hotel price").await.unwrap();
        assert_eq!(outcome.answer, "Sure  here you go");
        assert!(!outcome.answer.contains("hotel_id"));

        let handle = orch.sessions.get_or_create("default").unwrap();
        let session = handle.lock().await;
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].role, Role::User);
        assert_eq!(session.history[0].content, "this hotel price [hotel_id:7]");
        assert_eq!(session.history[1].content, "Sure [hotel_id:7] here you go");
    }

    #[tokio::test]
    async fn test_unresolved_utterance_is_not_annotated() {
        let orch = fixed("Namaste!");
        orch.turn(None, "hello").await.unwrap();

        let handle = orch.sessions.get_or_create("default").unwrap();
        let session = handle.lock().await;
        assert_eq!(session.history[0].content, "hello");
    }

    // ---- Failures ----

    #[tokio::test]
    async fn test_engine_failure_becomes_recorded_apology() {
        let orch = orchestrator(
            Arc::new(FixedEngine(Err("Gemini returned 502 Bad Gateway".to_string()))),
            Arc::default(),
        );

        let outcome = orch.turn(None, "hotels in goa").await.unwrap();
        assert_eq!(
            outcome.answer,
            "Sorry, error occurred: LLM error: Gemini returned 502 Bad Gateway"
        );

        let handle = orch.sessions.get_or_create("default").unwrap();
        let session = handle.lock().await;
        assert_eq!(session.history[1].role, Role::Assistant);
        assert_eq!(session.history[1].content, outcome.answer);
    }

    #[tokio::test]
    async fn test_empty_answer_is_returned_empty() {
        let orch = orchestrator(
            Arc::new(FixedEngine(Ok(AssistantContent::Segments(vec![])))),
            Arc::default(),
        );
        assert_eq!(orch.turn(None, "hi").await.unwrap().answer, "");
    }

    #[tokio::test]
    async fn test_invalid_input_touches_nothing() {
        let orch = fixed("ok");
        assert!(matches!(orch.turn(None, "   ").await, Err(ChatError::EmptyMessage)));
        assert_eq!(orch.session_count(), 0);
    }

    #[tokio::test]
    async fn test_long_message_accepted_by_default() {
        let orch = fixed("ok");
        let long = "a".repeat(20_000);
        assert_eq!(orch.turn(None, &long).await.unwrap().answer, "ok");
    }

    #[tokio::test]
    async fn test_configured_length_limit_rejects_before_session() {
        let mut config = GhumlooConfig::default();
        config.chat.max_message_length = 10;
        let orch = HotelChatOrchestrator::new(
            Arc::new(FixedEngine(Ok(AssistantContent::Plain("ok".to_string())))),
            Arc::new(TajDirectory),
            Arc::new(RecordingRates::default()),
            &config,
        );

        assert!(matches!(
            orch.turn(None, "hotels in noida").await,
            Err(ChatError::MessageTooLong(10))
        ));
        assert_eq!(orch.session_count(), 0);
        assert!(orch.turn(None, "hotels").await.is_ok());
    }

    // ---- Sessions ----

    #[tokio::test]
    async fn test_session_key_defaults_and_is_echoed() {
        let orch = fixed("ok");
        assert_eq!(orch.turn(None, "hi").await.unwrap().session_id, "default");
        assert_eq!(orch.turn(Some("  "), "hi").await.unwrap().session_id, "default");
        assert_eq!(orch.turn(Some("kiosk-7"), "hi").await.unwrap().session_id, "kiosk-7");
        assert_eq!(orch.session_count(), 2);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_hotel_memory() {
        let engine = Arc::new(AgentLikeEngine::default());
        let rates = Arc::new(RecordingRates::default());
        let orch = orchestrator(engine.clone(), rates);

        orch.turn(Some("a"), "Taj").await.unwrap();
        orch.turn(Some("b"), "option 2 please").await.unwrap();

        let histories = engine.histories.lock().unwrap();
        assert_eq!(histories[1].last().unwrap().content, "option 2 please");
    }

    #[tokio::test]
    async fn test_reset_forgets_session() {
        let orch = fixed("ok");
        orch.turn(Some("temp"), "hi").await.unwrap();
        orch.reset("temp").unwrap();
        assert_eq!(orch.session_count(), 0);
        assert!(matches!(orch.reset("temp"), Err(ChatError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_configured_system_prompt_overrides_default() {
        let mut config = GhumlooConfig::default();
        config.llm.system_prompt = Some("Only answer in haiku.".to_string());
        let orch = HotelChatOrchestrator::new(
            Arc::new(FixedEngine(Ok(AssistantContent::Plain(String::new())))),
            Arc::new(TajDirectory),
            Arc::new(RecordingRates::default()),
            &config,
        );
        assert_eq!(orch.system_instruction, "Only answer in haiku.");
        assert_eq!(orch.tools.len(), 3);
    }
}
