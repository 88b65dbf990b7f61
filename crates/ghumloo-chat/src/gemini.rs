//! Gemini `generateContent` backend for [`ReasoningEngine`].
//!
//! The conversation is sent as `user`/`model` contents with the hotel tools as
//! function declarations. While the model replies with `functionCall` parts the
//! calls are executed and answered with `functionResponse` parts, up to the
//! configured number of rounds.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use ghumloo_core::config::LlmConfig;
use ghumloo_core::types::{Role, Turn};

use crate::engine::{
    AssistantContent, EngineRequest, ReasoningEngine, Segment, ToolCall, ToolExecutor, ToolSpec,
    TEXT_SEGMENT,
};
use crate::error::ChatError;

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content,
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations<'a> {
    function_declarations: &'a [ToolSpec],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    /// Fields such as `thoughtSignature` that must be echoed back verbatim.
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
                ..Part::default()
            }],
        }
    }

    fn system(text: &str) -> Self {
        Self {
            role: None,
            ..Self::text("user", text)
        }
    }

    fn from_turn(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "model",
        };
        Self::text(role, &turn.content)
    }

    fn function_calls(&self) -> Vec<ToolCall> {
        self.parts
            .iter()
            .filter_map(|p| p.function_call.clone())
            .collect()
    }

    fn into_segments(self) -> Vec<Segment> {
        self.parts
            .into_iter()
            .filter_map(|p| {
                let kind = if p.thought.unwrap_or(false) {
                    "thought"
                } else {
                    TEXT_SEGMENT
                };
                p.text.map(|text| Segment {
                    kind: kind.to_string(),
                    text,
                })
            })
            .collect()
    }
}

/// Tool results must be JSON objects on the wire.
fn function_response(name: &str, result: Value) -> Part {
    let response = match result {
        Value::Object(_) => result,
        other => json!({ "result": other }),
    };
    Part {
        function_response: Some(FunctionResponse {
            name: name.to_string(),
            response,
        }),
        ..Part::default()
    }
}

// =============================================================================
// GeminiEngine
// =============================================================================

/// Reasoning engine backed by the Gemini REST API.
pub struct GeminiEngine {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    max_output_tokens: u32,
    max_tool_rounds: u32,
    timeout: Duration,
}

impl GeminiEngine {
    pub fn new(http: reqwest::Client, config: &LlmConfig, api_key: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key: api_key.into(),
            max_output_tokens: config.max_output_tokens,
            max_tool_rounds: config.max_tool_rounds,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    async fn generate(&self, body: &GenerateRequest<'_>) -> Result<Content, ChatError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ChatError::Llm(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "Gemini request rejected");
            return Err(ChatError::Llm(format!("Gemini returned {}: {}", status, detail.trim())));
        }

        let decoded: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Llm(format!("invalid response: {}", e)))?;

        decoded
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.unwrap_or_default())
            .ok_or_else(|| ChatError::Llm("response contained no candidates".to_string()))
    }
}

#[async_trait]
impl ReasoningEngine for GeminiEngine {
    async fn respond(
        &self,
        request: EngineRequest<'_>,
        tools: &dyn ToolExecutor,
    ) -> Result<AssistantContent, ChatError> {
        let mut contents: Vec<Content> = request.history.iter().map(Content::from_turn).collect();
        let declarations = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![ToolDeclarations {
                function_declarations: request.tools,
            }]
        };

        let mut rounds = 0u32;
        loop {
            let body = GenerateRequest {
                system_instruction: Content::system(request.system_instruction),
                contents: &contents,
                tools: declarations.clone(),
                generation_config: GenerationConfig {
                    max_output_tokens: self.max_output_tokens,
                },
            };
            let reply = self.generate(&body).await?;

            let calls = reply.function_calls();
            if calls.is_empty() {
                debug!(rounds, "Gemini produced final answer");
                return Ok(AssistantContent::Segments(reply.into_segments()));
            }
            if rounds >= self.max_tool_rounds {
                warn!(rounds, "Tool round limit reached");
                return Err(ChatError::ToolRoundsExceeded(self.max_tool_rounds));
            }
            rounds += 1;

            let mut responses = Vec::with_capacity(calls.len());
            for call in &calls {
                info!(tool = %call.name, round = rounds, "Executing tool call");
                let result = tools.execute(call).await;
                responses.push(function_response(&call.name, result));
            }

            contents.push(Content {
                role: Some("model".to_string()),
                ..reply
            });
            contents.push(Content {
                role: Some("user".to_string()),
                parts: responses,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    struct RecordingTools {
        calls: Mutex<Vec<ToolCall>>,
    }

    #[async_trait]
    impl ToolExecutor for RecordingTools {
        async fn execute(&self, call: &ToolCall) -> Value {
            self.calls.lock().unwrap().push(call.clone());
            json!({ "status": true, "total_hotels": 1 })
        }
    }

    fn recording_tools() -> RecordingTools {
        RecordingTools {
            calls: Mutex::new(Vec::new()),
        }
    }

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn engine_for(base_url: String, max_tool_rounds: u32) -> GeminiEngine {
        let config = LlmConfig {
            base_url,
            max_tool_rounds,
            request_timeout_secs: 2,
            ..LlmConfig::default()
        };
        GeminiEngine::new(reqwest::Client::new(), &config, "test-key")
    }

    fn function_call_reply() -> Value {
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "functionCall": { "name": "get_hotels", "args": { "user_query": "Taj" } } }]
                }
            }]
        })
    }

    fn text_reply(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "planning", "thought": true },
                        { "text": text }
                    ]
                }
            }]
        })
    }

    fn specs() -> Vec<ToolSpec> {
        vec![ToolSpec::new(
            "get_hotels",
            "Search hotels",
            json!({ "type": "object", "properties": { "user_query": { "type": "string" } } }),
        )]
    }

    #[test]
    fn test_turn_roles_map_to_gemini_roles() {
        assert_eq!(Content::from_turn(&Turn::user("hi")).role.as_deref(), Some("user"));
        assert_eq!(
            Content::from_turn(&Turn::assistant("hello")).role.as_deref(),
            Some("model")
        );
    }

    #[test]
    fn test_decode_segments_marks_thoughts() {
        let response: GenerateResponse = serde_json::from_value(text_reply("Namaste")).unwrap();
        let content = response.candidates.into_iter().next().unwrap().content.unwrap();
        let segments = content.into_segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].kind, "thought");
        assert_eq!(segments[1], Segment::text("Namaste"));
    }

    #[test]
    fn test_decode_function_call() {
        let response: GenerateResponse = serde_json::from_value(function_call_reply()).unwrap();
        let content = response.candidates.into_iter().next().unwrap().content.unwrap();
        let calls = content.function_calls();
        assert_eq!(calls, vec![ToolCall::new("get_hotels", json!({ "user_query": "Taj" }))]);
    }

    #[test]
    fn test_non_object_tool_result_is_wrapped() {
        let part = function_response("get_current_date", json!("2025-12-20"));
        let wire = serde_json::to_value(&part).unwrap();
        assert_eq!(
            wire,
            json!({ "functionResponse": { "name": "get_current_date", "response": { "result": "2025-12-20" } } })
        );
    }

    #[test]
    fn test_model_turn_echo_keeps_unknown_part_fields() {
        let content: Content = serde_json::from_value(json!({
            "role": "model",
            "parts": [{
                "functionCall": { "name": "get_hotels", "args": { "user_query": "Taj" } },
                "thoughtSignature": "c2lnbmF0dXJl"
            }]
        }))
        .unwrap();
        assert_eq!(content.function_calls().len(), 1);

        let wire = serde_json::to_value(&content).unwrap();
        assert_eq!(wire["parts"][0]["thoughtSignature"], "c2lnbmF0dXJl");
        assert_eq!(wire["parts"][0]["functionCall"]["name"], "get_hotels");
    }

    #[test]
    fn test_hotel_tool_declarations_serialize_for_gemini() {
        let contents = vec![Content::from_turn(&Turn::user("what is today"))];
        let tools = crate::toolbox::tool_specs();
        let body = GenerateRequest {
            system_instruction: Content::system("be helpful"),
            contents: &contents,
            tools: vec![ToolDeclarations {
                function_declarations: &tools,
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 128,
            },
        };
        let wire = serde_json::to_value(&body).unwrap();
        let declarations = wire["tools"][0]["functionDeclarations"].as_array().unwrap();
        assert_eq!(declarations.len(), 3);

        let date = &declarations[2];
        assert_eq!(date["name"], "get_current_date");
        assert!(date.get("parameters").is_none());
        assert!(declarations[0]["parameters"]["properties"]["user_query"].is_object());
    }

    #[test]
    fn test_request_serialization_shape() {
        let contents = vec![Content::from_turn(&Turn::user("hotels in goa"))];
        let tools = specs();
        let body = GenerateRequest {
            system_instruction: Content::system("be helpful"),
            contents: &contents,
            tools: vec![ToolDeclarations {
                function_declarations: &tools,
            }],
            generation_config: GenerationConfig {
                max_output_tokens: 128,
            },
        };
        let wire = serde_json::to_value(&body).unwrap();
        assert_eq!(wire["systemInstruction"], json!({ "parts": [{ "text": "be helpful" }] }));
        assert_eq!(wire["contents"][0]["role"], "user");
        assert_eq!(wire["tools"][0]["functionDeclarations"][0]["name"], "get_hotels");
        assert_eq!(wire["generationConfig"]["maxOutputTokens"], 128);
    }

    #[tokio::test]
    async fn test_respond_runs_tool_loop() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/models/{call}",
                post(|State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>| async move {
                    match hits.fetch_add(1, Ordering::SeqCst) {
                        0 => Json(function_call_reply()),
                        _ => {
                            // The second request must carry the tool result back.
                            let last = body["contents"].as_array().unwrap().last().unwrap().clone();
                            assert!(last["parts"][0]["functionResponse"].is_object());
                            Json(text_reply("Found 1 hotel."))
                        }
                    }
                }),
            )
            .with_state(Arc::clone(&hits));
        let engine = engine_for(spawn_upstream(router).await, 5);
        let tools = recording_tools();
        let history = vec![Turn::user("Taj hotels")];
        let specs = specs();

        let content = engine
            .respond(
                EngineRequest {
                    system_instruction: "be helpful",
                    history: &history,
                    tools: &specs,
                },
                &tools,
            )
            .await
            .unwrap();

        assert_eq!(content.into_answer(), "Found 1 hotel.");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(tools.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_respond_stops_at_round_limit() {
        let router = Router::new().route(
            "/models/{call}",
            post(|| async { Json(function_call_reply()) }),
        );
        let engine = engine_for(spawn_upstream(router).await, 2);
        let tools = recording_tools();
        let history = vec![Turn::user("loop forever")];

        let err = engine
            .respond(
                EngineRequest {
                    system_instruction: "",
                    history: &history,
                    tools: &[],
                },
                &tools,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::ToolRoundsExceeded(2)));
        assert_eq!(tools.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upstream_502_mentions_bad_gateway() {
        let router = Router::new().route(
            "/models/{call}",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let engine = engine_for(spawn_upstream(router).await, 2);
        let history = vec![Turn::user("hi")];

        let err = engine
            .respond(
                EngineRequest {
                    system_instruction: "",
                    history: &history,
                    tools: &[],
                },
                &recording_tools(),
            )
            .await
            .unwrap_err();

        assert!(err.to_string().to_lowercase().contains("bad gateway"));
    }
}
