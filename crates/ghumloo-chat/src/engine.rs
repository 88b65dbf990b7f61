//! Reasoning-engine seam.
//!
//! The orchestrator hands the full conversation, a system instruction and the
//! declared tools to a [`ReasoningEngine`]; the engine may call back into a
//! [`ToolExecutor`] any number of times before producing its final message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ghumloo_core::types::Turn;

use crate::error::ChatError;

/// A tool as declared to the reasoning engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema (OpenAPI subset) for the arguments object. Absent for
    /// tools that take no arguments; Gemini rejects empty object schemas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Some(parameters),
        }
    }

    /// Declare a tool that takes no arguments.
    pub fn without_arguments(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
        }
    }
}

/// A tool invocation requested by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub args: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Executes tool calls on behalf of the engine.
///
/// Failures are reported inside the returned JSON (`{"error": ...}`) so the
/// engine can read them; execution itself never fails.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> Value;
}

/// Everything the engine needs for one turn.
#[derive(Debug, Clone, Copy)]
pub struct EngineRequest<'a> {
    pub system_instruction: &'a str,
    pub history: &'a [Turn],
    pub tools: &'a [ToolSpec],
}

/// The external reasoning engine.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn respond(
        &self,
        request: EngineRequest<'_>,
        tools: &dyn ToolExecutor,
    ) -> Result<AssistantContent, ChatError>;
}

// =============================================================================
// AssistantContent
// =============================================================================

/// Segment kind whose text is part of the answer.
pub const TEXT_SEGMENT: &str = "text";

/// One typed piece of a multi-part engine message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: String,
    pub text: String,
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: TEXT_SEGMENT.to_string(),
            text: text.into(),
        }
    }
}

/// Final engine message: either a plain string or typed segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantContent {
    Plain(String),
    Segments(Vec<Segment>),
}

impl AssistantContent {
    /// The user-facing answer.
    ///
    /// Only `text` segments contribute; they are joined with single spaces.
    pub fn into_answer(self) -> String {
        match self {
            AssistantContent::Plain(text) => text.trim().to_string(),
            AssistantContent::Segments(segments) => segments
                .into_iter()
                .filter(|s| s.kind == TEXT_SEGMENT)
                .map(|s| s.text)
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string(),
        }
    }
}
