//! Conversational layer for the hotel assistant.
//!
//! Keeps per-session hotel memory, resolves references such as "option 2" or
//! "iski price" against it, and drives a reasoning engine that can call the
//! hotel tools.

pub mod annotation;
pub mod engine;
pub mod error;
pub mod gemini;
pub mod index;
pub mod orchestrator;
pub mod prompt;
pub mod resolver;
pub mod session;
pub mod toolbox;

pub use engine::{
    AssistantContent, EngineRequest, ReasoningEngine, Segment, ToolCall, ToolExecutor, ToolSpec,
};
pub use error::ChatError;
pub use gemini::GeminiEngine;
pub use index::{HotelIndex, HotelMemory};
pub use orchestrator::{HotelChatOrchestrator, TurnOutcome};
pub use resolver::{HotelReferenceResolver, Resolution, ResolutionStrategy};
pub use session::{ChatSession, SessionStore};
pub use toolbox::HotelToolbox;
