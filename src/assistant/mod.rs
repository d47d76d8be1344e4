//! QA assistant: natural-language creation of suites and cases.
//!
//! This module provides:
//! - Message types for model communication
//! - `LlmClient` trait, `AnthropicClient` and a scripted `MockLlmClient`
//! - The two tool intents and their parsing
//! - `AssistantSession`, the conversation and request flow

pub mod anthropic;
pub mod client;
pub mod intents;
pub mod session;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use client::{LlmClient, MockLlmClient};
pub use intents::{AssistantAction, CreateTestCaseArgs, CreateTestSuiteArgs, StepArgs, parse_tool_calls, tool_definitions};
pub use session::{AssistantSession, AssistantTurn, EMPTY_REPLY, ERROR_REPLY, GREETING, SuiteRef, system_prompt};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, ToolCall, ToolDefinition, Usage};
