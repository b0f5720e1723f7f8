//! Boundary to a chat-completion service that supports function calling.
//!
//! The service owns the conversation history of a session; callers only
//! submit the next user text or the results of requested tool calls.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::tools::ToolDeclaration;

/// Everything a session is created with.
#[derive(Debug, Clone)]
pub struct SessionSetup {
    pub system_instruction: String,
    pub tools: Vec<ToolDeclaration>,
}

/// A structured request from the model to run a named local function.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// Arguments exactly as the service delivered them; not yet validated.
    pub arguments: Value,
}

/// One model response: text, tool-call requests, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            text: None,
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Text with surrounding whitespace removed; `None` when blank.
    pub fn visible_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Result of one tool call, keyed by the originating call id.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    pub call_id: String,
    pub name: String,
    pub payload: Value,
}

#[async_trait]
pub trait LlmService: Send + Sync {
    /// Open a new conversation context configured with `setup`.
    async fn start_session(&self, setup: &SessionSetup) -> Result<Box<dyn LlmSession>>;
}

#[async_trait]
pub trait LlmSession: Send {
    fn id(&self) -> &str;

    /// Submit user text; prior turns of this session remain in context.
    async fn send_text(&mut self, text: &str) -> Result<ModelTurn>;

    /// Submit the results of the previous turn's tool calls as one message.
    async fn send_tool_results(&mut self, results: &[ToolResponse]) -> Result<ModelTurn>;
}
