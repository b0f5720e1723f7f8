use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::client::ChatClient;
use super::models::{format_tools_for_llm, Message};
use super::response::{parse_model_turn, to_wire_tool_call};
use crate::error::{CoinedError, Result};
use crate::llm::{LlmService, LlmSession, ModelTurn, SessionSetup, ToolResponse};

/// Connection settings for an OpenAI-compatible chat service.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub request_timeout: Duration,
}

/// Chat service reached over HTTP (OpenRouter by default).
///
/// The HTTP API is stateless, so each session keeps its own message history
/// and resends it on every round trip.
pub struct OpenRouterService {
    settings: ServiceSettings,
}

impl OpenRouterService {
    pub fn new(settings: ServiceSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl LlmService for OpenRouterService {
    async fn start_session(&self, setup: &SessionSetup) -> Result<Box<dyn LlmSession>> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                CoinedError::SessionInit(
                    "OPENROUTER_API_KEY environment variable not set".to_string(),
                )
            })?;

        reqwest::Url::parse(&self.settings.endpoint).map_err(|e| {
            CoinedError::SessionInit(format!(
                "Invalid API endpoint '{}': {}",
                self.settings.endpoint, e
            ))
        })?;

        let client = ChatClient::new(
            api_key,
            &self.settings.endpoint,
            &self.settings.model,
            self.settings.request_timeout,
        )?;

        let session = OpenRouterSession::new(client, setup);
        info!(session_id = %session.id, model = %self.settings.model, "chat session created");
        Ok(Box::new(session))
    }
}

pub struct OpenRouterSession {
    id: String,
    client: ChatClient,
    tools: Vec<Value>,
    messages: Vec<Message>,
    /// History length before the turn in progress; restored on failure.
    turn_start: usize,
    /// Set while a request is in flight; still set if that request was abandoned.
    pending: bool,
}

impl OpenRouterSession {
    pub fn new(client: ChatClient, setup: &SessionSetup) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client,
            tools: format_tools_for_llm(&setup.tools),
            messages: vec![Message::system(setup.system_instruction.clone())],
            turn_start: 1,
            pending: false,
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    async fn round_trip(&mut self) -> Result<ModelTurn> {
        let tools = if self.tools.is_empty() {
            None
        } else {
            Some(self.tools.as_slice())
        };
        self.pending = true;
        let response = self.client.complete(&self.messages, tools).await;
        self.pending = false;
        let turn = parse_model_turn(&response?)?;

        self.messages.push(Message::assistant(
            turn.text.clone(),
            turn.tool_calls.iter().map(to_wire_tool_call).collect(),
        ));
        Ok(turn)
    }

    fn rollback(&mut self) {
        debug!(
            session_id = %self.id,
            dropped = self.messages.len().saturating_sub(self.turn_start),
            "rolling back incomplete turn"
        );
        self.messages.truncate(self.turn_start);
    }

    /// Answer tool calls left open by an earlier turn so the service accepts the next message.
    fn close_dangling_tool_calls(&mut self) {
        let Some(open_calls) = self
            .messages
            .last()
            .filter(|m| m.role == "assistant")
            .and_then(|m| m.tool_calls.clone())
        else {
            return;
        };

        for call in open_calls {
            debug!(call_id = %call.id, "closing unanswered tool call");
            self.messages.push(Message::tool(
                call.id,
                json!({ "error": "Tool call was not executed" }).to_string(),
            ));
        }
    }
}

#[async_trait]
impl LlmSession for OpenRouterSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_text(&mut self, text: &str) -> Result<ModelTurn> {
        if self.pending {
            self.rollback();
            self.pending = false;
        }
        self.close_dangling_tool_calls();
        self.turn_start = self.messages.len();
        self.messages.push(Message::user(text));

        match self.round_trip().await {
            Ok(turn) => Ok(turn),
            Err(e) => {
                self.rollback();
                Err(e)
            }
        }
    }

    async fn send_tool_results(&mut self, results: &[ToolResponse]) -> Result<ModelTurn> {
        for result in results {
            self.messages
                .push(Message::tool(result.call_id.clone(), result.payload.to_string()));
        }

        match self.round_trip().await {
            Ok(turn) => Ok(turn),
            Err(e) => {
                self.rollback();
                Err(e)
            }
        }
    }
}
