//! Conversation orchestration: one user turn against the chat service,
//! answering any tool calls the model makes along the way.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{CoinedError, Result};
use crate::llm::{LlmService, LlmSession, ModelTurn, SessionSetup, ToolCallRequest, ToolResponse};
use crate::mortgage::policy;
use crate::tools::{tool_payload, ToolRegistry};

/// Reply shown whenever a turn fails.
pub const APOLOGY_REPLY: &str =
    "I'm having a bit of trouble connecting to my brain right now. Can we try that again?";

/// Reply used when tools ran but the model had nothing to add.
pub const TOOL_FALLBACK_REPLY: &str = "I've calculated that for you.";

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    SessionActive,
    AwaitingResponse,
}

/// Steps of one exchange, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangePhase {
    Sent,
    ToolRequested { round: usize, calls: usize },
    ToolResultSent { round: usize },
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub text: String,
    pub phases: Vec<ExchangePhase>,
    pub tool_rounds: usize,
    /// Tool calls requested after the round limit was reached; never executed.
    pub dropped_tool_calls: usize,
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub system_instruction: String,
    /// Tool rounds allowed per user turn. 1 means a single round trip.
    pub max_tool_rounds: usize,
    /// Limit for each round trip to the service.
    pub request_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            system_instruction: policy::system_instruction(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Owns at most one chat session and drives user turns through it.
///
/// `&mut self` on every operation serialises turns against the session.
pub struct Orchestrator {
    service: Arc<dyn LlmService>,
    registry: ToolRegistry,
    settings: OrchestratorSettings,
    session: Option<Box<dyn LlmSession>>,
    state: SessionState,
}

impl Orchestrator {
    pub fn new(
        service: Arc<dyn LlmService>,
        registry: ToolRegistry,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            service,
            registry,
            settings,
            session: None,
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id())
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Establish the chat session if there is none yet.
    ///
    /// On failure the orchestrator stays `Uninitialized` and the next turn
    /// tries again.
    pub async fn start_session(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let setup = SessionSetup {
            system_instruction: self.settings.system_instruction.clone(),
            tools: self.registry.declarations(),
        };

        match with_timeout(self.settings.request_timeout, self.service.start_session(&setup)).await {
            Ok(session) => {
                info!(session_id = %session.id(), tools = setup.tools.len(), "session started");
                self.session = Some(session);
                self.state = SessionState::SessionActive;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to start chat session");
                self.state = SessionState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Drop the current session; the next turn starts a fresh one.
    pub fn dispose(&mut self) {
        if let Some(session) = self.session.take() {
            info!(session_id = %session.id(), "session disposed");
        }
        self.state = SessionState::Uninitialized;
    }

    /// Run one user turn and report how it went.
    pub async fn exchange(&mut self, text: &str) -> Result<TurnReport> {
        self.start_session().await?;

        let Some(session) = self.session.as_mut() else {
            return Err(CoinedError::SessionInit("no active session".to_string()));
        };

        self.state = SessionState::AwaitingResponse;
        let outcome = run_exchange(&mut **session, &self.registry, &self.settings, text).await;
        self.state = SessionState::SessionActive;
        outcome
    }

    /// Run one user turn; failures become [`APOLOGY_REPLY`].
    pub async fn send_message(&mut self, text: &str) -> String {
        match self.exchange(text).await {
            Ok(report) => report.text,
            Err(e) => {
                error!(error = %e, remote = e.is_remote(), "turn failed");
                APOLOGY_REPLY.to_string()
            }
        }
    }

    /// Like [`send_message`](Self::send_message), but gives up with `None`
    /// once `cancel` fires.
    pub async fn send_message_cancellable(
        &mut self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Option<String> {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            reply = self.send_message(text) => Some(reply),
        };

        if outcome.is_none() {
            info!("turn cancelled");
            self.state = if self.session.is_some() {
                SessionState::SessionActive
            } else {
                SessionState::Uninitialized
            };
        }
        outcome
    }
}

async fn run_exchange(
    session: &mut dyn LlmSession,
    registry: &ToolRegistry,
    settings: &OrchestratorSettings,
    text: &str,
) -> Result<TurnReport> {
    let mut phases = vec![ExchangePhase::Sent];
    let mut turn: ModelTurn = with_timeout(settings.request_timeout, session.send_text(text)).await?;
    let mut tool_rounds = 0;
    let mut dropped_tool_calls = 0;

    while turn.has_tool_calls() {
        if tool_rounds >= settings.max_tool_rounds {
            dropped_tool_calls = turn.tool_calls.len();
            warn!(
                dropped = dropped_tool_calls,
                max_rounds = settings.max_tool_rounds,
                "tool round limit reached; dropping tool calls"
            );
            break;
        }

        tool_rounds += 1;
        phases.push(ExchangePhase::ToolRequested {
            round: tool_rounds,
            calls: turn.tool_calls.len(),
        });

        let results = execute_tool_calls(registry, &turn.tool_calls);
        turn = with_timeout(settings.request_timeout, session.send_tool_results(&results)).await?;
        phases.push(ExchangePhase::ToolResultSent { round: tool_rounds });
    }

    phases.push(ExchangePhase::Completed);

    let text = match turn.visible_text() {
        Some(text) => text.to_string(),
        None if tool_rounds > 0 => TOOL_FALLBACK_REPLY.to_string(),
        None => String::new(),
    };

    debug!(tool_rounds, chars = text.len(), "exchange completed");
    Ok(TurnReport {
        text,
        phases,
        tool_rounds,
        dropped_tool_calls,
    })
}

/// Answer every call of one model turn, in order.
///
/// Failures are returned to the model as error payloads rather than
/// aborting the turn.
pub fn execute_tool_calls(registry: &ToolRegistry, calls: &[ToolCallRequest]) -> Vec<ToolResponse> {
    calls
        .iter()
        .map(|call| {
            info!(tool = %call.name, call_id = %call.id, "executing tool");
            let outcome = registry.call(&call.name, &call.arguments);
            if let Err(e) = &outcome {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "tool call failed");
            }
            ToolResponse {
                call_id: call.id.clone(),
                name: call.name.clone(),
                payload: tool_payload(&outcome),
            }
        })
        .collect()
}

async fn with_timeout<T>(limit: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| CoinedError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::contract::CALCULATE_EMI_TOOL_NAME;
    use serde_json::json;

    fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCallRequest {
        ToolCallRequest {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_execute_tool_calls_keeps_ids_and_order() {
        let registry = ToolRegistry::new();
        let responses = execute_tool_calls(
            &registry,
            &[
                call(
                    "a",
                    CALCULATE_EMI_TOOL_NAME,
                    json!({"loanAmount": 500000, "annualInterestRate": 0, "tenureYears": 10}),
                ),
                call("b", "lookupRent", json!({})),
                call(
                    "c",
                    CALCULATE_EMI_TOOL_NAME,
                    json!({"loanAmount": 0, "annualInterestRate": 4.5, "tenureYears": 25}),
                ),
            ],
        );

        let ids: Vec<&str> = responses.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(responses[0].payload["result"]["monthlyEMI"], 4166.67);
        assert_eq!(responses[1].payload["error"], "Tool 'lookupRent' not found");
        assert!(responses[2].payload["error"]
            .as_str()
            .unwrap()
            .contains("loanAmount"));
    }

    #[test]
    fn test_default_settings() {
        let settings = OrchestratorSettings::default();
        assert_eq!(settings.max_tool_rounds, DEFAULT_MAX_TOOL_ROUNDS);
        assert!(settings.system_instruction.contains(CALCULATE_EMI_TOOL_NAME));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let result: Result<()> = with_timeout(Duration::from_secs(2), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(CoinedError::Timeout(_))));
    }
}
