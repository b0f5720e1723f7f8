use serde_json::Value;
use uuid::Uuid;

use super::models::{FunctionCall, ToolCall};
use crate::error::{CoinedError, Result};
use crate::llm::{ModelTurn, ToolCallRequest};

fn first_message(response_json: &Value) -> Result<&Value> {
    let choices = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| CoinedError::MalformedResponse("No choices in response".to_string()))?;

    let first_choice = choices
        .first()
        .ok_or_else(|| CoinedError::MalformedResponse("Empty choices array".to_string()))?;

    first_choice
        .get("message")
        .ok_or_else(|| CoinedError::MalformedResponse("No message in response".to_string()))
}

/// Fail on an `error` object, which some providers return with HTTP 200.
pub fn check_error(response_json: &Value) -> Result<()> {
    if let Some(error) = response_json.get("error") {
        let status = error
            .get("code")
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(500);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
            .unwrap_or_else(|| error.to_string());
        return Err(CoinedError::ApiError { status, message });
    }
    Ok(())
}

/// Parse a non-streaming API response and extract tool calls if present
pub fn parse_tool_calls(response_json: &Value) -> Result<Option<Vec<Value>>> {
    let message = first_message(response_json)?;

    if let Some(tool_calls) = message.get("tool_calls").and_then(|tc| tc.as_array()) {
        if !tool_calls.is_empty() {
            return Ok(Some(tool_calls.clone()));
        }
    }

    Ok(None)
}

/// Extract content from a non-streaming response
pub fn extract_content(response_json: &Value) -> Result<Option<String>> {
    let message = first_message(response_json)?;

    Ok(message
        .get("content")
        .and_then(|c| c.as_str())
        .map(|s| s.to_string()))
}

/// Convert a raw tool call into a request the orchestrator can answer.
///
/// Every call must be answerable by id, so a missing id is replaced with a
/// generated one and a missing name becomes empty (reported as unknown).
/// Arguments that are not valid JSON are kept as the raw string.
pub fn to_tool_call_request(raw: &Value) -> ToolCallRequest {
    let id = raw
        .get("id")
        .and_then(|i| i.as_str())
        .filter(|i| !i.is_empty())
        .map(|i| i.to_string())
        .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));

    let function = raw.get("function");
    let name = function
        .and_then(|f| f.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default()
        .to_string();

    let arguments = match function.and_then(|f| f.get("arguments")) {
        Some(Value::String(raw_args)) if raw_args.trim().is_empty() => {
            Value::Object(serde_json::Map::new())
        }
        Some(Value::String(raw_args)) => serde_json::from_str(raw_args)
            .unwrap_or_else(|_| Value::String(raw_args.clone())),
        Some(other) => other.clone(),
        None => Value::Null,
    };

    ToolCallRequest {
        id,
        name,
        arguments,
    }
}

/// Re-encode a request for the assistant message kept in history.
pub fn to_wire_tool_call(request: &ToolCallRequest) -> ToolCall {
    let arguments = match &request.arguments {
        Value::String(raw) => raw.clone(),
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    };
    ToolCall {
        id: request.id.clone(),
        tool_type: "function".to_string(),
        function: FunctionCall {
            name: request.name.clone(),
            arguments,
        },
    }
}

pub fn parse_model_turn(response_json: &Value) -> Result<ModelTurn> {
    check_error(response_json)?;

    let text = extract_content(response_json)?;
    let tool_calls = parse_tool_calls(response_json)?
        .unwrap_or_default()
        .iter()
        .map(to_tool_call_request)
        .collect();

    Ok(ModelTurn { text, tool_calls })
}
