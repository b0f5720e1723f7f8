pub mod contract;
mod registry;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::mortgage::CalculatorError;

pub use registry::{coerce_arguments, LocalTool, ToolHandler, ToolRegistry};

/// A callable function as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid tool schema: {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Calculation(#[from] CalculatorError),

    #[error("Failed to encode tool result: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Payload returned to the model for one tool call.
///
/// Successes are wrapped as `{"result": ...}`, failures as `{"error": "..."}`
/// so the model can recover conversationally.
pub fn tool_payload(outcome: &Result<Value, ToolError>) -> Value {
    match outcome {
        Ok(result) => json!({ "result": result }),
        Err(e) => json!({ "error": e.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_payload_shapes() {
        let ok = tool_payload(&Ok(json!({"monthlyEMI": 1.0})));
        assert_eq!(ok, json!({"result": {"monthlyEMI": 1.0}}));

        let err = tool_payload(&Err(ToolError::UnknownTool("x".to_string())));
        assert_eq!(err, json!({"error": "Tool 'x' not found"}));
    }
}
