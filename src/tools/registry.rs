use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::contract::{self, CALCULATE_EMI_TOOL_NAME};
use super::{ToolDeclaration, ToolError};
use crate::mortgage::{calculate_emi, EmiInput};

pub type ToolHandler = Box<dyn Fn(&Value) -> Result<Value, ToolError> + Send + Sync>;

pub struct LocalTool {
    pub declaration: ToolDeclaration,
    pub handler: ToolHandler,
}

impl LocalTool {
    pub fn name(&self) -> &str {
        &self.declaration.name
    }
}

pub struct ToolRegistry {
    tools: HashMap<String, LocalTool>,
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry holding the built-in mortgage tools.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(LocalTool {
            declaration: contract::calculate_emi_declaration(),
            handler: Box::new(handle_calculate_emi),
        });
        registry
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: LocalTool) {
        self.tools.insert(tool.declaration.name.clone(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&LocalTool> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Tools sorted by name.
    pub fn list(&self) -> Vec<&LocalTool> {
        let mut tools: Vec<&LocalTool> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.list().into_iter().map(|t| t.declaration.clone()).collect()
    }

    pub fn validate_arguments(&self, tool_name: &str, arguments: &Value) -> Result<(), ToolError> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&tool.declaration.parameters)
            .map_err(|e| ToolError::InvalidSchema(e.to_string()))?;

        if let Err(errors) = schema.validate(arguments) {
            let error_messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect();
            return Err(ToolError::InvalidArguments(error_messages.join("; ")));
        }

        Ok(())
    }

    /// Normalize, validate and execute a tool call.
    pub fn call(&self, tool_name: &str, arguments: &Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        let arguments = coerce_arguments(arguments, &tool.declaration.parameters)?;
        self.validate_arguments(tool_name, &arguments)?;

        debug!(tool = tool_name, %arguments, "executing local tool");
        (tool.handler)(&arguments)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Bring loosely-typed model arguments into the declared shape.
///
/// A JSON-encoded string is decoded into its object, and numeric fields given
/// as strings ("1,000,000", " 4.5 ") are parsed into numbers. Anything else is
/// left for schema validation to reject.
pub fn coerce_arguments(arguments: &Value, parameters: &Value) -> Result<Value, ToolError> {
    let mut arguments = match arguments {
        Value::String(raw) => serde_json::from_str::<Value>(raw).map_err(|e| {
            ToolError::InvalidArguments(format!("arguments are not valid JSON: {}", e))
        })?,
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other.clone(),
    };

    let Some(object) = arguments.as_object_mut() else {
        return Err(ToolError::InvalidArguments(
            "arguments must be a JSON object".to_string(),
        ));
    };

    for field in contract::numeric_fields(parameters) {
        let parsed = match object.get(&field) {
            Some(Value::String(text)) => parse_number(text),
            _ => None,
        };
        if let Some(number) = parsed.and_then(serde_json::Number::from_f64) {
            object.insert(field, Value::Number(number));
        }
    }

    Ok(arguments)
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn handle_calculate_emi(arguments: &Value) -> Result<Value, ToolError> {
    let input: EmiInput = serde_json::from_value(arguments.clone())
        .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
    let result = calculate_emi(&input)?;
    debug!(
        tool = CALCULATE_EMI_TOOL_NAME,
        monthly_emi = result.monthly_emi,
        "emi calculated"
    );
    Ok(serde_json::to_value(result)?)
}
