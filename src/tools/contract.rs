//! Declaration of the `calculateEmi` tool as advertised to the model.

use serde_json::{json, Value};

use super::ToolDeclaration;

pub const CALCULATE_EMI_TOOL_NAME: &str = "calculateEmi";

pub fn calculate_emi_declaration() -> ToolDeclaration {
    ToolDeclaration {
        name: CALCULATE_EMI_TOOL_NAME.to_string(),
        description: "Calculates the monthly Equated Monthly Installment (EMI) for a loan."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "loanAmount": {
                    "type": "number",
                    "description": "The total principal loan amount in AED."
                },
                "annualInterestRate": {
                    "type": "number",
                    "description": "The annual interest rate in percentage (e.g., 4.5 for 4.5%)."
                },
                "tenureYears": {
                    "type": "number",
                    "description": "The duration of the loan in years."
                }
            },
            "required": ["loanAmount", "annualInterestRate", "tenureYears"]
        }),
    }
}

/// Names listed under `required` in a parameters schema.
pub fn required_fields(parameters: &Value) -> Vec<String> {
    parameters
        .get("required")
        .and_then(|r| r.as_array())
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f.as_str())
                .map(|f| f.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Names of properties declared with `"type": "number"`.
pub fn numeric_fields(parameters: &Value) -> Vec<String> {
    parameters
        .get("properties")
        .and_then(|p| p.as_object())
        .map(|properties| {
            properties
                .iter()
                .filter(|(_, spec)| spec.get("type").and_then(|t| t.as_str()) == Some("number"))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mortgage::EmiInput;

    fn sorted(mut fields: Vec<String>) -> Vec<String> {
        fields.sort();
        fields
    }

    #[test]
    fn test_required_fields_match_calculator_input() {
        let declaration = calculate_emi_declaration();
        let mut expected: Vec<String> = EmiInput::FIELDS.iter().map(|f| f.to_string()).collect();
        expected.sort();

        assert_eq!(sorted(required_fields(&declaration.parameters)), expected);
    }

    #[test]
    fn test_every_parameter_is_a_required_number() {
        let declaration = calculate_emi_declaration();
        let properties = declaration.parameters["properties"].as_object().unwrap();
        assert_eq!(properties.len(), EmiInput::FIELDS.len());
        assert_eq!(
            sorted(numeric_fields(&declaration.parameters)),
            sorted(required_fields(&declaration.parameters))
        );
    }

    #[test]
    fn test_required_fields_deserialize_into_input() {
        let declaration = calculate_emi_declaration();
        let mut args = serde_json::Map::new();
        for field in required_fields(&declaration.parameters) {
            args.insert(field, json!(1.0));
        }
        let input: EmiInput = serde_json::from_value(Value::Object(args)).unwrap();
        assert_eq!(input, EmiInput::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_required_fields_missing() {
        assert!(required_fields(&json!({"type": "object"})).is_empty());
    }
}
