use coined_one::mortgage::{calculate_emi, EmiInput};
use coined_one::tools::contract::{calculate_emi_declaration, required_fields, CALCULATE_EMI_TOOL_NAME};
use coined_one::tools::{tool_payload, ToolError, ToolRegistry};
use serde_json::json;

#[test]
fn test_calculate_emi_success() {
    let registry = ToolRegistry::new();

    let args = json!({
        "loanAmount": 1000000,
        "annualInterestRate": 4.5,
        "tenureYears": 25
    });

    let result = registry.call(CALCULATE_EMI_TOOL_NAME, &args).unwrap();
    assert_eq!(result["monthlyEMI"], 5558.32);
    assert_eq!(result["totalPayment"], 1_667_497.43);
    assert_eq!(result["totalInterest"], 667_497.43);
    assert_eq!(result["currency"], "AED");
}

#[test]
fn test_calculate_emi_matches_direct_call() {
    let registry = ToolRegistry::new();
    let args = json!({"loanAmount": 2000000, "annualInterestRate": 3.99, "tenureYears": 20});

    let via_tool = registry.call(CALCULATE_EMI_TOOL_NAME, &args).unwrap();
    let direct = calculate_emi(&EmiInput::new(2_000_000.0, 3.99, 20.0)).unwrap();

    assert_eq!(via_tool, serde_json::to_value(direct).unwrap());
}

#[test]
fn test_calculate_emi_zero_rate() {
    let registry = ToolRegistry::new();
    let args = json!({"loanAmount": 500000, "annualInterestRate": 0, "tenureYears": 10});

    let result = registry.call(CALCULATE_EMI_TOOL_NAME, &args).unwrap();
    assert_eq!(result["monthlyEMI"], 4166.67);
    assert_eq!(result["totalInterest"], 0.0);
}

#[test]
fn test_calculate_emi_missing_arguments() {
    let registry = ToolRegistry::new();

    let result = registry.call(CALCULATE_EMI_TOOL_NAME, &json!({}));
    let err = result.unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
    assert!(err.to_string().contains("loanAmount"));
}

#[test]
fn test_calculate_emi_negative_tenure_is_reported_not_thrown() {
    let registry = ToolRegistry::new();
    let args = json!({"loanAmount": 1000000, "annualInterestRate": 4.5, "tenureYears": -5});

    let outcome = registry.call(CALCULATE_EMI_TOOL_NAME, &args);
    let payload = tool_payload(&outcome);
    assert!(payload.get("result").is_none());
    assert!(payload["error"].as_str().unwrap().contains("tenureYears"));
}

#[test]
fn test_declared_fields_match_calculator_input() {
    let declaration = calculate_emi_declaration();
    assert_eq!(declaration.name, CALCULATE_EMI_TOOL_NAME);

    let mut declared = required_fields(&declaration.parameters);
    declared.sort();
    let mut consumed: Vec<String> = EmiInput::FIELDS.iter().map(|f| f.to_string()).collect();
    consumed.sort();

    assert_eq!(declared, consumed);
}

#[test]
fn test_calculate_emi_extreme_inputs_stay_numeric() {
    let registry = ToolRegistry::new();

    for args in [
        json!({"loanAmount": 100000, "annualInterestRate": 1e-15, "tenureYears": 10}),
        json!({"loanAmount": 100000, "annualInterestRate": 4.5, "tenureYears": 20000}),
    ] {
        let result = registry.call(CALCULATE_EMI_TOOL_NAME, &args).unwrap();
        for field in ["monthlyEMI", "totalInterest", "totalPayment"] {
            assert!(result[field].is_f64(), "{} was {} for {}", field, result[field], args);
        }
    }
}
