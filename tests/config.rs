use coined_one::cli::Args;
use coined_one::config::{Config, JsonConfig, DEFAULT_API_ENDPOINT, DEFAULT_MODEL};
use coined_one::mortgage::policy;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_defaults_without_any_settings() {
    let config = Config::resolve(&Args::default(), &JsonConfig::default(), env_from(&[])).unwrap();

    assert!(config.api_key.is_none());
    assert_eq!(config.api_endpoint, DEFAULT_API_ENDPOINT);
    assert_eq!(config.model, DEFAULT_MODEL);
    assert_eq!(config.request_timeout, 60);
    assert_eq!(config.max_tool_rounds, 3);
    assert!(!config.verbose);
    assert_eq!(
        config.orchestrator_settings().system_instruction,
        policy::system_instruction()
    );
}

#[test]
fn test_cli_beats_env_beats_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("coined.yaml");
    fs::write(
        &path,
        "api:\n  endpoint: http://file-host/v1\n  request_timeout: 15\nmodel:\n  default_model: file/model\nsession:\n  max_tool_rounds: 2\n  verbose: true\n",
    )
    .unwrap();
    let file = JsonConfig::load_from(&path).unwrap();

    let env = env_from(&[
        ("OPENROUTER_API_KEY", "sk-test"),
        ("AI_MODEL", "env/model"),
        ("AI_REQUEST_TIMEOUT", "45"),
    ]);
    let args = Args {
        api_endpoint: Some("http://cli-host:8080".to_string()),
        max_tool_rounds: Some(1),
        ..Default::default()
    };

    let config = Config::resolve(&args, &file, env).unwrap();

    assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.api_endpoint, "http://cli-host:8080/v1/chat/completions");
    assert_eq!(config.model, "env/model");
    assert_eq!(config.request_timeout, 45);
    assert_eq!(config.max_tool_rounds, 1);
    assert!(config.verbose);

    let service = config.service_settings();
    assert_eq!(service.request_timeout, Duration::from_secs(45));
    assert_eq!(service.model, "env/model");
}

#[test]
fn test_file_values_used_when_nothing_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("coined.json");
    fs::write(
        &path,
        r#"{"api": {"endpoint": "http://${LLM_HOST}/v1"}, "model": {"system_prompt": "Be brief."}}"#,
    )
    .unwrap();
    let file = JsonConfig::load_from(&path).unwrap();

    let config = Config::resolve(
        &Args::default(),
        &file,
        env_from(&[("LLM_HOST", "localhost:11434")]),
    )
    .unwrap();

    assert_eq!(config.api_endpoint, "http://localhost:11434/v1/chat/completions");
    assert_eq!(config.orchestrator_settings().system_instruction, "Be brief.");
}

#[test]
fn test_invalid_numbers_are_rejected() {
    let err = Config::resolve(
        &Args::default(),
        &JsonConfig::default(),
        env_from(&[("AI_MAX_TOOL_ROUNDS", "many")]),
    )
    .unwrap_err();
    assert!(err.to_string().contains("AI_MAX_TOOL_ROUNDS"));

    let args = Args {
        max_tool_rounds: Some(0),
        ..Default::default()
    };
    assert!(Config::resolve(&args, &JsonConfig::default(), env_from(&[])).is_err());

    let args = Args {
        timeout: Some(0),
        ..Default::default()
    };
    assert!(Config::resolve(&args, &JsonConfig::default(), env_from(&[])).is_err());
}

#[test]
fn test_blank_api_key_treated_as_missing() {
    let config = Config::resolve(
        &Args::default(),
        &JsonConfig::default(),
        env_from(&[("OPENROUTER_API_KEY", "   ")]),
    )
    .unwrap();
    assert!(config.api_key.is_none());
}

#[test]
fn test_malformed_config_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("coined.yaml");
    fs::write(&path, "api: [not, a, mapping").unwrap();

    let err = JsonConfig::load_from(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("coined.yaml"));
}
