mod api;
mod defaults;
mod validation;

use crate::api::ServiceSettings;
use crate::cli::Args;
use crate::error::{CoinedError, Result};
use crate::mortgage::policy;
use crate::orchestrator::OrchestratorSettings;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use api::{normalize_endpoint, ApiConfig};
pub use defaults::{
    default_max_tool_rounds, default_request_timeout, DEFAULT_API_ENDPOINT, DEFAULT_MODEL,
};
pub use validation::expand_env_var_in_string;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
    #[serde(default)]
    pub max_tool_rounds: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub default_model: Option<String>,
    /// Replaces the built-in assistant instruction.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Contents of a `.coined.yaml` / `.coined.json` file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub request_timeout: u64,
    pub max_tool_rounds: usize,
    pub verbose: bool,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let json_config = JsonConfig::load()?;
        Self::resolve(args, &json_config, |name| env::var(name).ok())
    }

    /// Merge settings with precedence CLI args > env vars > config file > defaults.
    pub fn resolve(
        args: &Args,
        json_config: &JsonConfig,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        // API key only ever comes from the environment
        let api_key = env_var("OPENROUTER_API_KEY").filter(|k| !k.trim().is_empty());

        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| env_var("AI_API_ENDPOINT"))
            .or_else(|| json_config.api.endpoint.clone())
            .map(|endpoint| normalize_endpoint(&expand_env_var_in_string(&endpoint, &env_var)))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());

        let model = args
            .model
            .clone()
            .or_else(|| env_var("AI_MODEL"))
            .or_else(|| json_config.model.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let system_prompt = env_var("AI_SYSTEM_PROMPT")
            .or_else(|| json_config.model.system_prompt.clone())
            .filter(|p| !p.trim().is_empty());

        let request_timeout = match args.timeout {
            Some(secs) => secs,
            None => match env_var("AI_REQUEST_TIMEOUT") {
                Some(raw) => parse_setting("AI_REQUEST_TIMEOUT", &raw)?,
                None => json_config
                    .api
                    .request_timeout
                    .unwrap_or_else(default_request_timeout),
            },
        };
        if request_timeout == 0 {
            return Err(CoinedError::ConfigError(
                "request timeout must be at least 1 second".to_string(),
            ));
        }

        let max_tool_rounds = match args.max_tool_rounds {
            Some(rounds) => rounds,
            None => match env_var("AI_MAX_TOOL_ROUNDS") {
                Some(raw) => parse_setting("AI_MAX_TOOL_ROUNDS", &raw)?,
                None => json_config
                    .session
                    .max_tool_rounds
                    .unwrap_or_else(default_max_tool_rounds),
            },
        };
        if max_tool_rounds == 0 {
            return Err(CoinedError::ConfigError(
                "max tool rounds must be at least 1".to_string(),
            ));
        }

        let verbose = args.verbose
            || env_var("AI_VERBOSE")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .or(json_config.session.verbose)
                .unwrap_or(false);

        Ok(Config {
            api_key,
            api_endpoint,
            model,
            system_prompt,
            request_timeout,
            max_tool_rounds,
            verbose,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            api_key: self.api_key.clone(),
            endpoint: self.api_endpoint.clone(),
            model: self.model.clone(),
            request_timeout: self.request_timeout(),
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            system_instruction: self
                .system_prompt
                .clone()
                .unwrap_or_else(policy::system_instruction),
            max_tool_rounds: self.max_tool_rounds,
            request_timeout: self.request_timeout(),
        }
    }
}

fn parse_setting<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| CoinedError::ConfigError(format!("{} must be a whole number, got '{}'", name, raw)))
}

impl JsonConfig {
    /// Load the first config file found, or defaults when there is none.
    pub fn load() -> anyhow::Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            // Current directory (local override)
            PathBuf::from(".coined.yaml"),
            PathBuf::from(".coined.yml"),
            PathBuf::from(".coined.json"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("coined");
            paths.push(config_dir.join("coined.yaml"));
            paths.push(config_dir.join("coined.yml"));
            paths.push(config_dir.join("coined.json"));
        }

        paths
    }
}
