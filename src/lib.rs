pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod mortgage;
pub mod orchestrator;
pub mod tools;
pub mod ui;

pub use error::{CoinedError, Result};
pub use orchestrator::{Orchestrator, OrchestratorSettings, APOLOGY_REPLY};
