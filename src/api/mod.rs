pub mod client;
pub mod models;
pub mod response;
pub mod session;

pub use client::ChatClient;
pub use models::{format_tools_for_llm, Message, RequestBody, ToolCall};
pub use session::{OpenRouterService, OpenRouterSession, ServiceSettings};
