pub const DEFAULT_API_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

pub fn default_request_timeout() -> u64 {
    60
}

pub fn default_max_tool_rounds() -> usize {
    3
}
