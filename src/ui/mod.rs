pub mod output;
pub mod transcript;

pub use output::{
    clear_thinking, display_error, display_message, display_notice, display_prompt,
    display_thinking,
};
pub use transcript::{ChatMessage, Role, Transcript};
