use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "coined")]
#[command(about = "Chat with COINED ONE about UAE mortgages and buy-vs-rent decisions", long_about = None)]
pub struct Args {
    #[arg(
        long = "api-endpoint",
        help = "Custom API base URL (e.g., http://localhost:11434/v1)"
    )]
    pub api_endpoint: Option<String>,

    #[arg(short = 'm', long = "model", help = "Model identifier to chat with")]
    pub model: Option<String>,

    #[arg(
        long = "timeout",
        value_name = "SECS",
        help = "Seconds allowed for each request to the chat service"
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "max-tool-rounds",
        value_name = "N",
        help = "Tool-call rounds allowed per message (1 = single round)"
    )]
    pub max_tool_rounds: Option<usize>,

    #[arg(short = 'v', long = "verbose", help = "Log requests and tool calls to stderr")]
    pub verbose: bool,

    #[arg(help = "Message to send once; omit to start an interactive chat")]
    pub message: Vec<String>,
}

impl Args {
    /// The one-shot message, if words were given on the command line.
    pub fn one_shot_message(&self) -> Option<String> {
        let message = self.message.join(" ");
        let message = message.trim();
        if message.is_empty() {
            None
        } else {
            Some(message.to_string())
        }
    }
}
