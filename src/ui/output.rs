use colored::*;
use std::io::{self, Write};

use super::transcript::{ChatMessage, Role};

const ASSISTANT_LABEL: &str = "COINED ONE";

/// Print one transcript entry.
pub fn display_message(message: &ChatMessage) {
    match message.role {
        Role::User => println!("{} {}", "You:".bold().blue(), message.content),
        Role::Model if message.is_error => {
            println!("{} {}", format!("{}:", ASSISTANT_LABEL).bold().green(), message.content.red())
        }
        Role::Model => println!(
            "{} {}",
            format!("{}:", ASSISTANT_LABEL).bold().green(),
            message.content
        ),
        Role::System => println!("{}", message.content.dimmed()),
    }
    println!();
}

/// Show the waiting indicator on the current line.
pub fn display_thinking() -> io::Result<()> {
    print!("{}", "thinking...".dimmed());
    io::stdout().flush()
}

/// Erase the waiting indicator.
pub fn clear_thinking() -> io::Result<()> {
    print!("\r{}\r", " ".repeat("thinking...".len()));
    io::stdout().flush()
}

pub fn display_prompt() -> io::Result<()> {
    print!("{} ", ">".bold().blue());
    io::stdout().flush()
}

pub fn display_notice(text: &str) {
    println!("{}", text.yellow());
}

pub fn display_error(text: &str) {
    eprintln!("{} {}", "Error:".red(), text);
}
