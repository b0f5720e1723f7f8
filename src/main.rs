use clap::Parser;
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use coined_one::api::OpenRouterService;
use coined_one::cli::Args;
use coined_one::config::Config;
use coined_one::mortgage::policy::INITIAL_GREETING;
use coined_one::tools::ToolRegistry;
use coined_one::ui::{self, ChatMessage, Role, Transcript};
use coined_one::{Orchestrator, APOLOGY_REPLY};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            ui::display_error(&e.to_string());
            process::exit(1);
        }
    };

    init_tracing(config.verbose);

    if config.api_key.is_none() {
        ui::display_notice("OPENROUTER_API_KEY is not set; replies will fail until it is.");
    }

    let service = Arc::new(OpenRouterService::new(config.service_settings()));
    let mut orchestrator =
        Orchestrator::new(service, ToolRegistry::new(), config.orchestrator_settings());

    if let Some(message) = args.one_shot_message() {
        let reply = orchestrator.send_message(&message).await;
        println!("{}", reply);
        if reply == APOLOGY_REPLY {
            process::exit(1);
        }
        return Ok(());
    }

    run_chat(&mut orchestrator).await?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "coined_one=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_chat(orchestrator: &mut Orchestrator) -> std::io::Result<()> {
    let mut transcript = Transcript::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    show(&mut transcript, ChatMessage::new(Role::Model, INITIAL_GREETING));
    ui::display_notice("Type /reset to start over, /exit to quit. Ctrl-C cancels a pending reply.");

    loop {
        ui::display_prompt()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let text = line.trim();
        match text {
            "" => continue,
            "/exit" | "/quit" => break,
            "/reset" => {
                orchestrator.dispose();
                transcript.clear();
                show(&mut transcript, ChatMessage::new(Role::Model, INITIAL_GREETING));
                continue;
            }
            _ => {}
        }

        transcript.push(ChatMessage::new(Role::User, text));

        // One request at a time: no input is read until this turn settles.
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        ui::display_thinking()?;
        let reply = orchestrator.send_message_cancellable(text, &cancel).await;
        watcher.abort();
        ui::clear_thinking()?;

        match reply {
            Some(reply) if reply == APOLOGY_REPLY => {
                show(&mut transcript, ChatMessage::error(Role::Model, reply));
            }
            Some(reply) => show(&mut transcript, ChatMessage::new(Role::Model, reply)),
            None => ui::display_notice("Cancelled."),
        }
    }

    Ok(())
}

fn show(transcript: &mut Transcript, message: ChatMessage) {
    ui::display_message(&message);
    transcript.push(message);
}
