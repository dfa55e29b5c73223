mod commands;
mod terminal;
mod utils;

use agent_host::{ChatSession, ModelChoice};
use commands::{parse_attachment_paths, parse_command, Command, HELP};
use providers::ChatError;
use terminal::{read_line, TerminalPicker};
use tracing_subscriber::EnvFilter;

const RULE: &str = "==================================================";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report_error(err: &ChatError) {
    if err.is_network() {
        eprintln!("HTTP error: {}", err);
    } else {
        eprintln!("Error: {}", err);
    }
}

async fn change_model(session: &mut ChatSession) {
    println!("Fetching available models...");
    match session.choose_model(&TerminalPicker).await {
        ModelChoice::Selected(model) => println!("Model changed to: {}", model),
        ModelChoice::Cancelled => {}
        ModelChoice::Unavailable => {
            println!("No models found or couldn't connect to the model server");
            println!("Please check that the server is running and the settings file points at it");
        }
    }
}

async fn send_message(session: &mut ChatSession, text: &str) {
    let files = read_line("Files (comma separated full paths, enter to skip): ")
        .await
        .unwrap_or_default();
    for path in parse_attachment_paths(&files) {
        session.attach(path);
    }

    match session.send(text).await {
        Ok(reply) => println!("Assistant: {}", reply),
        Err(e) => report_error(&e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let (mut settings, from_file) = utils::load_settings_or_default();
    utils::apply_env_overrides(&mut settings.server, |key| std::env::var(key).ok());
    tracing::debug!(from_file, base_url = %settings.server.base_url(), "settings loaded");

    println!("LM Studio Chat Client");
    println!("{}", RULE);

    let mut session = ChatSession::new(settings.server);
    if session.current_model().is_none() {
        change_model(&mut session).await;
    }
    let Some(model) = session.current_model() else {
        println!("Failed to select model. Exiting.");
        return Ok(());
    };
    println!("Using model: {}", model);

    println!("\n{}", RULE);
    println!("Chat session started!");
    println!("{}", HELP);
    println!("{}", RULE);

    loop {
        let Some(line) = read_line("\n> ").await else {
            println!("\nExit");
            break;
        };

        match parse_command(&line) {
            Command::Empty => continue,
            Command::Models => change_model(&mut session).await,
            Command::Model => match session.current_model() {
                Some(model) => println!("Current model: {}", model),
                None => println!("No model selected"),
            },
            Command::Exit => break,
            Command::Message(text) => send_message(&mut session, &text).await,
        }
    }

    Ok(())
}
