//! Blocking stdin access and the interactive model picker.

use agent_host::ModelPicker;
use providers::{parse_selection, SelectionInput};
use shared::agent_api::ModelDescriptor;
use std::io::{self, Write};

/// Print `prompt` and read one line. `None` on EOF or read error.
pub async fn read_line(prompt: &str) -> Option<String> {
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || {
        print!("{}", prompt);
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    })
    .await
    .ok()
    .flatten()
}

pub fn render_model_list(models: &[ModelDescriptor]) -> String {
    let mut out = format!("\nAvailable models ({}):", models.len());
    for (i, model) in models.iter().enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, model.display_name));
    }
    out
}

/// Numbered-list picker on stdin/stdout. EOF cancels.
pub struct TerminalPicker;

#[async_trait::async_trait]
impl ModelPicker for TerminalPicker {
    async fn pick(&self, models: &[ModelDescriptor]) -> Option<ModelDescriptor> {
        println!("{}", render_model_list(models));
        let prompt = format!("\nSelect model (1-{}): ", models.len());
        loop {
            let Some(line) = read_line(&prompt).await else {
                println!("\nOperation cancelled");
                return None;
            };
            match parse_selection(&line, models.len()) {
                SelectionInput::Choice(idx) => {
                    let selected = models[idx].clone();
                    println!("Selected model: {}", selected.display_name);
                    return Some(selected);
                }
                SelectionInput::Empty => continue,
                SelectionInput::Invalid(msg) => println!("{}", msg),
            }
        }
    }
}
