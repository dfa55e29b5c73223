//! Parsing of what the user types at the `> ` prompt.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/models` - list the catalog and change model
    Models,
    /// `/model` - show the current model
    Model,
    /// `/exit`
    Exit,
    /// Anything else is sent to the model.
    Message(String),
    Empty,
}

pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::Empty;
    }
    match input.to_lowercase().as_str() {
        "/models" => Command::Models,
        "/model" => Command::Model,
        "/exit" => Command::Exit,
        _ => Command::Message(input.to_string()),
    }
}

/// Split the "Files (comma separated ...)" answer into paths.
pub fn parse_attachment_paths(input: &str) -> Vec<PathBuf> {
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

pub const HELP: &str = "Commands:
  /models - Show available models and change
  /model  - Show current model
  /exit   - Exit program
  Ctrl+D  - Exit program (cancels model selection)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_case_insensitive() {
        assert_eq!(parse_command("/MODELS"), Command::Models);
        assert_eq!(parse_command(" /model "), Command::Model);
        assert_eq!(parse_command("/Exit"), Command::Exit);
        assert_eq!(parse_command("   "), Command::Empty);
    }

    #[test]
    fn test_other_input_is_message() {
        assert_eq!(
            parse_command("  what is /model? "),
            Command::Message("what is /model?".into())
        );
        assert_eq!(parse_command("/help"), Command::Message("/help".into()));
    }

    #[test]
    fn test_help_lists_supported_exits() {
        for cmd in ["/models", "/model", "/exit", "Ctrl+D"] {
            assert!(HELP.contains(cmd), "missing {}", cmd);
        }
        // SIGINT is not intercepted, so it must not be advertised as a command
        assert!(!HELP.contains("Ctrl+C"));
    }

    #[test]
    fn test_attachment_paths() {
        assert_eq!(
            parse_attachment_paths(" /tmp/a.png , ,/home/me/notes.txt,"),
            vec![PathBuf::from("/tmp/a.png"), PathBuf::from("/home/me/notes.txt")]
        );
        assert!(parse_attachment_paths("").is_empty());
    }
}
