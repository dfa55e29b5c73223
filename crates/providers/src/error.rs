use std::path::PathBuf;

/// Failures of one send attempt. None of them end the chat session.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Could not read file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Total encoded payload too large ({total} > {limit} bytes). Reduce files or size.")]
    PayloadTooLarge { total: usize, limit: usize },

    #[error("No model selected. Please select a model first.")]
    NoModelSelected,

    #[error("server returned {status}{}", body_suffix(.body))]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Reply JSON without `choices[0].message.content`. Recovered inside
    /// the completion client and never returned to callers.
    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),
}

fn body_suffix(body: &str) -> String {
    if body.trim().is_empty() {
        String::new()
    } else {
        format!("\n{}", body)
    }
}

impl ChatError {
    /// Connection failures, timeouts and non-2xx statuses.
    pub fn is_network(&self) -> bool {
        matches!(self, ChatError::Http { .. } | ChatError::Transport(_))
    }
}
