//! Model catalog: `GET {base}/v1/models`.

use serde::Deserialize;
use shared::agent_api::ModelDescriptor;
use std::time::Duration;

use crate::SHARED_HTTP;

const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    id: Option<String>,
}

impl From<ModelEntry> for ModelDescriptor {
    fn from(entry: ModelEntry) -> Self {
        let id = entry.id.unwrap_or_default();
        let display_name = if id.is_empty() {
            "Unknown".to_string()
        } else {
            id.clone()
        };
        ModelDescriptor { id, display_name }
    }
}

pub struct ModelCatalogClient {
    base_url: String,
    api_key: Option<String>,
}

impl ModelCatalogClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(str::to_string),
        }
    }

    /// Models offered by the server. Any failure is logged and yields an
    /// empty list.
    pub async fn list_models(&self) -> Vec<ModelDescriptor> {
        match self.fetch().await {
            Ok(models) => models,
            Err(e) => {
                tracing::warn!("Error fetching models: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<ModelDescriptor>, reqwest::Error> {
        let url = format!("{}/v1/models", self.base_url);
        let mut req = SHARED_HTTP.get(&url).timeout(CATALOG_TIMEOUT);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }
        let resp = req.send().await?.error_for_status()?;
        let body: ModelsResponse = resp.json().await?;
        Ok(body.data.into_iter().map(ModelDescriptor::from).collect())
    }
}

/// Result of reading one answer to the "Select model (1-N)" prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionInput {
    /// Zero-based index into the candidate list.
    Choice(usize),
    /// Blank line, ask again silently.
    Empty,
    /// Ask again after showing the message.
    Invalid(String),
}

pub fn parse_selection(input: &str, count: usize) -> SelectionInput {
    let input = input.trim();
    if input.is_empty() {
        return SelectionInput::Empty;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => SelectionInput::Choice(n - 1),
        Ok(_) => SelectionInput::Invalid(format!("Please enter a number between 1 and {}", count)),
        Err(_) => SelectionInput::Invalid("Please enter a valid number".to_string()),
    }
}
