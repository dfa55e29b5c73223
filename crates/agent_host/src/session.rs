use providers::{
    build_message_with_stats, BuildOptions, ChatError, Classification, CompletionClient,
    CompletionParams, ModelCatalogClient,
};
use shared::agent_api::ModelDescriptor;
use shared::settings::ServerSettings;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::picker::ModelPicker;

/// Outcome of an interactive model change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    Selected(String),
    Cancelled,
    /// The catalog was empty or unreachable.
    Unavailable,
}

/// One user's conversation with the model server.
///
/// Every turn is sent on its own; no history is carried between requests.
pub struct ChatSession {
    settings: ServerSettings,
    catalog: ModelCatalogClient,
    completion: CompletionClient,
    selected_model: Option<String>,
    pending: Vec<PathBuf>,
}

impl ChatSession {
    /// Create a session. A model named in the settings is preselected.
    pub fn new(settings: ServerSettings) -> Self {
        let base = settings.base_url();
        let catalog = ModelCatalogClient::new(&base, settings.bearer_token());
        let completion = CompletionClient::new(&base, settings.bearer_token());
        let selected_model = settings.model.clone().filter(|m| !m.trim().is_empty());
        Self {
            settings,
            catalog,
            completion,
            selected_model,
            pending: Vec::new(),
        }
    }

    pub fn current_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    /// Make `id` the model for subsequent requests. Blank ids are ignored.
    pub fn select_model(&mut self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() {
            return false;
        }
        tracing::info!(model = id, "model selected");
        self.selected_model = Some(id.to_string());
        true
    }

    pub async fn list_models(&self) -> Vec<ModelDescriptor> {
        self.catalog.list_models().await
    }

    /// Fetch the catalog and let `picker` choose. The current model is kept
    /// unless a model is actually selected.
    pub async fn choose_model(&mut self, picker: &dyn ModelPicker) -> ModelChoice {
        let models = self.list_models().await;
        if models.is_empty() {
            return ModelChoice::Unavailable;
        }
        match picker.pick(&models).await {
            Some(chosen) if self.select_model(&chosen.id) => ModelChoice::Selected(chosen.id),
            _ => ModelChoice::Cancelled,
        }
    }

    fn build_options(&self) -> BuildOptions {
        BuildOptions {
            max_total_bytes: self.settings.max_attachment_bytes,
            classification: if self.settings.sniff_content {
                Classification::Sniffed
            } else {
                Classification::Extension
            },
        }
    }

    fn completion_params(&self) -> CompletionParams {
        CompletionParams {
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            timeout: Duration::from_secs(self.settings.timeout_secs),
        }
    }

    /// Send `text` with `attachments` to the selected model and return the
    /// reply.
    pub async fn ask<P: AsRef<Path>>(
        &self,
        text: &str,
        attachments: &[P],
    ) -> Result<String, ChatError> {
        let model = self.selected_model.as_deref().ok_or(ChatError::NoModelSelected)?;
        let built = build_message_with_stats(text, attachments, self.build_options())?;
        tracing::debug!(
            model,
            parts = built.message.content.len(),
            encoded_bytes = built.encoded_bytes,
            "message built"
        );
        self.completion
            .complete(&built.message, model, self.completion_params())
            .await
    }

    /// Queue a file for the next `send`. Paths already queued are skipped.
    pub fn attach(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.pending.contains(&path) {
            return false;
        }
        self.pending.push(path);
        true
    }

    pub fn pending_attachments(&self) -> &[PathBuf] {
        &self.pending
    }

    pub fn clear_attachments(&mut self) {
        self.pending.clear();
    }

    /// `ask` with the queued attachments. The queue is emptied whether or
    /// not the request succeeds.
    pub async fn send(&mut self, text: &str) -> Result<String, ChatError> {
        let attachments = std::mem::take(&mut self.pending);
        self.ask(text, &attachments).await
    }
}
