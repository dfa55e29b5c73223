use shared::agent_api::ModelDescriptor;

/// Chooses one model out of the catalog. Implemented by whatever surface
/// talks to the user (terminal prompt, GUI list, ...).
#[async_trait::async_trait]
pub trait ModelPicker: Send + Sync {
    /// `None` means the user cancelled.
    async fn pick(&self, models: &[ModelDescriptor]) -> Option<ModelDescriptor>;
}
