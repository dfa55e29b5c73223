//! Agent Host - the chat session controller
//!
//! Owns the selected model and the pending attachments, and turns one user
//! turn into one completion request:
//! - builds the message (text first, then attachments in order)
//! - sends it to the configured server with the selected model
//! - hands back the reply text or a typed error

pub mod picker;
pub mod session;

pub use picker::ModelPicker;
pub use session::{ChatSession, ModelChoice};
