//! Client side of an OpenAI-compatible chat server: attachment encoding,
//! message assembly under a size ceiling, the model catalog and the
//! completion call.

pub mod catalog;
pub mod completion;
pub mod encoder;
pub mod error;
pub mod message_builder;

pub use catalog::{parse_selection, ModelCatalogClient, SelectionInput};
pub use completion::{CompletionClient, CompletionParams};
pub use encoder::{encode_file, Attachment, Classification};
pub use error::ChatError;
pub use message_builder::{
    build_message, build_message_with_stats, encode_within_budget, BuildOptions, SizeBudget,
};

use reqwest::Client;
use std::sync::LazyLock;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});
