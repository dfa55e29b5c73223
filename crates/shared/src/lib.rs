pub mod settings {
    use serde::{Deserialize, Serialize};

    /// Default ceiling for the cumulative base64 size of one request's attachments.
    pub const DEFAULT_MAX_ATTACHMENT_BYTES: usize = 100 * 1024 * 1024;

    fn default_temperature() -> f32 {
        0.7
    }

    fn default_max_tokens() -> u32 {
        131_000
    }

    fn default_timeout_secs() -> u64 {
        3600
    }

    fn default_max_attachment_bytes() -> usize {
        DEFAULT_MAX_ATTACHMENT_BYTES
    }

    /// Connection details for the model server (LM Studio or any
    /// OpenAI-compatible endpoint).
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ServerSettings {
        pub host: String,
        pub port: u16,
        /// Model id to preselect; when absent the user picks from the catalog.
        #[serde(default)]
        pub model: Option<String>,
        /// Static bearer token. `None` or empty means no Authorization header.
        #[serde(default)]
        pub api_key: Option<String>,
        #[serde(default = "default_temperature")]
        pub temperature: f32,
        #[serde(default = "default_max_tokens")]
        pub max_tokens: u32,
        #[serde(default = "default_timeout_secs")]
        pub timeout_secs: u64,
        #[serde(default = "default_max_attachment_bytes")]
        pub max_attachment_bytes: usize,
        /// Check magic bytes before treating a file as an image.
        #[serde(default)]
        pub sniff_content: bool,
    }

    impl ServerSettings {
        pub fn base_url(&self) -> String {
            format!("http://{}:{}", self.host, self.port)
        }

        /// The API key, if one is set and non-empty.
        pub fn bearer_token(&self) -> Option<&str> {
            self.api_key.as_deref().filter(|k| !k.is_empty())
        }
    }

    impl Default for ServerSettings {
        fn default() -> Self {
            Self {
                host: "127.0.0.1".into(),
                port: 1234,
                model: None,
                api_key: None,
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
                timeout_secs: default_timeout_secs(),
                max_attachment_bytes: default_max_attachment_bytes(),
                sniff_content: false,
            }
        }
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct AppSettings {
        #[serde(default)]
        pub server: ServerSettings,
    }
}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    /// One unit of message content. Order inside a message is significant.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum ContentPart {
        Text { text: String },
        /// `url` is a `data:<mime>;base64,<payload>` URL.
        ImageRef { url: String },
        /// Non-image attachment. Only a short prefix of the payload is kept.
        FileRef { filename: String, preview: String },
    }

    impl ContentPart {
        pub fn is_image(&self) -> bool {
            matches!(self, ContentPart::ImageRef { .. })
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: String, // always "user" for now
        pub content: Vec<ContentPart>,
    }

    impl ChatMessage {
        pub fn user(content: Vec<ContentPart>) -> Self {
            Self {
                role: "user".into(),
                content,
            }
        }
    }

    /// A model advertised by the server's `/v1/models` catalog.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ModelDescriptor {
        pub id: String,
        pub display_name: String,
    }
}
