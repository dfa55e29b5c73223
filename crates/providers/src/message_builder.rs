//! Assembles the single user message sent with each request.

use serde_json::{json, Value};
use shared::agent_api::{ChatMessage, ContentPart};
use shared::settings::DEFAULT_MAX_ATTACHMENT_BYTES;
use std::path::Path;

use crate::encoder::{encode_file_with, encoded_len, file_size, Attachment, Classification};
use crate::error::ChatError;

/// Number of base64 characters kept for non-image attachments.
pub const FILE_PREVIEW_CHARS: usize = 100;

/// Running total of encoded attachment bytes for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBudget {
    used: usize,
    ceiling: usize,
}

impl SizeBudget {
    pub fn new(ceiling: usize) -> Self {
        Self { used: 0, ceiling }
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Fails if adding `len` bytes would go past the ceiling. Nothing is
    /// recorded.
    pub fn check(&self, len: usize) -> Result<(), ChatError> {
        let total = self.used.saturating_add(len);
        if total > self.ceiling {
            return Err(ChatError::PayloadTooLarge {
                total,
                limit: self.ceiling,
            });
        }
        Ok(())
    }

    /// Add `len` bytes. Fails once the total goes past the ceiling; the
    /// budget is left unchanged in that case.
    pub fn charge(&mut self, len: usize) -> Result<(), ChatError> {
        self.check(len)?;
        self.used += len;
        Ok(())
    }
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTACHMENT_BYTES)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub max_total_bytes: usize,
    pub classification: Classification,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_total_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            classification: Classification::Extension,
        }
    }
}

/// A built message plus the encoded size of its attachments.
#[derive(Debug, Clone)]
pub struct BuiltMessage {
    pub message: ChatMessage,
    pub encoded_bytes: usize,
}

fn file_preview(encoded: &str) -> String {
    // base64 is ASCII, so byte slicing stays on char boundaries
    let end = encoded.len().min(FILE_PREVIEW_CHARS);
    format!("{}...", &encoded[..end])
}

fn attachment_part(att: &Attachment) -> ContentPart {
    if att.is_image {
        ContentPart::ImageRef { url: att.data_url() }
    } else {
        ContentPart::FileRef {
            filename: att.file_name(),
            preview: file_preview(&att.encoded),
        }
    }
}

/// Encode one file and charge it to `budget`. The projected base64 size is
/// checked against the ceiling before the file is read; the actual size is
/// charged afterwards in case the file changed in between.
pub fn encode_within_budget(
    path: &Path,
    classification: Classification,
    budget: &mut SizeBudget,
) -> Result<Attachment, ChatError> {
    let projected = usize::try_from(encoded_len(file_size(path)?)).unwrap_or(usize::MAX);
    budget.check(projected)?;
    let att = encode_file_with(path, classification)?;
    budget.charge(att.encoded.len())?;
    Ok(att)
}

pub fn build_message<P: AsRef<Path>>(
    user_text: &str,
    paths: &[P],
    options: BuildOptions,
) -> Result<ChatMessage, ChatError> {
    build_message_with_stats(user_text, paths, options).map(|built| built.message)
}

/// Build the message, failing on the first missing file or as soon as the
/// attachments overrun the size ceiling. Nothing partial is returned.
pub fn build_message_with_stats<P: AsRef<Path>>(
    user_text: &str,
    paths: &[P],
    options: BuildOptions,
) -> Result<BuiltMessage, ChatError> {
    let mut content = Vec::with_capacity(paths.len() + 1);
    let mut budget = SizeBudget::new(options.max_total_bytes);

    if !user_text.is_empty() {
        content.push(ContentPart::Text {
            text: user_text.to_string(),
        });
    }

    for path in paths {
        let att = encode_within_budget(path.as_ref(), options.classification, &mut budget)?;
        tracing::debug!(
            path = %att.path.display(),
            raw = att.raw_len,
            encoded = att.encoded.len(),
            image = att.is_image,
            "attached file"
        );
        content.push(attachment_part(&att));
    }

    Ok(BuiltMessage {
        message: ChatMessage::user(content),
        encoded_bytes: budget.used(),
    })
}

/// OpenAI vision-format JSON for one content part.
pub fn part_to_wire(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text { text } => json!({
            "type": "text",
            "text": text
        }),
        ContentPart::ImageRef { url } => json!({
            "type": "image_url",
            "image_url": { "url": url }
        }),
        ContentPart::FileRef { filename, preview } => json!({
            "type": "text",
            "text": format!("File: {}\nContent (base64): {}", filename, preview)
        }),
    }
}

pub fn message_to_wire(message: &ChatMessage) -> Value {
    json!({
        "role": message.role,
        "content": message.content.iter().map(part_to_wire).collect::<Vec<_>>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    fn no_paths() -> Vec<PathBuf> {
        Vec::new()
    }

    #[test]
    fn test_text_only() {
        let built = build_message_with_stats("hello", &no_paths(), BuildOptions::default()).unwrap();
        assert_eq!(built.message.role, "user");
        assert_eq!(
            built.message.content,
            vec![ContentPart::Text {
                text: "hello".into()
            }]
        );
        assert_eq!(built.encoded_bytes, 0);
    }

    #[test]
    fn test_empty_text_no_files() {
        let msg = build_message("", &no_paths(), BuildOptions::default()).unwrap();
        assert!(msg.content.is_empty());
    }

    #[test]
    fn test_long_text_is_not_truncated() {
        let text = "x".repeat(10_000);
        let msg = build_message(&text, &no_paths(), BuildOptions::default()).unwrap();
        assert_eq!(msg.content, vec![ContentPart::Text { text }]);
    }

    #[test]
    fn test_photo_becomes_image_ref() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_file(dir.path(), "photo.png", &vec![7u8; 5000]);

        let msg = build_message("", &[photo], BuildOptions::default()).unwrap();
        assert_eq!(msg.content.len(), 1);
        match &msg.content[0] {
            ContentPart::ImageRef { url } => assert!(url.starts_with("data:image/png;base64,")),
            other => panic!("expected image part, got {:?}", other),
        }
    }

    #[test]
    fn test_notes_become_truncated_file_ref() {
        let dir = tempfile::tempdir().unwrap();
        // 225 raw bytes -> 300 base64 chars
        let notes = write_file(dir.path(), "notes.txt", &vec![b'a'; 225]);

        let built = build_message_with_stats("", &[notes.clone()], BuildOptions::default()).unwrap();
        assert_eq!(built.encoded_bytes, 300);

        let full = crate::encoder::encode_file(&notes).unwrap().encoded;
        match &built.message.content[0] {
            ContentPart::FileRef { filename, preview } => {
                assert_eq!(filename, "notes.txt");
                assert_eq!(preview, &format!("{}...", &full[..100]));
                assert!(!preview.contains(&full));
            }
            other => panic!("expected file part, got {:?}", other),
        }
    }

    #[test]
    fn test_short_file_preview_keeps_all_chars() {
        let dir = tempfile::tempdir().unwrap();
        let tiny = write_file(dir.path(), "a.txt", b"hi");
        let msg = build_message("", &[tiny], BuildOptions::default()).unwrap();
        assert_eq!(
            msg.content[0],
            ContentPart::FileRef {
                filename: "a.txt".into(),
                preview: "aGk=...".into()
            }
        );
    }

    #[test]
    fn test_order_and_kinds_follow_input() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write_file(dir.path(), "b.txt", b"one"),
            write_file(dir.path(), "c.JPG", b"two"),
            write_file(dir.path(), "d.csv", b"three"),
            write_file(dir.path(), "e.webp", b"four"),
        ];

        let msg = build_message("describe these", &paths, BuildOptions::default()).unwrap();
        let kinds: Vec<&str> = msg
            .content
            .iter()
            .map(|p| match p {
                ContentPart::Text { .. } => "text",
                ContentPart::ImageRef { .. } => "image",
                ContentPart::FileRef { .. } => "file",
            })
            .collect();
        assert_eq!(kinds, vec!["text", "file", "image", "file", "image"]);
        match &msg.content[2] {
            ContentPart::ImageRef { url } => assert!(url.starts_with("data:image/jpeg;base64,")),
            other => panic!("expected image part, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_path_fails_without_counting() {
        let dir = tempfile::tempdir().unwrap();
        let ok = write_file(dir.path(), "ok.txt", b"data");
        let missing = dir.path().join("missing.txt");

        let mut budget = SizeBudget::default();
        encode_within_budget(&ok, Classification::Extension, &mut budget).unwrap();
        assert_eq!(budget.used(), 8);
        let err = encode_within_budget(&missing, Classification::Extension, &mut budget).unwrap_err();
        assert!(matches!(err, ChatError::NotFound { .. }));
        assert_eq!(budget.used(), 8);

        let err = build_message("hi", &[ok, missing.clone()], BuildOptions::default()).unwrap_err();
        match err {
            ChatError::NotFound { path } => assert_eq!(path, missing),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_file_rejected_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.bin");
        // sparse: occupies no blocks, so only the size check can be cheap
        let len: u64 = 400 * 1024 * 1024;
        std::fs::File::create(&path).unwrap().set_len(len).unwrap();

        let mut budget = SizeBudget::new(100);
        let err = encode_within_budget(&path, Classification::Extension, &mut budget).unwrap_err();
        match err {
            ChatError::PayloadTooLarge { total, limit } => {
                assert_eq!(limit, 100);
                assert_eq!(total as u64, encoded_len(len));
            }
            other => panic!("expected PayloadTooLarge, got {:?}", other),
        }
        assert_eq!(budget.used(), 0);

        let options = BuildOptions {
            max_total_bytes: 100,
            ..Default::default()
        };
        assert!(matches!(
            build_message("hi", &[path], options),
            Err(ChatError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_over_ceiling_rejects_whole_request() {
        let dir = tempfile::tempdir().unwrap();
        // ten files of 300 base64 chars each against a 2000-byte ceiling
        let paths: Vec<PathBuf> = (0..10)
            .map(|i| write_file(dir.path(), &format!("f{}.bin", i), &vec![0u8; 225]))
            .collect();
        let options = BuildOptions {
            max_total_bytes: 2000,
            ..Default::default()
        };

        let err = build_message("too much", &paths, options).unwrap_err();
        match err {
            ChatError::PayloadTooLarge { total, limit } => {
                assert_eq!(limit, 2000);
                // fires on the seventh file, not after all ten
                assert_eq!(total, 2100);
            }
            other => panic!("expected PayloadTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_exactly_at_ceiling_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "f.bin", &vec![0u8; 225]);
        let options = BuildOptions {
            max_total_bytes: 300,
            ..Default::default()
        };
        let built = build_message_with_stats("", &[path], options).unwrap();
        assert_eq!(built.encoded_bytes, 300);
    }

    #[test]
    fn test_budget_measures_encoded_not_raw() {
        let mut budget = SizeBudget::new(10);
        budget.check(10).unwrap();
        assert_eq!(budget.used(), 0);
        budget.charge(8).unwrap();
        assert!(budget.charge(3).is_err());
        assert_eq!(budget.used(), 8);
        budget.charge(2).unwrap();
        assert_eq!(budget.used(), 10);
        assert_eq!(SizeBudget::default().ceiling(), 100 * 1024 * 1024);
    }

    #[test]
    fn test_wire_format() {
        let msg = ChatMessage::user(vec![
            ContentPart::Text { text: "hi".into() },
            ContentPart::ImageRef {
                url: "data:image/png;base64,AAAA".into(),
            },
            ContentPart::FileRef {
                filename: "n.txt".into(),
                preview: "YWJj...".into(),
            },
        ]);
        let wire = message_to_wire(&msg);
        assert_eq!(wire["role"], "user");
        assert_eq!(wire["content"][0], json!({"type": "text", "text": "hi"}));
        assert_eq!(
            wire["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
        assert_eq!(wire["content"][2]["type"], "text");
        assert_eq!(
            wire["content"][2]["text"],
            "File: n.txt\nContent (base64): YWJj..."
        );
    }
}
