//! Reads attachments from disk and turns them into base64 payloads.
//!
//! Image detection is by file extension. `Classification::Sniffed` also
//! checks magic bytes, for callers that do not trust file names.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};

use crate::error::ChatError;

/// Extensions (lowercase, without the dot) sent to the model as inline images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// How a file is decided to be an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Classification {
    /// Extension whitelist only.
    #[default]
    Extension,
    /// Extension whitelist, and the content must look like an image too.
    Sniffed,
}

/// An encoded file, ready to be placed into a message.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub path: PathBuf,
    pub encoded: String,
    pub raw_len: usize,
    pub is_image: bool,
    pub mime_type: String,
}

impl Attachment {
    /// Base name used when the file is referenced in a message.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    /// `data:<mime>;base64,<payload>`
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.encoded)
    }
}

fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

pub fn is_image_path(path: &Path) -> bool {
    extension_lower(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn mime_type_for(path: &Path) -> &'static str {
    match extension_lower(path).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// Image MIME type detected from the leading bytes, restricted to the
/// formats we accept by extension.
fn sniff_image_mime(data: &[u8]) -> Option<&'static str> {
    let kind = infer::get(data)?;
    match kind.mime_type() {
        "image/jpeg" => Some("image/jpeg"),
        "image/png" => Some("image/png"),
        "image/gif" => Some("image/gif"),
        "image/bmp" => Some("image/bmp"),
        "image/webp" => Some("image/webp"),
        _ => None,
    }
}

/// Length of the padded base64 text for `raw_len` input bytes.
pub fn encoded_len(raw_len: u64) -> u64 {
    4 * raw_len.div_ceil(3)
}

/// Size on disk of a regular file, without reading it.
pub fn file_size(path: &Path) -> Result<u64, ChatError> {
    if !path.is_file() {
        return Err(ChatError::NotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| ChatError::Read {
            path: path.to_path_buf(),
            source,
        })
}

pub fn encode_bytes(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Read `path` whole and base64-encode it.
pub fn encode_file(path: &Path) -> Result<Attachment, ChatError> {
    encode_file_with(path, Classification::Extension)
}

pub fn encode_file_with(path: &Path, classification: Classification) -> Result<Attachment, ChatError> {
    if !path.is_file() {
        return Err(ChatError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let data = std::fs::read(path).map_err(|source| ChatError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let by_extension = is_image_path(path);
    let (is_image, mime_type) = match classification {
        Classification::Extension => (by_extension, mime_type_for(path)),
        Classification::Sniffed => match sniff_image_mime(&data) {
            Some(mime) if by_extension => (true, mime),
            _ => (false, DEFAULT_MIME_TYPE),
        },
    };

    Ok(Attachment {
        path: path.to_path_buf(),
        encoded: encode_bytes(&data),
        raw_len: data.len(),
        is_image,
        mime_type: mime_type.to_string(),
    })
}
