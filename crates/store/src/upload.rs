use std::path::Path;

use crate::error::ValidationError;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// An image picked for upload, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Size first, then type.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::ImageTooLarge {
                size: self.bytes.len(),
            });
        }
        if !ACCEPTED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(ValidationError::UnsupportedImageType {
                content_type: self.content_type.clone(),
            });
        }
        Ok(())
    }

    /// Extension of the original file name; the whole name when it has no dot.
    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or(&self.file_name)
    }

    /// Collision-resistant object name: `<unix-ms>-<random>.<ext>`.
    pub fn storage_name(&self, now_ms: i64) -> String {
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!("{now_ms}-{}.{}", &random[..13], self.extension())
    }
}

/// MIME type for a path, judged by extension.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
