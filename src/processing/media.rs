//! Transient image values that flow through one submission.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::ImageFormat;

use crate::error::{ClassifyError, ClassifyResult};

/// MIME type of every re-encoded upload.
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";
/// Extension appended to every re-encoded file name.
pub const OUTPUT_EXTENSION: &str = "jpg";

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// The image exactly as the user picked it. Immutable once chosen.
///
/// Bytes are reference counted so the value can move onto the blocking pool
/// and stay visible as the preview at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    bytes: Arc<[u8]>,
    file_name: String,
    mime_type: String,
}

impl SourceImage {
    pub fn new(
        bytes: impl Into<Arc<[u8]>>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Read a picked file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> ClassifyResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClassifyError::io("read source image", e)
                .with_path(path.display().to_string())
                .with_recovery_suggestion("Check that the file exists and is readable")
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = guess_mime_type(&file_name);

        Ok(Self::new(bytes, file_name, mime_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the picked file in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type for a file name, based on its extension.
pub fn guess_mime_type(file_name: &str) -> String {
    ImageFormat::from_path(file_name)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MIME_TYPE.to_string())
}

/// Pixel dimensions of a decoded or re-encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub height: u32,
    pub width: u32,
}

impl From<img_scale::presets::Size> for Dimensions {
    fn from(size: img_scale::presets::Size) -> Self {
        Self {
            height: size.h,
            width: size.w,
        }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The downscaled, re-encoded upload. Produced once per submission and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
    pub dimensions: Dimensions,
    pub last_modified: DateTime<Utc>,
}
