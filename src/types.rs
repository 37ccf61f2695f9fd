//! Core data types for VisionFlow
//!
//! # Main Types
//!
//! - [`MediaKind`] - Whether an asset or output is a still image or a video
//! - [`Asset`] - An uploaded file (or captured frame) ready to be submitted
//! - [`Frame`] - A raw RGBA webcam frame
//!
//! Only PNG/JPEG images and MP4 videos are accepted as uploads
//! ([`SUPPORTED_MIME_TYPES`]).

use crate::error::{Result, ResultExt, UserInputError, VisionFlowError};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

/// MIME types accepted by the upload area
pub const SUPPORTED_MIME_TYPES: &[&str] = &["image/png", "image/jpeg", "video/mp4"];

/// Name given to assets built from webcam frames
pub const WEBCAM_SOURCE_NAME: &str = "webcam-stream";

/// Whether an asset or output is a still image or a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a MIME type. Anything mentioning "image" or "video" counts.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("image") {
            Some(MediaKind::Image)
        } else if mime.contains("video") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Extension used when exporting an output that has no original name
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// File extension for a supported MIME type
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime.to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "video/mp4" => Some("mp4"),
        _ => None,
    }
}

/// Guess a MIME type from a file extension
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// A file ready to be submitted for processing
#[derive(Clone, PartialEq, Eq)]
pub struct Asset {
    name: String,
    mime: String,
    media: MediaKind,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("media", &self.media)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Asset {
    /// Create an asset, rejecting unsupported MIME types
    pub fn new(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> std::result::Result<Self, UserInputError> {
        let name = name.into();
        let mime = mime.into();
        if !SUPPORTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(UserInputError::UnsupportedMedia { name, mime });
        }
        let media = MediaKind::from_mime(&mime).ok_or_else(|| UserInputError::UnsupportedMedia {
            name: name.clone(),
            mime: mime.clone(),
        })?;
        Ok(Self {
            name,
            mime,
            media,
            bytes,
        })
    }

    /// Load an asset from disk, inferring its MIME type from the extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_for_path(path);
        if !SUPPORTED_MIME_TYPES.contains(&mime) {
            return Err(UserInputError::UnsupportedMedia {
                name,
                mime: mime.to_string(),
            }
            .into());
        }
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read asset {:?}", path))?;
        Ok(Self::new(name, mime, bytes)?)
    }

    /// Encode a webcam frame as a PNG asset named [`WEBCAM_SOURCE_NAME`]
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or_else(|| {
                VisionFlowError::Serialization(format!(
                    "frame buffer of {} bytes does not match {}x{}",
                    frame.data.len(),
                    frame.width,
                    frame.height
                ))
            })?;
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| VisionFlowError::Serialization(e.to_string()))?;
        Ok(Self::new(WEBCAM_SOURCE_NAME, "image/png", png.into_inner())?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn media(&self) -> MediaKind {
        self.media
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A raw RGBA frame captured from a camera
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({}x{}, {} bytes)", self.width, self.height, self.data.len())
    }
}

impl Frame {
    /// A frame filled with a single RGBA colour
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }
}
