//! Image sources and sinks
//!
//! Every way an image reaches the pane (paste, drop, host selection) and every
//! way a result leaves it (clipboard, host selection, file) is modelled here,
//! so the inverter itself only ever sees a base64 string.
//!
//! Sets with several candidates always resolve to the first image found.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::data_uri::DataUri;
use crate::error::{InvertError, Result};
use crate::inverter::{InvertedImage, OUTPUT_MIME};

// ============================================================================
// KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Clipboard,
    Drop,
    HostSelection,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Clipboard => "clipboard",
            SourceKind::Drop => "drop",
            SourceKind::HostSelection => "host selection",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    Clipboard,
    HostSelection,
    File,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinkKind::Clipboard => "clipboard",
            SinkKind::HostSelection => "host selection",
            SinkKind::File => "file",
        };
        f.write_str(name)
    }
}

// ============================================================================
// SOURCES
// ============================================================================

/// One typed entry of a clipboard or drag-and-drop data set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferItem {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl TransferItem {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.to_ascii_lowercase().starts_with("image")
    }
}

/// First image-typed item in a transfer set
pub fn first_image(items: &[TransferItem]) -> Option<&TransferItem> {
    items.iter().find(|item| item.is_image())
}

/// Image bytes ready for the inverter
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub kind: SourceKind,
    /// Declared media type, if the source knew one
    pub mime: Option<String>,
    /// Data URI or bare base64 payload
    pub input: String,
}

#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Items pasted from the clipboard
    Clipboard(Vec<TransferItem>),
    /// Files dropped onto the pane
    Drop(Vec<PathBuf>),
    /// Base64 picture returned by the host's selection API (usually without prefix)
    HostSelection(String),
}

impl ImageSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ImageSource::Clipboard(_) => SourceKind::Clipboard,
            ImageSource::Drop(_) => SourceKind::Drop,
            ImageSource::HostSelection(_) => SourceKind::HostSelection,
        }
    }

    /// Pick the image out of this source
    pub fn load(&self) -> Result<SourceImage> {
        let kind = self.kind();
        match self {
            ImageSource::Clipboard(items) => {
                let item = first_image(items).ok_or_else(|| {
                    InvertError::NoImage(format!(
                        "{} items on the clipboard, none is an image",
                        items.len()
                    ))
                })?;
                Ok(SourceImage {
                    kind,
                    mime: Some(item.mime.clone()),
                    input: DataUri::from_bytes(&item.mime, &item.bytes).to_string(),
                })
            }
            ImageSource::Drop(paths) => {
                let (path, format) = paths
                    .iter()
                    .find_map(|p| ImageFormat::from_path(p).ok().map(|f| (p, f)))
                    .ok_or_else(|| {
                        InvertError::NoImage(format!(
                            "{} dropped files, none is an image",
                            paths.len()
                        ))
                    })?;
                let bytes = fs::read(path)?;
                let mime = format.to_mime_type();
                log::debug!("dropped file {} read as {}", path.display(), mime);
                Ok(SourceImage {
                    kind,
                    mime: Some(mime.to_string()),
                    input: DataUri::from_bytes(mime, &bytes).to_string(),
                })
            }
            ImageSource::HostSelection(base64) => {
                if base64.trim().is_empty() {
                    return Err(InvertError::NoImage("selection holds no picture".to_string()));
                }
                Ok(SourceImage {
                    kind,
                    mime: None,
                    input: base64.clone(),
                })
            }
        }
    }

    /// [`ImageSource::load`] on the blocking pool; dropped files are read from disk
    pub async fn load_async(self) -> Result<SourceImage> {
        tokio::task::spawn_blocking(move || self.load())
            .await
            .map_err(|e| InvertError::Processing(format!("Task join error: {}", e)))?
    }
}

// ============================================================================
// SINKS
// ============================================================================

// Awaited in place by the pane, never spawned onto another task
#[allow(async_fn_in_trait)]
pub trait ImageSink {
    fn kind(&self) -> SinkKind;
    async fn deliver(&mut self, image: &InvertedImage) -> Result<()>;
}

/// In-memory clipboard; each delivery replaces the previous contents
#[derive(Debug, Default)]
pub struct ClipboardSink {
    items: Vec<TransferItem>,
}

impl ClipboardSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[TransferItem] {
        &self.items
    }
}

impl ImageSink for ClipboardSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Clipboard
    }

    async fn deliver(&mut self, image: &InvertedImage) -> Result<()> {
        self.items = vec![TransferItem::new(OUTPUT_MIME, image.png.clone())];
        Ok(())
    }
}

/// Writes the bare base64 payload, the form host picture-insertion calls take
pub struct HostSelectionSink<W: Write> {
    writer: W,
}

impl<W: Write> HostSelectionSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ImageSink for HostSelectionSink<W> {
    fn kind(&self) -> SinkKind {
        SinkKind::HostSelection
    }

    async fn deliver(&mut self, image: &InvertedImage) -> Result<()> {
        self.writer.write_all(image.base64_payload().as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSink for FileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    async fn deliver(&mut self, image: &InvertedImage) -> Result<()> {
        // Ensure output directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, &image.png).await?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
