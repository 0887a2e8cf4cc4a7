//! Image Inverter
//!
//! The one piece of real image logic in the pane:
//! 1. Decode - base64 text (with or without a `data:` prefix) into an `RgbaImage`
//! 2. Invert - every pixel's R, G and B become `255 - x`, alpha untouched
//! 3. Encode - always PNG, returned as a `data:image/png;base64,...` string
//!
//! The raster buffer only lives for the duration of one call. Nothing is
//! cached or shared between invocations.

use image::{ImageFormat, ImageReader, Limits, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::data_uri::DataUri;
use crate::error::{InvertError, Result};

pub const OUTPUT_MIME: &str = "image/png";

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InverterSettings {
    /// Pixel count at which inversion is split across the rayon pool
    /// (default: 262144, i.e. 512x512)
    pub parallel_threshold: u64,
    /// Largest accepted width or height in pixels (default: 16384)
    pub max_dimension: u32,
}

impl Default for InverterSettings {
    fn default() -> Self {
        Self {
            parallel_threshold: 512 * 512,
            max_dimension: 16_384,
        }
    }
}

/// Result of one inversion
#[derive(Debug, Clone, Serialize)]
pub struct InvertedImage {
    pub width: u32,
    pub height: u32,
    /// Encoded PNG bytes
    #[serde(skip)]
    pub png: Vec<u8>,
    /// Complete `data:image/png;base64,...` string
    pub data_uri: String,
}

impl InvertedImage {
    /// The base64 payload without its `data:` prefix, as host insertion APIs expect it
    pub fn base64_payload(&self) -> &str {
        match self.data_uri.find(',') {
            Some(idx) => &self.data_uri[idx + 1..],
            None => &self.data_uri,
        }
    }
}

// ============================================================================
// PIXEL TRANSFORM
// ============================================================================

#[inline]
fn invert_rgb(px: &mut [u8]) {
    px[0] = 255 - px[0];
    px[1] = 255 - px[1];
    px[2] = 255 - px[2];
}

/// Invert R, G and B of every pixel in place. Alpha and dimensions are unchanged.
pub fn invert_pixels(img: &mut RgbaImage, settings: &InverterSettings) {
    let pixel_count = img.width() as u64 * img.height() as u64;

    if pixel_count >= settings.parallel_threshold {
        img.par_chunks_exact_mut(4).for_each(invert_rgb);
    } else {
        for pixel in img.pixels_mut() {
            invert_rgb(&mut pixel.0);
        }
    }
}

// ============================================================================
// DECODE / ENCODE
// ============================================================================

/// Decode image bytes into an RGBA buffer.
///
/// The format is sniffed from the magic bytes first; `declared_mime` is only
/// consulted when sniffing finds nothing.
pub fn decode_image(
    bytes: &[u8],
    declared_mime: &str,
    settings: &InverterSettings,
) -> Result<RgbaImage> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| InvertError::Decode(format!("Failed to read image header: {}", e)))?;

    if reader.format().is_none() {
        match ImageFormat::from_mime_type(declared_mime) {
            Some(format) => reader.set_format(format),
            None => {
                return Err(InvertError::Decode(format!(
                    "Unrecognized image data (declared as {})",
                    declared_mime
                )))
            }
        }
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(settings.max_dimension);
    limits.max_image_height = Some(settings.max_dimension);
    reader.limits(limits);

    let img = reader
        .decode()
        .map_err(|e| InvertError::Decode(format!("Failed to decode image: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    if width == 0 || height == 0 {
        return Err(InvertError::Decode("Image has no pixels".to_string()));
    }
    if width > settings.max_dimension || height > settings.max_dimension {
        return Err(InvertError::Decode(format!(
            "Image {}x{} exceeds the {} pixel limit",
            width, height, settings.max_dimension
        )));
    }

    Ok(rgba)
}

/// Encode image as PNG bytes
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| InvertError::Encode(format!("Failed to encode PNG: {}", e)))?;
    Ok(buffer.into_inner())
}

// ============================================================================
// INVERSION ENTRY POINTS
// ============================================================================

/// Decode, invert and re-encode raw image bytes
pub fn invert_bytes(
    bytes: &[u8],
    declared_mime: &str,
    settings: &InverterSettings,
) -> Result<InvertedImage> {
    let mut rgba = decode_image(bytes, declared_mime, settings)?;
    let (width, height) = rgba.dimensions();
    log::debug!("decoded {}x{} image ({} input bytes)", width, height, bytes.len());

    invert_pixels(&mut rgba, settings);

    let png = encode_png(&rgba)?;
    let data_uri = DataUri::from_bytes(OUTPUT_MIME, &png).to_string();
    log::debug!("encoded inverted image as {} PNG bytes", png.len());

    Ok(InvertedImage {
        width,
        height,
        png,
        data_uri,
    })
}

/// Invert a base64 image string, returning the full result
pub fn invert_with(input: &str, settings: &InverterSettings) -> Result<InvertedImage> {
    if !DataUri::has_prefix(input) {
        log::debug!("input has no data: prefix, assuming {}", crate::data_uri::DEFAULT_MIME);
    }
    let uri = DataUri::parse(input);
    let bytes = uri.decode_payload()?;
    invert_bytes(&bytes, &uri.mime, settings)
}

/// Invert a base64 image string (data URI or bare payload) into a PNG data URI
pub fn invert(input: &str) -> Result<String> {
    invert_with(input, &InverterSettings::default()).map(|img| img.data_uri)
}

/// Same as [`invert_with`], but runs decode/invert/encode on the blocking pool
pub async fn invert_async(input: String, settings: InverterSettings) -> Result<InvertedImage> {
    tokio::task::spawn_blocking(move || invert_with(&input, &settings))
        .await
        .map_err(|e| InvertError::Processing(format!("Task join error: {}", e)))?
}

// ============================================================================
// TESTS
// ============================================================================
