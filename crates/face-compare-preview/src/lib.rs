#![warn(missing_docs)]
//! # face-compare-preview
//!
//! ## Purpose
//! Turns an opaque selected file into a displayable [`Preview`].
//!
//! ## Responsibilities
//! - Detect the image format from content, not from the file name.
//! - Fully decode the image so corrupt payloads are caught here.
//! - Emit a deterministic `data:` URI over the original bytes.
//! - Decode base64 face crops returned by the comparison service.
//!
//! ## Data flow
//! [`SelectedFile`] -> [`encode`] (on a worker thread) -> [`Preview`] stored in
//! the controller's slot for that role.
//!
//! ## Ownership and lifetimes
//! The returned preview owns its URI string; nothing borrows from the source
//! file, so the slot may drop the file and preview independently.
//!
//! ## Error model
//! Undecodable input yields [`PreviewError::Decode`]. Callers treat that as
//! "no preview available" and keep the file.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use face_compare_core::{Preview, SelectedFile};
use image::{GenericImageView, ImageFormat};
use thiserror::Error;

/// Encodes one selected file into a preview.
///
/// # Errors
/// Returns [`PreviewError::Empty`] for zero-length payloads and
/// [`PreviewError::Decode`] when the bytes are not a decodable image.
pub fn encode(file: &SelectedFile) -> Result<Preview, PreviewError> {
    encode_bytes(file.bytes())
}

/// Encodes raw image bytes into a preview.
///
/// # Errors
/// See [`encode`].
pub fn encode_bytes(bytes: &[u8]) -> Result<Preview, PreviewError> {
    if bytes.is_empty() {
        return Err(PreviewError::Empty);
    }

    let format =
        image::guess_format(bytes).map_err(|error| PreviewError::Decode(error.to_string()))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|error| PreviewError::Decode(error.to_string()))?;
    let (width, height) = decoded.dimensions();
    let mime_type = mime_for(format);

    Ok(Preview {
        data_uri: data_uri(mime_type, bytes),
        mime_type: mime_type.to_string(),
        width,
        height,
    })
}

/// Decodes a base64 image (as sent for server face crops) into a preview.
///
/// # Errors
/// Returns [`PreviewError::Base64`] for malformed base64 and otherwise the
/// errors of [`encode_bytes`].
pub fn decode_base64_image(encoded: &str) -> Result<Preview, PreviewError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|error| PreviewError::Base64(error.to_string()))?;
    encode_bytes(&bytes)
}

/// Builds a `data:` URI for `bytes` with the given MIME type.
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::WebP => "image/webp",
        other => other.to_mime_type(),
    }
}

/// Preview encoder error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    /// Payload has no bytes.
    #[error("file is empty")]
    Empty,
    /// Payload is not a decodable image.
    #[error("decode error: {0}")]
    Decode(String),
    /// Embedded image string is not valid base64.
    #[error("invalid base64 image: {0}")]
    Base64(String),
}
