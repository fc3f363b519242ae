#![warn(missing_docs)]
//! # face-compare-acquire
//!
//! ## Purpose
//! Provides the file acquisition abstraction that feeds the before/after
//! slots.
//!
//! ## Responsibilities
//! - Define a source-agnostic picking trait.
//! - Read local files with name, size, and MIME metadata.
//! - Expose an in-memory source for tests and scripted sessions.
//!
//! ## Data flow
//! Shell command or picker -> [`FileSource::pick`] -> [`SelectedFile`] handed
//! to the session controller.
//!
//! ## Error model
//! Missing or unreadable sources are reported as [`AcquireError`]. Format and
//! size checks are left to the comparison service.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use face_compare_core::{Role, SelectedFile};
use thiserror::Error;
use tracing::debug;

/// MIME type used when the extension is not a known image type.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Trait implemented by concrete file providers.
pub trait FileSource: Send + Sync {
    /// Picks one file for `role` identified by `locator`.
    ///
    /// # Errors
    /// Returns [`AcquireError::NotFound`] when the locator does not resolve.
    fn pick(&self, role: Role, locator: &str) -> Result<SelectedFile, AcquireError>;
}

/// Reads files from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsFileSource;

impl FsFileSource {
    /// Creates a filesystem source.
    pub fn new() -> Self {
        Self
    }
}

impl FileSource for FsFileSource {
    fn pick(&self, role: Role, locator: &str) -> Result<SelectedFile, AcquireError> {
        let path = Path::new(locator.trim());
        if !path.is_file() {
            return Err(AcquireError::NotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path).map_err(|error| AcquireError::Read {
            path: path.display().to_string(),
            reason: error.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = guess_mime_type(&name);

        debug!(
            stage = "acquire",
            action = "picked",
            role = role.as_str(),
            size_bytes = bytes.len(),
            mime_type,
            "file read from disk"
        );

        Ok(SelectedFile::new(role, name, mime_type, bytes))
    }
}

#[derive(Debug, Clone)]
struct StaticEntry {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

/// Deterministic in-memory source for tests and scripted sessions.
#[derive(Debug, Default)]
pub struct StaticFileSource {
    entries: Mutex<HashMap<String, StaticEntry>>,
}

impl StaticFileSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload under `locator`; MIME type is guessed from `name`.
    ///
    /// # Errors
    /// Returns [`AcquireError::Backend`] when the entry lock is poisoned.
    pub fn insert(
        &self,
        locator: impl Into<String>,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<(), AcquireError> {
        let name = name.into();
        let mime_type = guess_mime_type(&name).to_string();
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AcquireError::Backend("static source lock poisoned".to_string()))?;
        entries.insert(
            locator.into(),
            StaticEntry {
                name,
                mime_type,
                bytes: bytes.into(),
            },
        );
        Ok(())
    }
}

impl FileSource for StaticFileSource {
    fn pick(&self, role: Role, locator: &str) -> Result<SelectedFile, AcquireError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AcquireError::Backend("static source lock poisoned".to_string()))?;
        let entry = entries
            .get(locator)
            .ok_or_else(|| AcquireError::NotFound(locator.to_string()))?;

        Ok(SelectedFile::new(
            role,
            entry.name.clone(),
            entry.mime_type.clone(),
            Arc::clone(&entry.bytes),
        ))
    }
}

/// Guesses a MIME type from a file name extension.
pub fn guess_mime_type(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => FALLBACK_MIME_TYPE,
    }
}

/// Acquisition layer error type.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Locator does not point at a readable file.
    #[error("file not found: {0}")]
    NotFound(String),
    /// File exists but could not be read.
    #[error("failed to read '{path}': {reason}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying I/O message.
        reason: String,
    },
    /// Source runtime failure.
    #[error("file source failure: {0}")]
    Backend(String),
}
