#![warn(missing_docs)]
//! # face-compare-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `face-compare` workspace and
//! the verdict rule that turns a service confidence into a binary label.
//!
//! ## Responsibilities
//! - Represent the two image roles and the files selected for them.
//! - Represent previews, submission phases, results, and categorized errors.
//! - Apply the fixed match threshold and format confidence for display.
//!
//! ## Data flow
//! File acquisition builds [`SelectedFile`] values, the preview encoder derives
//! [`Preview`] values, the comparison client yields a [`ScoreReport`], and the
//! session controller turns that report into a [`ComparisonResult`] via
//! [`interpret`].
//!
//! ## Ownership and lifetimes
//! File payloads are held behind `Arc<[u8]>` so workers can encode previews or
//! build request bodies without copying or borrowing controller state.
//!
//! ## Error model
//! [`ComparisonError`] is a stored domain value, not a propagated error: it is
//! what the user sees after a failed attempt. [`CoreError`] covers parsing of
//! user-supplied role names.
//!
//! ## Security and privacy notes
//! `Debug` output for files and previews reports sizes only, never bytes.
//!
//! ## Example
//! ```rust
//! use face_compare_core::{ComparisonResult, Verdict, format_confidence, interpret};
//!
//! assert!(interpret(0.45));
//! assert!(!interpret(0.449999));
//! assert_eq!(format_confidence(0.8), "80.00%");
//! assert_eq!(ComparisonResult::from_confidence(0.1).verdict(), Verdict::DifferentPeople);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive lower bound at which a confidence counts as a match.
pub const MATCH_THRESHOLD: f64 = 0.45;

/// Validation message shown when submit is requested with an empty slot.
pub const MISSING_FILES_MESSAGE: &str = "Please upload both before and after images";

/// Fallback message for server failures without a readable `error` field.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Which of the two image slots a file occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Image taken before the change.
    Before,
    /// Image taken after the change.
    After,
}

impl Role {
    /// Lowercase role name.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Before => "before",
            Role::After => "after",
        }
    }

    /// Multipart field name the comparison endpoint expects for this role.
    pub fn form_field(self) -> &'static str {
        match self {
            Role::Before => "before_image",
            Role::After => "after_image",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(Role::Before),
            "after" => Ok(Role::After),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// One user-picked file bound to a role.
///
/// The payload is opaque: no format checks happen client-side.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    role: Role,
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl SelectedFile {
    /// Wraps a picked payload with its display metadata.
    pub fn new(
        role: Role,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            role,
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Rebinds the file to another slot.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Slot this file was picked for.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Original file name, forwarded as the multipart `filename`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type reported by the acquisition layer.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("role", &self.role)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Renderable representation of a selected file.
#[derive(Clone, PartialEq, Eq)]
pub struct Preview {
    /// `data:` URI carrying the original bytes.
    pub data_uri: String,
    /// MIME type of the decoded image.
    pub mime_type: String,
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
}

impl fmt::Debug for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preview")
            .field("mime_type", &self.mime_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("data_uri_len", &self.data_uri.len())
            .finish()
    }
}

/// Lifecycle phase of the submission controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    /// Initial state, and the state after reset.
    Idle,
    /// One comparison request is in flight.
    Submitting,
    /// The last request produced a result.
    Succeeded,
    /// The last request produced an error.
    Failed,
}

impl SubmissionPhase {
    /// Returns `true` for the two result-display states.
    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionPhase::Succeeded | SubmissionPhase::Failed)
    }

    /// Lowercase phase name.
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Submitting => "submitting",
            SubmissionPhase::Succeeded => "succeeded",
            SubmissionPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error taxonomy surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Local precondition failed; no request was sent.
    Validation,
    /// Endpoint answered with a non-success status.
    Server,
    /// No complete round trip happened.
    Network,
    /// Success status but the body was not interpretable.
    Unknown,
}

impl ErrorCategory {
    /// Lowercase category name.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Server => "server",
            ErrorCategory::Network => "network",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Structured reason the server may attach to a failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerErrorCode {
    /// Upload extension or content is not an allowed image format.
    InvalidFileFormat,
    /// Upload exceeds the server size ceiling.
    FileTooLarge,
    /// One or both multipart parts were missing.
    MissingImages,
    /// No face was found in one of the images.
    NoFaceDetected,
    /// Server-side image processing failed.
    ProcessingFailed,
    /// Recognition model is not loaded on the server.
    ModelUnavailable,
    /// Code not known to this client; kept for forward compatibility.
    Other(String),
}

impl ServerErrorCode {
    /// Maps a wire code to a typed value.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim() {
            "invalid_file_format" => ServerErrorCode::InvalidFileFormat,
            "file_too_large" => ServerErrorCode::FileTooLarge,
            "missing_images" => ServerErrorCode::MissingImages,
            "no_face_detected" => ServerErrorCode::NoFaceDetected,
            "processing_failed" => ServerErrorCode::ProcessingFailed,
            "model_unavailable" => ServerErrorCode::ModelUnavailable,
            other => ServerErrorCode::Other(other.to_string()),
        }
    }
}

/// Failure stored by the controller for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{category} error: {message}")]
pub struct ComparisonError {
    /// Message shown verbatim to the user.
    pub message: String,
    /// Taxonomy bucket.
    pub category: ErrorCategory,
    /// Structured server code, when the server sent one.
    pub code: Option<ServerErrorCode>,
    /// HTTP status, when a response was received.
    pub http_status: Option<u16>,
}

impl ComparisonError {
    /// Local precondition failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: ErrorCategory::Validation,
            code: None,
            http_status: None,
        }
    }

    /// Non-success response from the endpoint.
    pub fn server(status: u16, message: impl Into<String>, code: Option<ServerErrorCode>) -> Self {
        Self {
            message: message.into(),
            category: ErrorCategory::Server,
            code,
            http_status: Some(status),
        }
    }

    /// Request never completed a round trip.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: ErrorCategory::Network,
            code: None,
            http_status: None,
        }
    }

    /// Success status with an uninterpretable body.
    pub fn unknown(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: ErrorCategory::Unknown,
            code: None,
            http_status: Some(status),
        }
    }
}

/// Face crops the server may return alongside a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFaces {
    /// Cropped face from the before image.
    pub before: Preview,
    /// Cropped face from the after image.
    pub after: Preview,
}

/// Parsed success payload handed from the client to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    /// Raw confidence in `[0, 1]`.
    pub confidence: f64,
    /// Server's own same-person flag, if sent.
    pub server_verdict: Option<bool>,
    /// Server face crops, if sent and decodable.
    pub processed_faces: Option<ProcessedFaces>,
}

impl ScoreReport {
    /// Report carrying only a confidence.
    pub fn from_confidence(confidence: f64) -> Self {
        Self {
            confidence,
            server_verdict: None,
            processed_faces: None,
        }
    }
}

/// Single resolution of one comparison attempt.
pub type ComparisonOutcome = Result<ScoreReport, ComparisonError>;

/// Result shown after a successful comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Confidence exactly as reported.
    pub raw_confidence: f64,
    /// Client-side verdict from [`interpret`].
    pub matched: bool,
    /// Server's own flag, kept only to detect threshold divergence.
    pub server_verdict: Option<bool>,
    /// Server face crops, if any.
    pub processed_faces: Option<ProcessedFaces>,
}

impl ComparisonResult {
    /// Builds a result from a bare confidence.
    pub fn from_confidence(raw_confidence: f64) -> Self {
        Self::from_report(ScoreReport::from_confidence(raw_confidence))
    }

    /// Routes a score report through the verdict rule.
    pub fn from_report(report: ScoreReport) -> Self {
        Self {
            raw_confidence: report.confidence,
            matched: interpret(report.confidence),
            server_verdict: report.server_verdict,
            processed_faces: report.processed_faces,
        }
    }

    /// Binary verdict label.
    pub fn verdict(&self) -> Verdict {
        Verdict::from_matched(self.matched)
    }

    /// `true` when the server's own flag disagrees with the client verdict.
    pub fn verdict_diverges(&self) -> bool {
        self.server_verdict
            .is_some_and(|server_matched| server_matched != self.matched)
    }

    /// Confidence rendered as a percentage with two decimals.
    pub fn confidence_text(&self) -> String {
        format_confidence(self.raw_confidence)
    }
}

/// Binary label shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Confidence reached the threshold.
    SamePerson,
    /// Confidence stayed below the threshold.
    DifferentPeople,
}

impl Verdict {
    /// Maps the boolean verdict to a label.
    pub fn from_matched(matched: bool) -> Self {
        if matched {
            Verdict::SamePerson
        } else {
            Verdict::DifferentPeople
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::SamePerson => "Same Person",
            Verdict::DifferentPeople => "Different People",
        }
    }
}

/// Applies the fixed match threshold. Role order does not matter.
pub fn interpret(raw_confidence: f64) -> bool {
    raw_confidence >= MATCH_THRESHOLD
}

/// Returns `true` for finite confidences inside `[0, 1]`.
pub fn is_valid_confidence(raw_confidence: f64) -> bool {
    raw_confidence.is_finite() && (0.0..=1.0).contains(&raw_confidence)
}

/// Formats a confidence as `NN.NN%`.
pub fn format_confidence(raw_confidence: f64) -> String {
    format!("{:.2}%", raw_confidence * 100.0)
}

/// Error type for core parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Role name is neither `before` nor `after`.
    #[error("unknown role '{0}', expected 'before' or 'after'")]
    UnknownRole(String),
}
