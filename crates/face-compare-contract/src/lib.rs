#![warn(missing_docs)]
//! # face-compare-contract
//!
//! ## Purpose
//! Defines the comparison service wire contract and the client-side mapping
//! of server failures into user guidance.
//!
//! ## Responsibilities
//! - Parse compare success bodies and enforce the `confidence` range.
//! - Parse failure bodies for the human-readable `error` and optional `code`.
//! - Parse health probe bodies.
//! - Translate failures into supplementary guidance hints.
//!
//! ## Data flow
//! Raw response body -> [`parse_compare_response`] or
//! [`parse_failure_body`] -> client classification -> [`guidance_for`] at
//! display time.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs so they outlive the transport buffers.
//!
//! ## Error model
//! Invalid JSON or missing mandatory fields return [`ContractError`]. Failure
//! bodies never error: anything unreadable degrades to the generic message.

use face_compare_core::{ComparisonError, GENERIC_ERROR_MESSAGE, ServerErrorCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Upload formats the service accepts.
pub const ALLOWED_FORMATS: [&str; 4] = ["JPG", "JPEG", "PNG", "WEBP"];

/// Largest upload the service accepts, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

/// Success body of `POST /api/compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    /// Probability in `[0, 1]` that both images show the same person.
    pub confidence: f64,
    /// Server-side label; informational only.
    #[serde(default, deserialize_with = "lenient")]
    pub is_same_person: Option<bool>,
    /// Base64 JPEG of the face cropped from the before image.
    #[serde(default, deserialize_with = "lenient")]
    pub processed_before_image: Option<String>,
    /// Base64 JPEG of the face cropped from the after image.
    #[serde(default, deserialize_with = "lenient")]
    pub processed_after_image: Option<String>,
}

/// Failure body of any endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureBody {
    /// Human-readable message shown verbatim.
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,
    /// Structured reason code, when the server provides one.
    #[serde(default, deserialize_with = "lenient")]
    pub code: Option<String>,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status string, `healthy` when up.
    pub status: String,
    /// Whether the recognition model is loaded.
    #[serde(default)]
    pub model_loaded: bool,
    /// Model type description.
    #[serde(default, deserialize_with = "lenient")]
    pub model_type: Option<String>,
    /// Feature scaler type description.
    #[serde(default, deserialize_with = "lenient")]
    pub scaler_type: Option<String>,
}

impl HealthResponse {
    /// Returns `true` when the service can serve comparisons.
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.model_loaded
    }
}

// Informational fields that fail to match their type are dropped instead of
// failing the whole body.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

/// Parses a compare success body.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON or a missing or
/// non-numeric `confidence`.
/// Returns [`ContractError::InvalidContract`] when `confidence` is outside
/// `[0, 1]`.
pub fn parse_compare_response(raw: &str) -> Result<CompareResponse, ContractError> {
    let parsed: CompareResponse = serde_json::from_str(raw).map_err(ContractError::Decode)?;

    if !face_compare_core::is_valid_confidence(parsed.confidence) {
        return Err(ContractError::InvalidContract(format!(
            "confidence {} is outside [0, 1]",
            parsed.confidence
        )));
    }

    Ok(parsed)
}

/// Parses a failure body, returning `None` when it is not a JSON object of
/// the expected shape.
pub fn parse_failure_body(raw: &str) -> Option<FailureBody> {
    serde_json::from_str(raw).ok()
}

/// Extracts the display message and structured code from a failure body.
///
/// Falls back to the generic message when no `error` string is present.
pub fn failure_message(raw: &str) -> (String, Option<ServerErrorCode>) {
    let Some(body) = parse_failure_body(raw) else {
        return (GENERIC_ERROR_MESSAGE.to_string(), None);
    };

    let code = body.code.as_deref().map(ServerErrorCode::from_wire);
    let message = body
        .error
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
    (message, code)
}

/// Parses a health probe body.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON or missing `status`.
pub fn parse_health_response(raw: &str) -> Result<HealthResponse, ContractError> {
    serde_json::from_str(raw).map_err(ContractError::Decode)
}

/// Supplementary hint displayed under an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guidance {
    /// Lists the accepted upload formats.
    AllowedFormats,
    /// States the upload size ceiling.
    MaxFileSize,
}

impl Guidance {
    /// Display text for the hint.
    pub fn text(self) -> String {
        match self {
            Guidance::AllowedFormats => {
                format!("Allowed formats: {}", ALLOWED_FORMATS.join(", "))
            }
            Guidance::MaxFileSize => {
                format!("Maximum file size: {} MB", MAX_UPLOAD_BYTES / (1024 * 1024))
            }
        }
    }
}

/// Maps an error to guidance hints.
///
/// A known structured code decides on its own. Without one, the message is
/// matched against the phrases the service uses for its validation failures
/// (`"file format"`, `"File size"`); this is the only place that inspects
/// message text.
pub fn guidance_for(error: &ComparisonError) -> Vec<Guidance> {
    match &error.code {
        Some(ServerErrorCode::InvalidFileFormat) => return vec![Guidance::AllowedFormats],
        Some(ServerErrorCode::FileTooLarge) => return vec![Guidance::MaxFileSize],
        Some(ServerErrorCode::Other(_)) | None => {}
        Some(_) => return Vec::new(),
    }

    let mut hints = Vec::new();
    if error.message.contains("file format") {
        hints.push(Guidance::AllowedFormats);
    }
    if error.message.contains("File size") {
        hints.push(Guidance::MaxFileSize);
    }
    hints
}

/// Contract errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// JSON decode failure.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload violates contract invariants.
    #[error("response contract violation: {0}")]
    InvalidContract(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_confidence_outside_unit_interval() {
        assert!(parse_compare_response(r#"{"confidence":0.3}"#).is_ok());
        assert!(matches!(
            parse_compare_response(r#"{"confidence":1.5}"#),
            Err(ContractError::InvalidContract(_))
        ));
        assert!(matches!(
            parse_compare_response(r#"{"confidence":"high"}"#),
            Err(ContractError::Decode(_))
        ));
        assert!(matches!(
            parse_compare_response("<html>"),
            Err(ContractError::Decode(_))
        ));
    }

    #[test]
    fn failure_message_falls_back_to_generic_text() {
        assert_eq!(
            failure_message(r#"{"error":"No face detected in image"}"#).0,
            "No face detected in image"
        );
        assert_eq!(failure_message(r#"{"detail":"x"}"#).0, GENERIC_ERROR_MESSAGE);
        assert_eq!(failure_message("Bad Gateway").0, GENERIC_ERROR_MESSAGE);
        assert_eq!(failure_message(r#"{"error":42}"#).0, GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn mistyped_informational_fields_are_dropped() {
        let parsed = parse_compare_response(
            r#"{"confidence":0.8,"is_same_person":1,"processed_before_image":42}"#,
        )
        .expect("valid confidence should parse");
        assert_eq!(parsed.confidence, 0.8);
        assert_eq!(parsed.is_same_person, None);
        assert_eq!(parsed.processed_before_image, None);

        let (message, code) = failure_message(r#"{"error":"Invalid file format","code":415}"#);
        assert_eq!(message, "Invalid file format");
        assert_eq!(code, None);

        let health = parse_health_response(r#"{"status":"healthy","model_loaded":true,"model_type":7}"#)
            .expect("health with odd model_type should parse");
        assert_eq!(health.model_type, None);
    }

    #[test]
    fn structured_code_overrides_message_matching() {
        let error = ComparisonError::server(
            413,
            "upload rejected",
            Some(ServerErrorCode::FileTooLarge),
        );
        assert_eq!(guidance_for(&error), vec![Guidance::MaxFileSize]);

        let error = ComparisonError::server(
            400,
            "Invalid file format",
            Some(ServerErrorCode::NoFaceDetected),
        );
        assert!(guidance_for(&error).is_empty());
    }

    #[test]
    fn legacy_phrases_produce_hints() {
        let error = ComparisonError::server(
            400,
            "File size exceeds maximum limit of 15 MB. Current size: 17.20 MB",
            None,
        );
        assert_eq!(guidance_for(&error), vec![Guidance::MaxFileSize]);
        assert_eq!(Guidance::MaxFileSize.text(), "Maximum file size: 15 MB");
        assert_eq!(
            Guidance::AllowedFormats.text(),
            "Allowed formats: JPG, JPEG, PNG, WEBP"
        );
    }
}
