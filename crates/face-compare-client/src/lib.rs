#![warn(missing_docs)]
//! # face-compare-client
//!
//! ## Purpose
//! Sends one before/after pair to the comparison service and classifies the
//! answer into a score report or a categorized [`ComparisonError`].
//!
//! ## Responsibilities
//! - Encode both files into a deterministic multipart body.
//! - Execute requests through an injectable [`ComparisonTransport`].
//! - Map HTTP outcomes into the `server`, `network`, and `unknown` categories.
//! - Probe the service health endpoint.
//!
//! ## Data flow
//! Two [`SelectedFile`] values -> [`encode_comparison_form`] ->
//! [`ComparisonTransport::post_multipart`] -> [`classify_response`] ->
//! [`ComparisonOutcome`].
//!
//! ## Error model
//! One call is one round trip. There are no retries and no client-side
//! timeout; the outcome is always exactly one `Ok` or `Err`.
//!
//! ## Security and privacy notes
//! Payload bytes are never logged. Logs carry sizes and SHA-256 fingerprints.

mod multipart;
mod transport;

use std::sync::Arc;

use face_compare_contract::{
    CompareResponse, ContractError, HealthResponse, failure_message, parse_compare_response,
    parse_health_response,
};
use face_compare_core::{
    ComparisonError, ComparisonOutcome, ProcessedFaces, ScoreReport, SelectedFile,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::{Host, Url};

pub use multipart::{MultipartBody, encode_comparison_form, payload_fingerprint};
pub use transport::{ComparisonTransport, HttpResponse, TransportError, UreqTransport};

/// Default comparison endpoint of a locally running service.
pub const DEFAULT_COMPARE_ENDPOINT: &str = "http://localhost:5000/api/compare";

/// Default health endpoint of a locally running service.
pub const DEFAULT_HEALTH_ENDPOINT: &str = "http://localhost:5000/api/health";

/// Client bound to one comparison endpoint.
#[derive(Clone)]
pub struct ComparisonClient {
    compare_endpoint: Url,
    health_endpoint: Url,
    transport: Arc<dyn ComparisonTransport>,
}

impl ComparisonClient {
    /// Creates a client with validated endpoints.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidEndpoint`] when an endpoint is not an
    /// absolute `http` or `https` URL.
    pub fn new(
        compare_endpoint: &str,
        health_endpoint: &str,
        transport: Arc<dyn ComparisonTransport>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            compare_endpoint: validate_endpoint(compare_endpoint)?,
            health_endpoint: validate_endpoint(health_endpoint)?,
            transport,
        })
    }

    /// Compares `before` against `after` in exactly one request.
    pub fn compare(&self, before: &SelectedFile, after: &SelectedFile) -> ComparisonOutcome {
        let form = encode_comparison_form(before, after);
        info!(
            stage = "compare",
            action = "request",
            endpoint = %self.compare_endpoint,
            before_sha256 = %payload_fingerprint(before.bytes()),
            after_sha256 = %payload_fingerprint(after.bytes()),
            body_bytes = form.body.len(),
            "sending comparison request"
        );

        let response = match self.transport.post_multipart(&self.compare_endpoint, &form) {
            Ok(response) => response,
            Err(error) => {
                warn!(stage = "compare", action = "transport_failed", %error);
                return Err(ComparisonError::network(error.to_string()));
            }
        };

        let outcome = classify_response(&response);
        match &outcome {
            Ok(report) => info!(
                stage = "compare",
                action = "scored",
                status = response.status,
                confidence = report.confidence,
            ),
            Err(error) => warn!(
                stage = "compare",
                action = "rejected",
                status = response.status,
                category = error.category.as_str(),
                message = %error.message,
            ),
        }
        outcome
    }

    /// Probes the service health endpoint.
    ///
    /// # Errors
    /// Returns [`ClientError::Transport`] when no round trip happens,
    /// [`ClientError::HealthStatus`] for non-success statuses, and
    /// [`ClientError::Contract`] for unreadable bodies.
    pub fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.transport.get(&self.health_endpoint)?;
        if !response.is_success() {
            return Err(ClientError::HealthStatus(response.status));
        }
        Ok(parse_health_response(&response.body)?)
    }

    /// Configured comparison endpoint.
    pub fn compare_endpoint(&self) -> &Url {
        &self.compare_endpoint
    }

    /// Configured health endpoint.
    pub fn health_endpoint(&self) -> &Url {
        &self.health_endpoint
    }
}

/// Classifies one HTTP response of the comparison endpoint.
///
/// - 2xx with a valid `confidence` -> `Ok`.
/// - 2xx otherwise -> `unknown` category.
/// - non-2xx -> `server` category with the body's `error` text or the
///   generic fallback.
pub fn classify_response(response: &HttpResponse) -> ComparisonOutcome {
    if !response.is_success() {
        let (message, code) = failure_message(&response.body);
        return Err(ComparisonError::server(response.status, message, code));
    }

    match parse_compare_response(&response.body) {
        Ok(parsed) => Ok(score_report(parsed)),
        Err(error) => Err(ComparisonError::unknown(
            response.status,
            format!("Unexpected response from comparison service: {error}"),
        )),
    }
}

fn score_report(parsed: CompareResponse) -> ScoreReport {
    let processed_faces = match (
        parsed.processed_before_image.as_deref(),
        parsed.processed_after_image.as_deref(),
    ) {
        (Some(before), Some(after)) => decode_faces(before, after),
        _ => None,
    };

    ScoreReport {
        confidence: parsed.confidence,
        server_verdict: parsed.is_same_person,
        processed_faces,
    }
}

fn decode_faces(before: &str, after: &str) -> Option<ProcessedFaces> {
    let decoded = face_compare_preview::decode_base64_image(before).and_then(|before| {
        face_compare_preview::decode_base64_image(after).map(|after| ProcessedFaces { before, after })
    });

    match decoded {
        Ok(faces) => Some(faces),
        Err(error) => {
            debug!(stage = "compare", action = "face_crop_skipped", %error);
            None
        }
    }
}

/// Validates an endpoint URL.
///
/// Plain `http` is accepted for loopback hosts and logged as a warning for
/// anything else.
///
/// # Errors
/// Returns [`ClientError::InvalidEndpoint`] for unparsable URLs and schemes
/// other than `http`/`https`.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, ClientError> {
    let parsed = Url::parse(endpoint.trim())
        .map_err(|error| ClientError::InvalidEndpoint(format!("'{endpoint}': {error}")))?;

    match parsed.scheme() {
        "https" => {}
        "http" => {
            if !is_loopback(&parsed) {
                warn!(
                    stage = "config",
                    action = "plaintext_endpoint",
                    endpoint = %parsed,
                    "images will be sent without TLS"
                );
            }
        }
        other => {
            return Err(ClientError::InvalidEndpoint(format!(
                "'{endpoint}': unsupported scheme '{other}'"
            )));
        }
    }

    Ok(parsed)
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(address)) => address.is_loopback(),
        Some(Host::Ipv6(address)) => address.is_loopback(),
        None => false,
    }
}

/// Client errors outside the comparison outcome itself.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Endpoint URL is malformed or uses an unsupported scheme.
    #[error("invalid endpoint {0}")]
    InvalidEndpoint(String),
    /// No round trip happened.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Health endpoint answered with a non-success status.
    #[error("health endpoint returned status {0}")]
    HealthStatus(u16),
    /// Health body did not match the contract.
    #[error(transparent)]
    Contract(#[from] ContractError),
}

#[cfg(test)]
mod tests {
    use face_compare_core::{ErrorCategory, GENERIC_ERROR_MESSAGE, Role};

    use super::*;

    struct CannedTransport(Result<HttpResponse, TransportError>);

    impl ComparisonTransport for CannedTransport {
        fn post_multipart(
            &self,
            _endpoint: &Url,
            _form: &MultipartBody,
        ) -> Result<HttpResponse, TransportError> {
            self.0.clone()
        }

        fn get(&self, _endpoint: &Url) -> Result<HttpResponse, TransportError> {
            self.0.clone()
        }
    }

    fn client(canned: Result<HttpResponse, TransportError>) -> ComparisonClient {
        ComparisonClient::new(
            DEFAULT_COMPARE_ENDPOINT,
            DEFAULT_HEALTH_ENDPOINT,
            Arc::new(CannedTransport(canned)),
        )
        .expect("default endpoints are valid")
    }

    fn pair() -> (SelectedFile, SelectedFile) {
        (
            SelectedFile::new(Role::Before, "a.jpg", "image/jpeg", vec![1_u8; 8]),
            SelectedFile::new(Role::After, "b.jpg", "image/jpeg", vec![2_u8; 8]),
        )
    }

    #[test]
    fn success_status_with_confidence_scores() {
        let (before, after) = pair();
        let report = client(Ok(HttpResponse::new(200, r#"{"confidence":0.8}"#)))
            .compare(&before, &after)
            .expect("should score");
        assert_eq!(report.confidence, 0.8);
        assert!(report.processed_faces.is_none());
    }

    #[test]
    fn success_status_with_html_is_unknown() {
        let (before, after) = pair();
        let error = client(Ok(HttpResponse::new(200, "<html>oops</html>")))
            .compare(&before, &after)
            .expect_err("should fail");
        assert_eq!(error.category, ErrorCategory::Unknown);
    }

    #[test]
    fn failure_status_without_json_uses_generic_message() {
        let (before, after) = pair();
        let error = client(Ok(HttpResponse::new(502, "Bad Gateway")))
            .compare(&before, &after)
            .expect_err("should fail");
        assert_eq!(error.category, ErrorCategory::Server);
        assert_eq!(error.message, GENERIC_ERROR_MESSAGE);
        assert_eq!(error.http_status, Some(502));
    }

    #[test]
    fn transport_failure_is_network_category() {
        let (before, after) = pair();
        let error = client(Err(TransportError::Connection(
            "Connection refused (os error 111)".to_string(),
        )))
        .compare(&before, &after)
        .expect_err("should fail");
        assert_eq!(error.category, ErrorCategory::Network);
        assert!(error.message.contains("Connection refused"));
    }

    #[test]
    fn health_probe_parses_body() {
        let health = client(Ok(HttpResponse::new(
            200,
            r#"{"status":"healthy","model_loaded":true,"model_type":"rf","scaler_type":"std"}"#,
        )))
        .health()
        .expect("health should parse");
        assert!(health.is_ready());
    }

    #[test]
    fn rejects_non_http_endpoints() {
        assert!(validate_endpoint("https://faces.example.test/api/compare").is_ok());
        assert!(validate_endpoint("http://127.0.0.1:5000/api/compare").is_ok());
        assert!(validate_endpoint("ftp://faces.example.test/api/compare").is_err());
        assert!(validate_endpoint("not a url").is_err());
    }
}
