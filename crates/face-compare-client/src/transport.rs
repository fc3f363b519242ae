//! Wire transport abstraction and the `ureq` implementation.

use thiserror::Error;
use url::Url;

use crate::MultipartBody;

/// Status and body of one completed round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response value.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Abstract transport used by the comparison client.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status, and `Err` only when no round trip completed.
pub trait ComparisonTransport: Send + Sync {
    /// Posts a multipart body.
    fn post_multipart(
        &self,
        endpoint: &Url,
        form: &MultipartBody,
    ) -> Result<HttpResponse, TransportError>;

    /// Issues a plain GET.
    fn get(&self, endpoint: &Url) -> Result<HttpResponse, TransportError>;
}

/// Blocking HTTP transport backed by a shared `ureq` agent.
///
/// The agent is built without read or write timeouts: a request stays in
/// flight until the server answers or the connection drops.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Creates a transport with a fresh agent.
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonTransport for UreqTransport {
    fn post_multipart(
        &self,
        endpoint: &Url,
        form: &MultipartBody,
    ) -> Result<HttpResponse, TransportError> {
        let result = self
            .agent
            .post(endpoint.as_str())
            .set("Content-Type", &form.content_type())
            .set("Accept", "application/json")
            .send_bytes(&form.body);
        read_result(result)
    }

    fn get(&self, endpoint: &Url) -> Result<HttpResponse, TransportError> {
        let result = self
            .agent
            .get(endpoint.as_str())
            .set("Accept", "application/json")
            .call();
        read_result(result)
    }
}

fn read_result(result: Result<ureq::Response, ureq::Error>) -> Result<HttpResponse, TransportError> {
    let response = match result {
        Ok(response) => response,
        // ureq reports 4xx/5xx as errors; they are still complete round trips.
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(transport)) => {
            return Err(TransportError::Connection(transport.to_string()));
        }
    };

    let status = response.status();
    let body = response
        .into_string()
        .map_err(|error| TransportError::Body(error.to_string()))?;
    Ok(HttpResponse { status, body })
}

/// Failure to complete a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request could not be delivered (DNS, refused, reset).
    #[error("{0}")]
    Connection(String),
    /// Response started but its body could not be read to the end.
    #[error("response body read failed: {0}")]
    Body(String),
}
