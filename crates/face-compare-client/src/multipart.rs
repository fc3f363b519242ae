//! Multipart form encoding for the two-image comparison request.

use face_compare_core::{Role, SelectedFile};
use sha2::{Digest, Sha256};

/// Encoded `multipart/form-data` request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    /// Boundary token separating parts.
    pub boundary: String,
    /// Complete body bytes, including the closing delimiter.
    pub body: Vec<u8>,
}

impl MultipartBody {
    /// Value for the `Content-Type` request header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Encodes the comparison form with `before` and `after` in their fixed
/// fields, regardless of the role recorded on each file.
///
/// The boundary is derived from a digest over both parts, so the same pair
/// always encodes to the same bytes.
pub fn encode_comparison_form(before: &SelectedFile, after: &SelectedFile) -> MultipartBody {
    let parts = [(Role::Before, before), (Role::After, after)];

    let mut hasher = Sha256::new();
    for (role, file) in &parts {
        hasher.update(role.form_field().as_bytes());
        hasher.update(file.name().as_bytes());
        hasher.update((file.size_bytes() as u64).to_be_bytes());
        hasher.update(file.bytes());
    }
    let digest = hex::encode(hasher.finalize());
    let boundary = format!("----FaceCompareBoundary{}", &digest[..32]);

    let payload_len: usize = parts.iter().map(|(_, file)| file.size_bytes()).sum();
    let mut body = Vec::with_capacity(payload_len + 512);
    for (role, file) in &parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                role.form_field(),
                escape_filename(file.name())
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.mime_type()).as_bytes());
        body.extend_from_slice(file.bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    MultipartBody { boundary, body }
}

/// Hex SHA-256 of a payload, used in logs instead of the bytes.
pub fn payload_fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// Same escaping browsers apply to `filename` in form submissions.
fn escape_filename(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
