use thiserror::Error;

/// Why a raw credential could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("credential must have 3 segments, found {0}")]
    Malformed(usize),

    #[error("credential payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("credential payload is not valid JSON claims: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a credential failed signature verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no credential verifier is configured")]
    NotConfigured,

    #[error("credential rejected: {0}")]
    Rejected(String),

    #[error("unsupported signing algorithm: {0}")]
    Unsupported(String),
}
