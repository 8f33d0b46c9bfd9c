//! Error types for the dsse library.

use thiserror::Error;

/// Error type surfaced by [`Signer`](crate::Signer) and
/// [`Verifier`](crate::Verifier) capabilities.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for dsse operations.
#[derive(Error, Debug)]
pub enum DsseError {
    /// Sign was called without any signer.
    #[error("dsse: missing signer")]
    NoSigners,

    /// A signer's underlying operation failed.
    #[error("dsse: signing failed: {0}")]
    Signing(#[source] BoxError),

    /// Verify was called without any verifier.
    #[error("dsse: missing verifier")]
    NoVerifiers,

    /// No signature/verifier pair succeeded.
    #[error("dsse: verification error")]
    Verification,

    /// Error with base64 decoding.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Error with JSON serialization/deserialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid key format or length.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Malformed pre-authentication encoding.
    #[error("Invalid PAE format: {0}")]
    InvalidFormat(String),
}

/// Result type alias for dsse operations.
pub type Result<T> = std::result::Result<T, DsseError>;
