//! Error types for signed reference handling.
//!
//! [`TokenError`] keeps the individual failure modes apart so they can be
//! logged. Callers deciding access should use
//! [`TokenCodec::validate`](crate::TokenCodec::validate), which collapses
//! every failure into a single `false`.

/// Errors that can occur while building, parsing, or verifying a signed reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The shared signing secret is empty.
    #[error("Signing secret must not be empty")]
    EmptySecret,

    /// The claimed expiry is not an integer Unix timestamp.
    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    /// A required query parameter of a signed URL is missing.
    #[error("Missing required query parameter: {0}")]
    MissingQueryParam(String),

    /// The computed signature does not match the claimed signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,

    /// The reference expiry lies in the past.
    #[error("Reference has expired")]
    ReferenceExpired,
}
