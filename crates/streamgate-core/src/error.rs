//! Gateway error types.
//!
//! Each failure is converted into a response status at the boundary of the
//! component that detects it. Bad signatures and expired references are the
//! same [`GatewayError::Unauthorized`] outcome, and storage failures of any
//! kind surface as [`GatewayError::ResourceNotFound`].

use http::StatusCode;

/// Errors produced by the authorization gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The caller holds no authenticated session.
    #[error("Caller is not authenticated")]
    Unauthenticated,

    /// The presented signature is invalid or expired.
    #[error("Invalid or expired signature")]
    Unauthorized,

    /// One or more required parameters are missing.
    #[error("Missing parameters: {0}")]
    MalformedRequest(String),

    /// The requested resource does not exist in storage.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
}

impl GatewayError {
    /// The HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::ResourceNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Convenience result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised by a [`ManifestStore`](crate::storage::ManifestStore).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No file exists at the logical path.
    #[error("No such manifest: {0}")]
    NotFound(String),

    /// The logical path escapes the storage root or is otherwise unusable.
    #[error("Invalid manifest path: {0}")]
    InvalidPath(String),

    /// Reading the file failed.
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        /// The logical path being read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
