//! Session capability supplied by the identity collaborator.
//!
//! The gateway does not check credentials. It only asks a [`SessionGate`]
//! whether the caller behind a request is an authenticated end user.

use std::fmt;

use http::HeaderName;
use http::request::Parts;

use crate::config::ConfigError;

/// Answers whether a request comes from an authenticated end user.
pub trait SessionGate: Send + Sync + fmt::Debug {
    /// Whether the caller behind `parts` holds an authenticated session.
    fn is_authenticated(&self, parts: &Parts) -> bool;
}

/// Trusts a header set by an upstream identity proxy.
///
/// A request is authenticated when the configured header is present with a
/// non-blank value. The proxy in front of the gateway must strip that header
/// from client traffic.
#[derive(Debug, Clone)]
pub struct TrustedHeaderSessionGate {
    header: HeaderName,
}

impl TrustedHeaderSessionGate {
    /// Create a gate trusting `header`.
    #[must_use]
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Create a gate trusting the header configured as `session_user_header`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeaderName`] if `name` is not a valid
    /// HTTP header name.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        HeaderName::from_bytes(name.as_bytes())
            .map(Self::new)
            .map_err(|_| ConfigError::InvalidHeaderName {
                setting: "session_user_header",
                name: name.to_owned(),
            })
    }

    /// The trusted header name.
    #[must_use]
    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl SessionGate for TrustedHeaderSessionGate {
    fn is_authenticated(&self, parts: &Parts) -> bool {
        parts
            .headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|user| !user.trim().is_empty())
    }
}

/// A gate with a constant answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedSessionGate(pub bool);

impl SessionGate for FixedSessionGate {
    fn is_authenticated(&self, _parts: &Parts) -> bool {
        self.0
    }
}
