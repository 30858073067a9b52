//! Request routing.
//!
//! The gateway answers a fixed set of paths; everything else is a 404.

use std::fmt;

use http::Method;

/// Path of the issuance endpoint.
pub const ISSUE_PATH: &str = "/api/get_signed_url";

/// Path of the sub-request validation endpoint.
pub const VALIDATE_PATH: &str = "/validate_token";

/// The endpoint a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayRoute {
    /// Liveness probe.
    Health,
    /// `GET /api/get_signed_url`.
    IssueSignedUrl,
    /// `GET /validate_token`.
    ValidateToken,
    /// `GET <manifest path>?expiry=..&sig=..`.
    Manifest,
}

impl fmt::Display for GatewayRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Health => "Health",
            Self::IssueSignedUrl => "IssueSignedUrl",
            Self::ValidateToken => "ValidateToken",
            Self::Manifest => "Manifest",
        })
    }
}

/// Why a request could not be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// No endpoint at this path.
    NotFound,
    /// The path exists but only answers `GET`/`HEAD`.
    MethodNotAllowed,
}

/// Maps requests onto [`GatewayRoute`]s.
#[derive(Debug, Clone)]
pub struct GatewayRouter {
    manifest_path: String,
}

impl GatewayRouter {
    /// Create a router serving the manifest at `manifest_path`.
    #[must_use]
    pub fn new(manifest_path: impl Into<String>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
        }
    }

    /// Resolve `method` and `path` to a route.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NotFound`] for unknown paths and
    /// [`RouteError::MethodNotAllowed`] for known paths with a method other
    /// than `GET` or `HEAD`.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<GatewayRoute, RouteError> {
        let route = match path {
            "/health" | "/_health" => GatewayRoute::Health,
            ISSUE_PATH => GatewayRoute::IssueSignedUrl,
            VALIDATE_PATH => GatewayRoute::ValidateToken,
            p if p == self.manifest_path => GatewayRoute::Manifest,
            _ => return Err(RouteError::NotFound),
        };

        if *method == Method::GET || *method == Method::HEAD {
            Ok(route)
        } else {
            Err(RouteError::MethodNotAllowed)
        }
    }
}
