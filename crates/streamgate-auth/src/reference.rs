//! The signed reference value and its URL encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Query parameter carrying the expiry timestamp.
pub const EXPIRY_PARAM: &str = "expiry";

/// Query parameter carrying the hex-encoded signature.
pub const SIGNATURE_PARAM: &str = "sig";

/// A time-limited capability for a resource.
///
/// Created by [`TokenCodec::issue`](crate::TokenCodec::issue) and never
/// mutated afterwards. It is not stored anywhere; it simply stops validating
/// once `expiry` has passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedReference {
    /// The resource path the reference was issued for.
    pub resource_path: String,
    /// Absolute Unix time (seconds) after which the reference is void.
    pub expiry: i64,
    /// Lowercase hex HMAC-SHA256 signature.
    pub signature: String,
}

impl SignedReference {
    /// Encode as `<path>?expiry=<expiry>&sig=<signature>`.
    #[must_use]
    pub fn to_url(&self) -> String {
        self.to_string()
    }

    /// Parse a signed URL of the form `<path>?expiry=<int>&sig=<hex>`.
    ///
    /// Additional query parameters are ignored. When a parameter is repeated
    /// the first occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingQueryParam`] if `expiry` or `sig` is absent
    /// or empty, and [`TokenError::InvalidExpiry`] if `expiry` is not an integer.
    pub fn parse(url: &str) -> Result<Self, TokenError> {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));

        let mut expiry = None;
        let mut signature = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                EXPIRY_PARAM if expiry.is_none() => expiry = Some(value.into_owned()),
                SIGNATURE_PARAM if signature.is_none() => signature = Some(value.into_owned()),
                _ => {}
            }
        }

        let expiry_text =
            expiry.ok_or_else(|| TokenError::MissingQueryParam(EXPIRY_PARAM.to_owned()))?;
        let signature =
            signature.ok_or_else(|| TokenError::MissingQueryParam(SIGNATURE_PARAM.to_owned()))?;
        let expiry = expiry_text
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidExpiry(expiry_text))?;

        Ok(Self {
            resource_path: path.to_owned(),
            expiry,
            signature,
        })
    }
}

impl fmt::Display for SignedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}?{EXPIRY_PARAM}={}&{SIGNATURE_PARAM}={}",
            self.resource_path, self.expiry, self.signature
        )
    }
}
