//! Canonical message construction.
//!
//! The signature of a reference covers exactly the bytes
//!
//! ```text
//! <canonical path>?expiry=<expiry>
//! ```
//!
//! where the expiry is the decimal text presented by the caller. Which path
//! is used as the canonical path is decided by the [`SignatureScope`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which path a signature is bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureScope {
    /// The signature covers the stream's manifest path, whatever resource is
    /// being fetched. One `(expiry, sig)` pair unlocks the manifest and every
    /// segment of the stream until it expires.
    #[default]
    Stream,
    /// The signature covers the concrete resource path. Each segment listed in
    /// a rewritten manifest receives its own signature.
    Resource,
}

impl SignatureScope {
    /// The configuration name of this scope.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for SignatureScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stream" => Ok(Self::Stream),
            "resource" => Ok(Self::Resource),
            other => Err(format!("unknown signature scope: {other}")),
        }
    }
}

/// Build the canonical message for `path` and the textual `expiry`.
///
/// # Examples
///
/// ```
/// use streamgate_auth::canonical_message;
///
/// assert_eq!(
///     canonical_message("/hls/streamkey/index.m3u8", "1700000000"),
///     "/hls/streamkey/index.m3u8?expiry=1700000000",
/// );
/// ```
#[must_use]
pub fn canonical_message(path: &str, expiry: &str) -> String {
    format!("{path}?expiry={expiry}")
}
