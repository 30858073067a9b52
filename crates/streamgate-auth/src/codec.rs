//! Issuance and verification of signed references.
//!
//! [`TokenCodec`] is the only place that touches the shared secret. Issuance
//! computes `expiry = now + ttl` and signs the canonical message; verification
//! recomputes the signature for the claimed expiry, compares it in constant
//! time and then checks that `expiry >= now`.
//!
//! Under the default [`SignatureScope::Stream`] the canonical path is always
//! the stream's manifest path, so a pair issued for the manifest is accepted
//! for every segment of the stream. [`SignatureScope::Resource`] binds each
//! signature to the concrete resource path instead.

use std::sync::Arc;

use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::{SignatureScope, canonical_message};
use crate::clock::{Clock, SystemClock};
use crate::error::TokenError;
use crate::key::SigningKey;
use crate::reference::SignedReference;

type HmacSha256 = Hmac<Sha256>;

/// Builds and verifies signed references for one stream.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SigningKey,
    stream_path: String,
    scope: SignatureScope,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec for the stream whose manifest lives at `stream_path`.
    ///
    /// The codec uses [`SignatureScope::Stream`] and the system clock.
    #[must_use]
    pub fn new(key: SigningKey, stream_path: impl Into<String>) -> Self {
        Self {
            key,
            stream_path: stream_path.into(),
            scope: SignatureScope::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use the given signature scope.
    #[must_use]
    pub fn with_scope(mut self, scope: SignatureScope) -> Self {
        self.scope = scope;
        self
    }

    /// Use the given clock for issuance and expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The manifest path of the stream this codec signs for.
    #[must_use]
    pub fn stream_path(&self) -> &str {
        &self.stream_path
    }

    /// The configured signature scope.
    #[must_use]
    pub fn scope(&self) -> SignatureScope {
        self.scope
    }

    /// The current Unix time according to the codec's clock.
    #[must_use]
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Compute the hex signature for `resource_path` and the textual `expiry`.
    #[must_use]
    pub fn sign(&self, resource_path: &str, expiry: &str) -> String {
        let message = canonical_message(self.canonical_path(resource_path), expiry);
        hex::encode(hmac_sha256(self.key.as_bytes(), message.as_bytes()))
    }

    /// Issue a reference for `resource_path` valid for `ttl_seconds` from now.
    #[must_use]
    pub fn issue(&self, resource_path: &str, ttl_seconds: u64) -> SignedReference {
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        self.issue_until(resource_path, self.now().saturating_add(ttl))
    }

    /// Issue a reference for `resource_path` expiring at the absolute time `expiry`.
    #[must_use]
    pub fn issue_until(&self, resource_path: &str, expiry: i64) -> SignedReference {
        let signature = self.sign(resource_path, &expiry.to_string());
        debug!(resource_path, expiry, scope = %self.scope, "Issued signed reference");
        SignedReference {
            resource_path: resource_path.to_owned(),
            expiry,
            signature,
        }
    }

    /// Verify a claimed `(expiry, signature)` pair presented for `resource_path`.
    ///
    /// The claimed expiry text is signed verbatim; it only has to parse as an
    /// integer. A reference expiring exactly now is still valid.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidExpiry`] for a non-integer expiry,
    /// [`TokenError::SignatureDoesNotMatch`] for a wrong signature, and
    /// [`TokenError::ReferenceExpired`] once the expiry has passed.
    pub fn verify(
        &self,
        resource_path: &str,
        claimed_expiry: &str,
        claimed_signature: &str,
    ) -> Result<(), TokenError> {
        let expiry: i64 = claimed_expiry
            .parse()
            .map_err(|_| TokenError::InvalidExpiry(claimed_expiry.to_owned()))?;

        let expected = self.sign(resource_path, claimed_expiry);
        if !bool::from(expected.as_bytes().ct_eq(claimed_signature.as_bytes())) {
            return Err(TokenError::SignatureDoesNotMatch);
        }

        if expiry < self.now() {
            return Err(TokenError::ReferenceExpired);
        }

        Ok(())
    }

    /// Whether a claimed `(expiry, signature)` pair is acceptable for `resource_path`.
    ///
    /// Never panics. Bad signatures, expired references and malformed input
    /// all yield `false` without telling the caller which check failed.
    #[must_use]
    pub fn validate(&self, resource_path: &str, claimed_expiry: &str, claimed_signature: &str) -> bool {
        match self.verify(resource_path, claimed_expiry, claimed_signature) {
            Ok(()) => true,
            Err(err) => {
                debug!(resource_path, error = %err, "Signed reference rejected");
                false
            }
        }
    }

    fn canonical_path<'a>(&'a self, resource_path: &'a str) -> &'a str {
        match self.scope {
            SignatureScope::Stream => &self.stream_path,
            SignatureScope::Resource => resource_path,
        }
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
