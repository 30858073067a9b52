//! The process-wide shared signing secret.

use std::fmt;

use crate::error::TokenError;

/// Shared secret used to sign and verify references.
///
/// Every instance issuing or validating references for the same stream must be
/// constructed from the same secret. The secret is never printed by `Debug`.
///
/// # Examples
///
/// ```
/// use streamgate_auth::SigningKey;
///
/// let key = SigningKey::new("shared-secret").unwrap();
/// assert_eq!(key.as_bytes(), b"shared-secret");
/// assert!(!format!("{key:?}").contains("shared-secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Create a signing key from raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EmptySecret`] if the secret is empty.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self(secret))
    }

    /// The raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&"<redacted>").finish()
    }
}
