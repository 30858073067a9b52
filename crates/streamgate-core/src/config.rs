//! Gateway configuration.
//!
//! Provides [`GatewayConfig`] for configuring a StreamGate instance. Values are
//! loaded from environment variables; anything unset or unparseable keeps its
//! default. The signing secret has no usable default and must be provisioned
//! identically on every instance serving the same stream.

use std::fmt;

use serde::{Deserialize, Serialize};
use streamgate_auth::{SignatureScope, SigningKey, TokenError};
use typed_builder::TypedBuilder;

/// Errors detected when turning a [`GatewayConfig`] into live components.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The signing secret is unusable.
    #[error("invalid signing secret: {0}")]
    InvalidSecret(#[from] TokenError),

    /// A configured header name is not a valid HTTP header name.
    #[error("invalid header name for {setting}: {name}")]
    InvalidHeaderName {
        /// The configuration setting holding the name.
        setting: &'static str,
        /// The rejected header name.
        name: String,
    },
}

/// StreamGate configuration.
///
/// # Examples
///
/// ```
/// use streamgate_core::config::GatewayConfig;
///
/// let config = GatewayConfig::builder().signing_secret("s3cret".to_owned()).build();
/// assert_eq!(config.manifest_path, "/hls/streamkey/index.m3u8");
/// assert_eq!(config.signed_url_ttl_secs, 600);
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Bind address for the gateway (e.g. `"0.0.0.0:5000"`).
    #[builder(default = String::from("0.0.0.0:5000"))]
    pub gateway_listen: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Shared HMAC secret.
    #[builder(default)]
    pub signing_secret: String,

    /// Logical path of the stream manifest; also the canonical path of
    /// stream-scoped signatures.
    #[builder(default = String::from("/hls/streamkey/index.m3u8"))]
    pub manifest_path: String,

    /// Filesystem directory logical paths are resolved under.
    #[builder(default = String::from("/tmp"))]
    pub storage_root: String,

    /// File suffix identifying segment lines in the manifest.
    #[builder(default = String::from(".ts"))]
    pub segment_suffix: String,

    /// Lifetime of issued manifest URLs, in seconds.
    #[builder(default = 600)]
    pub signed_url_ttl_secs: u64,

    /// Whether signatures cover the whole stream or each resource.
    #[builder(default)]
    pub signature_scope: SignatureScope,

    /// Header carrying the original request path and query in sub-requests.
    #[builder(default = String::from("X-Original-URI"))]
    pub original_uri_header: String,

    /// Header carrying supplementary query parameters in sub-requests.
    #[builder(default = String::from("X-Original-Args"))]
    pub original_args_header: String,

    /// Header set by the identity proxy for authenticated users.
    #[builder(default = String::from("X-Authenticated-User"))]
    pub session_user_header: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("gateway_listen", &self.gateway_listen)
            .field("log_level", &self.log_level)
            .field(
                "signing_secret",
                &if self.signing_secret.is_empty() { "" } else { "..." },
            )
            .field("manifest_path", &self.manifest_path)
            .field("storage_root", &self.storage_root)
            .field("segment_suffix", &self.segment_suffix)
            .field("signed_url_ttl_secs", &self.signed_url_ttl_secs)
            .field("signature_scope", &self.signature_scope)
            .field("original_uri_header", &self.original_uri_header)
            .field("original_args_header", &self.original_args_header)
            .field("session_user_header", &self.session_user_header)
            .finish()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `GATEWAY_LISTEN` | `gateway_listen` |
    /// | `LOG_LEVEL` | `log_level` |
    /// | `STREAM_SIGNING_SECRET` | `signing_secret` |
    /// | `STREAM_MANIFEST_PATH` | `manifest_path` |
    /// | `STREAM_STORAGE_ROOT` | `storage_root` |
    /// | `STREAM_SEGMENT_SUFFIX` | `segment_suffix` |
    /// | `SIGNED_URL_TTL_SECS` | `signed_url_ttl_secs` |
    /// | `SIGNATURE_SCOPE` | `signature_scope` (`stream` or `resource`) |
    /// | `ORIGINAL_URI_HEADER` | `original_uri_header` |
    /// | `ORIGINAL_ARGS_HEADER` | `original_args_header` |
    /// | `SESSION_USER_HEADER` | `session_user_header` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from `lookup`, which maps a variable name from the
    /// [`from_env`](Self::from_env) table to its value.
    ///
    /// Unparseable TTL or scope values keep their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("STREAM_SIGNING_SECRET") {
            config.signing_secret = v;
        }
        if let Some(v) = lookup("STREAM_MANIFEST_PATH") {
            config.manifest_path = v;
        }
        if let Some(v) = lookup("STREAM_STORAGE_ROOT") {
            config.storage_root = v;
        }
        if let Some(v) = lookup("STREAM_SEGMENT_SUFFIX") {
            config.segment_suffix = v;
        }
        if let Some(v) = lookup("SIGNED_URL_TTL_SECS").and_then(|v| v.trim().parse().ok()) {
            config.signed_url_ttl_secs = v;
        }
        if let Some(v) = lookup("SIGNATURE_SCOPE").and_then(|v| v.parse().ok()) {
            config.signature_scope = v;
        }
        if let Some(v) = lookup("ORIGINAL_URI_HEADER") {
            config.original_uri_header = v;
        }
        if let Some(v) = lookup("ORIGINAL_ARGS_HEADER") {
            config.original_args_header = v;
        }
        if let Some(v) = lookup("SESSION_USER_HEADER") {
            config.session_user_header = v;
        }

        config
    }

    /// Build the signing key from the configured secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSecret`] if the secret is empty.
    pub fn signing_key(&self) -> Result<SigningKey, ConfigError> {
        Ok(SigningKey::new(self.signing_secret.as_bytes())?)
    }

    /// Directory prefix (with trailing `/`) that segment lines are resolved
    /// against: the directory of the manifest.
    #[must_use]
    pub fn segment_base_path(&self) -> Option<String> {
        self.manifest_path
            .rsplit_once('/')
            .map(|(dir, _)| format!("{dir}/"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_should_keep_defaults_for_unparseable_values() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("SIGNED_URL_TTL_SECS", "abc"),
            ("SIGNATURE_SCOPE", "segment"),
        ]));
        assert_eq!(config.signed_url_ttl_secs, 600);
        assert_eq!(config.signature_scope, SignatureScope::Stream);
    }

    #[test]
    fn test_should_load_overrides_from_lookup() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("GATEWAY_LISTEN", "127.0.0.1:8080"),
            ("STREAM_SIGNING_SECRET", "supersecretkey"),
            ("STREAM_MANIFEST_PATH", "/live/cam1/index.m3u8"),
            ("SIGNED_URL_TTL_SECS", "30"),
            ("SIGNATURE_SCOPE", "Resource"),
            ("SESSION_USER_HEADER", "X-Forwarded-User"),
        ]));
        assert_eq!(config.gateway_listen, "127.0.0.1:8080");
        assert_eq!(config.signing_secret, "supersecretkey");
        assert_eq!(config.manifest_path, "/live/cam1/index.m3u8");
        assert_eq!(config.signed_url_ttl_secs, 30);
        assert_eq!(config.signature_scope, SignatureScope::Resource);
        assert_eq!(config.session_user_header, "X-Forwarded-User");
        assert_eq!(config.storage_root, "/tmp");
    }

    #[test]
    fn test_should_use_defaults_for_empty_lookup() {
        let config = GatewayConfig::from_lookup(|_| None);
        assert_eq!(config.gateway_listen, "0.0.0.0:5000");
        assert_eq!(config.segment_suffix, ".ts");
    }

    #[test]
    fn test_should_create_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.gateway_listen, "0.0.0.0:5000");
        assert_eq!(config.manifest_path, "/hls/streamkey/index.m3u8");
        assert_eq!(config.storage_root, "/tmp");
        assert_eq!(config.segment_suffix, ".ts");
        assert_eq!(config.signed_url_ttl_secs, 600);
        assert_eq!(config.signature_scope, SignatureScope::Stream);
        assert_eq!(config.original_uri_header, "X-Original-URI");
        assert_eq!(config.original_args_header, "X-Original-Args");
        assert!(config.signing_secret.is_empty());
    }

    #[test]
    fn test_should_reject_empty_secret() {
        let config = GatewayConfig::default();
        assert!(matches!(
            config.signing_key(),
            Err(ConfigError::InvalidSecret(TokenError::EmptySecret))
        ));
    }

    #[test]
    fn test_should_build_signing_key_from_secret() {
        let config = GatewayConfig::builder()
            .signing_secret("supersecretkey".to_owned())
            .build();
        let key = config.signing_key().unwrap();
        assert_eq!(key.as_bytes(), b"supersecretkey");
    }

    #[test]
    fn test_should_derive_segment_base_path_from_manifest() {
        let config = GatewayConfig::default();
        assert_eq!(config.segment_base_path().as_deref(), Some("/hls/streamkey/"));

        let flat = GatewayConfig::builder()
            .manifest_path("index.m3u8".to_owned())
            .build();
        assert_eq!(flat.segment_base_path(), None);
    }

    #[test]
    fn test_should_redact_secret_in_debug_output() {
        let config = GatewayConfig::builder()
            .signing_secret("supersecretkey".to_owned())
            .build();
        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("GatewayConfig"));
        assert!(!debug_str.contains("supersecretkey"));
    }
}
