//! The authorization gateway.
//!
//! [`AuthorizationGateway`] has two jobs:
//!
//! - **Issue**: hand an authenticated caller a signed URL for the stream
//!   manifest, valid for the configured TTL.
//! - **Validate**: accept or reject a `(path, expiry, sig)` triple. The triple
//!   arrives either inline on the manifest request, which the gateway then
//!   serves rewritten, or through the carrier headers of a reverse-proxy
//!   sub-request guarding segment files. Both paths run the same check.
//!
//! No state is kept between requests; every instance constructed with the
//! same secret makes the same decisions.

use std::sync::Arc;

use http::HeaderMap;
use http::request::Parts;
use streamgate_auth::reference::{EXPIRY_PARAM, SIGNATURE_PARAM};
use streamgate_auth::{SignatureScope, SignedReference, TokenCodec};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, GatewayConfig};
use crate::error::{GatewayError, GatewayResult, StorageError};
use crate::rewriter::{ManifestRewriter, SegmentSigner};
use crate::session::SessionGate;
use crate::storage::ManifestStore;
use crate::subrequest::{CarrierHeaders, CarrierParams, merge_carrier_params};

/// Default lifetime of issued manifest URLs, in seconds.
pub const DEFAULT_TTL_SECS: u64 = 600;

/// A complete validation triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    /// The path of the resource being fetched.
    pub path: String,
    /// The claimed expiry, as presented.
    pub expiry: String,
    /// The claimed signature, as presented.
    pub signature: String,
}

impl ValidationRequest {
    /// Assemble a triple, treating empty values as absent.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedRequest`] naming every missing part.
    pub fn from_parts(
        path: Option<&str>,
        expiry: Option<&str>,
        signature: Option<&str>,
    ) -> GatewayResult<Self> {
        let present = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(ToOwned::to_owned);

        match (present(path), present(expiry), present(signature)) {
            (Some(path), Some(expiry), Some(signature)) => Ok(Self {
                path,
                expiry,
                signature,
            }),
            (path, expiry, signature) => {
                let missing: Vec<&str> = [
                    ("path", path.is_none()),
                    (EXPIRY_PARAM, expiry.is_none()),
                    (SIGNATURE_PARAM, signature.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(GatewayError::MalformedRequest(missing.join(", ")))
            }
        }
    }

    /// Build a triple from merged carrier parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedRequest`] if any part is missing.
    pub fn from_carriers(carried: &CarrierParams) -> GatewayResult<Self> {
        Self::from_parts(
            carried.path.as_deref(),
            carried.get(EXPIRY_PARAM),
            carried.get(SIGNATURE_PARAM),
        )
    }

    /// Build a triple from a request URI carrying `expiry` and `sig` in its query.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedRequest`] if any part is missing.
    pub fn from_uri(uri: &http::Uri) -> GatewayResult<Self> {
        let target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
        Self::from_carriers(&merge_carrier_params(Some(target), None))
    }
}

/// Issues and validates signed references for one stream.
#[derive(Debug, Clone)]
pub struct AuthorizationGateway {
    codec: Arc<TokenCodec>,
    sessions: Arc<dyn SessionGate>,
    store: Arc<dyn ManifestStore>,
    rewriter: ManifestRewriter,
    carriers: CarrierHeaders,
    ttl_secs: u64,
}

impl AuthorizationGateway {
    /// Create a gateway with the default TTL and carrier header names.
    #[must_use]
    pub fn new(
        codec: TokenCodec,
        sessions: Arc<dyn SessionGate>,
        store: Arc<dyn ManifestStore>,
        rewriter: ManifestRewriter,
    ) -> Self {
        Self {
            codec: Arc::new(codec),
            sessions,
            store,
            rewriter,
            carriers: CarrierHeaders::default(),
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    /// Build a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty secret or invalid header names.
    pub fn from_config(
        config: &GatewayConfig,
        sessions: Arc<dyn SessionGate>,
        store: Arc<dyn ManifestStore>,
    ) -> Result<Self, ConfigError> {
        let codec = TokenCodec::new(config.signing_key()?, config.manifest_path.clone())
            .with_scope(config.signature_scope);
        let rewriter = ManifestRewriter::new(config.segment_suffix.clone())
            .with_base_path(config.segment_base_path());
        let carriers =
            CarrierHeaders::new(&config.original_uri_header, &config.original_args_header)?;

        Ok(Self::new(codec, sessions, store, rewriter)
            .with_carrier_headers(carriers)
            .with_ttl_secs(config.signed_url_ttl_secs))
    }

    /// Use `ttl_secs` as the lifetime of issued URLs.
    #[must_use]
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Read sub-request carriers from the given headers.
    #[must_use]
    pub fn with_carrier_headers(mut self, carriers: CarrierHeaders) -> Self {
        self.carriers = carriers;
        self
    }

    /// The manifest path this gateway protects.
    #[must_use]
    pub fn manifest_path(&self) -> &str {
        self.codec.stream_path()
    }

    /// The token codec.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Mint a signed manifest URL for an authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthenticated`] if the caller has no session.
    pub fn issue(&self, parts: &Parts) -> GatewayResult<SignedReference> {
        if !self.sessions.is_authenticated(parts) {
            warn!(uri = %parts.uri, "Signed URL requested without an authenticated session");
            return Err(GatewayError::Unauthenticated);
        }

        let reference = self.codec.issue(self.manifest_path(), self.ttl_secs);
        info!(
            resource_path = %reference.resource_path,
            expiry = reference.expiry,
            "Issued signed manifest URL"
        );
        Ok(reference)
    }

    /// Check a validation triple.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] if the signature is wrong, the
    /// expiry is malformed, or the reference has expired.
    pub fn validate(&self, request: &ValidationRequest) -> GatewayResult<()> {
        if self
            .codec
            .validate(&request.path, &request.expiry, &request.signature)
        {
            debug!(path = %request.path, "Signed reference accepted");
            Ok(())
        } else {
            warn!(path = %request.path, expiry = %request.expiry, "Signed reference rejected");
            Err(GatewayError::Unauthorized)
        }
    }

    /// Validate a reverse-proxy sub-request from its carrier headers.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedRequest`] if path, expiry or signature
    /// cannot be recovered, and [`GatewayError::Unauthorized`] if the triple
    /// does not validate.
    pub fn validate_subrequest(&self, headers: &HeaderMap) -> GatewayResult<ValidationRequest> {
        let carried = self.carriers.extract(headers);
        let request = ValidationRequest::from_carriers(&carried).inspect_err(|err| {
            warn!(error = %err, "Sub-request is missing validation parameters");
        })?;
        self.validate(&request)?;
        Ok(request)
    }

    /// Validate an inline manifest request and return the rewritten manifest.
    ///
    /// Checks run in order: session, parameters, signature, storage.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthenticated`], [`GatewayError::MalformedRequest`],
    /// [`GatewayError::Unauthorized`] or [`GatewayError::ResourceNotFound`] for
    /// the first check that fails.
    pub async fn serve_manifest(&self, parts: &Parts) -> GatewayResult<String> {
        if !self.sessions.is_authenticated(parts) {
            warn!(uri = %parts.uri, "Manifest requested without an authenticated session");
            return Err(GatewayError::Unauthenticated);
        }

        let request = ValidationRequest::from_uri(&parts.uri)?;
        self.validate(&request)?;

        let manifest_path = self.manifest_path();
        let manifest = self
            .store
            .read_manifest(manifest_path)
            .await
            .map_err(|err| {
                match &err {
                    StorageError::NotFound(_) => warn!(manifest_path, "Manifest not found"),
                    _ => error!(manifest_path, error = %err, "Failed to read manifest"),
                }
                GatewayError::ResourceNotFound(manifest_path.to_owned())
            })?;

        let signer = match self.codec.scope() {
            SignatureScope::Stream => SegmentSigner::Shared {
                expiry: &request.expiry,
                signature: &request.signature,
            },
            SignatureScope::Resource => SegmentSigner::PerResource {
                codec: &self.codec,
                expiry: &request.expiry,
            },
        };

        let rewritten = self.rewriter.rewrite(&manifest, &signer);
        debug!(manifest_path, bytes = rewritten.len(), "Served signed manifest");
        Ok(rewritten)
    }
}
