//! Signed-reference authorization for segmented video streams.
//!
//! This crate implements the gateway that sits in front of an HLS stream:
//!
//! - [`gateway`]: [`AuthorizationGateway`] issues signed manifest URLs to
//!   authenticated callers, validates signed references presented inline or
//!   through a reverse-proxy sub-request, and serves the rewritten manifest.
//! - [`rewriter`]: [`ManifestRewriter`] turns every segment line of a manifest
//!   into a signed reference.
//! - [`subrequest`]: parsing of the carrier headers a reverse proxy uses to
//!   forward the original request.
//! - [`session`]: the [`SessionGate`] capability answering "is this caller an
//!   authenticated end user".
//! - [`storage`]: the [`ManifestStore`] collaborator the manifest is read from.
//! - [`config`]: environment-driven [`GatewayConfig`].
//! - [`error`]: the [`GatewayError`] taxonomy and its HTTP status mapping.

pub mod config;
pub mod error;
pub mod gateway;
pub mod rewriter;
pub mod session;
pub mod storage;
pub mod subrequest;

pub use config::{ConfigError, GatewayConfig};
pub use error::{GatewayError, GatewayResult, StorageError};
pub use gateway::{AuthorizationGateway, ValidationRequest};
pub use rewriter::{ManifestRewriter, SegmentSigner};
pub use session::{FixedSessionGate, SessionGate, TrustedHeaderSessionGate};
pub use storage::{FsManifestStore, ManifestStore, MemoryManifestStore};
pub use subrequest::{CarrierHeaders, CarrierParams, merge_carrier_params};
