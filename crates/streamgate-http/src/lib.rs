//! HTTP routing, responses, and hyper service for StreamGate.
//!
//! This crate exposes the [`AuthorizationGateway`](streamgate_core::AuthorizationGateway)
//! over HTTP:
//!
//! - **Routing** ([`router`]): maps method and path onto a [`GatewayRoute`].
//! - **Responses** ([`response`]): JSON bodies for API callers, the rewritten
//!   manifest or plain-text errors for the manifest endpoint, all buffered in
//!   a [`GatewayResponseBody`].
//! - **Service** ([`service`]): [`GatewayHttpService`], hyper's `Service`
//!   tying routing and the gateway together.
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> GatewayHttpService (hyper Service)
//!     -> GatewayRouter (health / issue / validate / manifest)
//!     -> AuthorizationGateway
//!     -> Common response headers (x-request-id, Server)
//!   <- HTTP Response
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use streamgate_core::{AuthorizationGateway, FsManifestStore, GatewayConfig, TrustedHeaderSessionGate};
//! use streamgate_http::GatewayHttpService;
//!
//! let config = GatewayConfig::from_env();
//! let sessions = TrustedHeaderSessionGate::from_name(&config.session_user_header).unwrap();
//! let store = FsManifestStore::new(&config.storage_root);
//! let gateway = AuthorizationGateway::from_config(&config, Arc::new(sessions), Arc::new(store)).unwrap();
//! let service = GatewayHttpService::new(gateway);
//! // Use `service` with hyper server.
//! ```

pub mod response;
pub mod router;
pub mod service;

pub use response::GatewayResponseBody;
pub use router::{GatewayRoute, GatewayRouter, RouteError};
pub use service::GatewayHttpService;
