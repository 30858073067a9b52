//! Signed, time-limited stream references for StreamGate.
//!
//! A signed reference is a resource path carrying two query parameters:
//! an absolute `expiry` (Unix seconds) and a hex-encoded HMAC-SHA256 `sig`
//! over the canonical message `<path>?expiry=<expiry>`. This crate builds
//! and verifies those references. It performs no I/O.
//!
//! # Usage
//!
//! ```rust
//! use streamgate_auth::{SigningKey, TokenCodec};
//!
//! let key = SigningKey::new("shared-secret").unwrap();
//! let codec = TokenCodec::new(key, "/hls/streamkey/index.m3u8");
//!
//! let reference = codec.issue("/hls/streamkey/index.m3u8", 600);
//! let expiry = reference.expiry.to_string();
//! assert!(codec.validate("/hls/streamkey/seg0.ts", &expiry, &reference.signature));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical message construction and signature scope
//! - [`clock`] - Wall-clock abstraction
//! - [`codec`] - Issuance and verification
//! - [`error`] - Token error types
//! - [`key`] - Shared signing secret
//! - [`reference`] - The signed reference value and its URL encoding

pub mod canonical;
pub mod clock;
pub mod codec;
pub mod error;
pub mod key;
pub mod reference;

pub use canonical::{SignatureScope, canonical_message};
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::TokenCodec;
pub use error::TokenError;
pub use key::SigningKey;
pub use reference::SignedReference;
