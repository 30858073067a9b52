//! Integration tests for StreamGate server.
//!
//! These tests require a running StreamGate server at `localhost:5000`,
//! started with the same `STREAM_SIGNING_SECRET` and `STREAM_STORAGE_ROOT`
//! as the test process. They are marked `#[ignore]` so they don't run during
//! normal `cargo test`.
//!
//! Run them with:
//! ```text
//! STREAM_SIGNING_SECRET=supersecretkey cargo run -p streamgate-server &
//! STREAM_SIGNING_SECRET=supersecretkey cargo test -p streamgate-integration -- --ignored
//! ```

use std::path::PathBuf;
use std::sync::Once;

use anyhow::{Context, Result};
use streamgate_auth::{SignedReference, SigningKey, TokenCodec};

static INIT: Once = Once::new();

/// Manifest path the server protects by default.
pub const MANIFEST_PATH: &str = "/hls/streamkey/index.m3u8";

/// Header the identity proxy sets for authenticated users.
pub const SESSION_HEADER: &str = "X-Authenticated-User";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("STREAMGATE_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:5000".to_owned())
}

/// Build an absolute URL for `path_and_query` on the server.
#[must_use]
pub fn url(path_and_query: &str) -> String {
    format!("{}{path_and_query}", endpoint_url())
}

/// Create an HTTP client for talking to the server.
#[must_use]
pub fn http_client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// A codec sharing the server's secret, for minting references directly.
pub fn codec() -> Result<TokenCodec> {
    let secret =
        std::env::var("STREAM_SIGNING_SECRET").unwrap_or_else(|_| "supersecretkey".to_owned());
    let key = SigningKey::new(secret).context("invalid signing secret")?;
    Ok(TokenCodec::new(key, MANIFEST_PATH))
}

/// Generate a unique user name for a test session.
#[must_use]
pub fn test_user(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("{prefix}-{id}")
}

/// Write `manifest` where the server will read the default manifest from.
pub fn install_manifest(manifest: &str) -> Result<PathBuf> {
    let root = std::env::var("STREAM_STORAGE_ROOT").unwrap_or_else(|_| "/tmp".to_owned());
    let path = PathBuf::from(root).join(MANIFEST_PATH.trim_start_matches('/'));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, manifest).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "installed test manifest");
    Ok(path)
}

/// Request a signed manifest URL as `user`.
pub async fn issue_signed_url(client: &reqwest::Client, user: &str) -> Result<SignedReference> {
    let body: serde_json::Value = client
        .get(url("/api/get_signed_url"))
        .header(SESSION_HEADER, user)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let signed_url = body["signed_url"]
        .as_str()
        .context("response has no signed_url")?;
    tracing::info!(user, signed_url, "issued signed url");
    Ok(SignedReference::parse(signed_url)?)
}

mod test_issue;
mod test_manifest;
mod test_validate;
