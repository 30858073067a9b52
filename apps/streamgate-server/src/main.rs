//! StreamGate Server - HLS authorization gateway.
//!
//! This binary serves the `streamgate-http` service: it issues short-lived
//! signed manifest URLs to authenticated users, answers reverse-proxy
//! sub-requests for segment authorization, and serves the stream manifest
//! with every segment reference signed.
//!
//! # Usage
//!
//! ```text
//! STREAM_SIGNING_SECRET=... GATEWAY_LISTEN=0.0.0.0:5000 streamgate-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:5000` | Bind address |
//! | `STREAM_SIGNING_SECRET` | *(required)* | Shared HMAC secret |
//! | `STREAM_MANIFEST_PATH` | `/hls/streamkey/index.m3u8` | Protected manifest |
//! | `STREAM_STORAGE_ROOT` | `/tmp` | Directory manifests are read from |
//! | `STREAM_SEGMENT_SUFFIX` | `.ts` | Segment line suffix |
//! | `SIGNED_URL_TTL_SECS` | `600` | Lifetime of issued URLs |
//! | `SIGNATURE_SCOPE` | `stream` | `stream` or `resource` |
//! | `SESSION_USER_HEADER` | `X-Authenticated-User` | Header set by the identity proxy |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use streamgate_core::{
    AuthorizationGateway, FsManifestStore, GatewayConfig, TrustedHeaderSessionGate,
};
use streamgate_http::GatewayHttpService;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the [`AuthorizationGateway`] from configuration.
///
/// Manifests are read from `storage_root`; sessions are trusted from the
/// configured identity header.
fn build_gateway(config: &GatewayConfig) -> Result<AuthorizationGateway> {
    let sessions = TrustedHeaderSessionGate::from_name(&config.session_user_header)
        .context("invalid session configuration")?;
    let store = FsManifestStore::new(&config.storage_root);

    AuthorizationGateway::from_config(config, Arc::new(sessions), Arc::new(store))
        .context("invalid gateway configuration")
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: GatewayHttpService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by connecting to the gateway and requesting the health endpoint.
///
/// Exits with code 0 if healthy, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    // Keep the write half open: hyper drops a half-closed connection unanswered.
    writer.write_all(request.as_bytes()).await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let config = GatewayConfig::from_env();
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let config = GatewayConfig::from_env();

    init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        manifest_path = %config.manifest_path,
        storage_root = %config.storage_root,
        signature_scope = %config.signature_scope,
        signed_url_ttl_secs = config.signed_url_ttl_secs,
        version = VERSION,
        "starting StreamGate Server",
    );

    let gateway = build_gateway(&config)?;
    let service = GatewayHttpService::new(gateway);

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
