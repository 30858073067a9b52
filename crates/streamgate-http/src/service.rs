//! The gateway HTTP service implementing hyper's `Service` trait.
//!
//! [`GatewayHttpService`] routes each request and hands it to the
//! [`AuthorizationGateway`]:
//!
//! 1. Health check (`GET /health`, `GET /_health`)
//! 2. Issuance (`GET /api/get_signed_url`)
//! 3. Sub-request validation (`GET /validate_token`)
//! 4. Signed manifest (`GET <manifest path>?expiry=..&sig=..`)
//! 5. Common response headers (`x-request-id`, `Server`)
//!
//! Request bodies are never read; every endpoint works from the request line
//! and headers alone.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyper::service::Service;
use streamgate_core::AuthorizationGateway;
use tracing::{debug, info};
use uuid::Uuid;

use crate::response::{
    GatewayResponseBody, health_response, issue_error_response, manifest_error_response,
    manifest_response, method_not_allowed_response, not_found_response, signed_url_response,
    validation_response,
};
use crate::router::{GatewayRoute, GatewayRouter, RouteError};

/// Version reported by the health endpoint.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The StreamGate HTTP service.
#[derive(Debug, Clone)]
pub struct GatewayHttpService {
    gateway: Arc<AuthorizationGateway>,
    router: GatewayRouter,
}

impl GatewayHttpService {
    /// Create a service around `gateway`.
    #[must_use]
    pub fn new(gateway: AuthorizationGateway) -> Self {
        Self::from_shared(Arc::new(gateway))
    }

    /// Create a service around a shared gateway.
    #[must_use]
    pub fn from_shared(gateway: Arc<AuthorizationGateway>) -> Self {
        let router = GatewayRouter::new(gateway.manifest_path());
        Self { gateway, router }
    }

    /// Route and answer one request.
    pub async fn handle_request(
        &self,
        parts: &http::request::Parts,
        request_id: &str,
    ) -> http::Response<GatewayResponseBody> {
        debug!(method = %parts.method, uri = %parts.uri, request_id, "processing gateway request");

        let route = match self.router.resolve(&parts.method, parts.uri.path()) {
            Ok(route) => route,
            Err(RouteError::NotFound) => {
                debug!(path = parts.uri.path(), request_id, "no route");
                return not_found_response();
            }
            Err(RouteError::MethodNotAllowed) => return method_not_allowed_response(),
        };

        let response = match route {
            GatewayRoute::Health => health_response(VERSION),
            GatewayRoute::IssueSignedUrl => match self.gateway.issue(parts) {
                Ok(reference) => signed_url_response(&reference),
                Err(err) => issue_error_response(&err),
            },
            GatewayRoute::ValidateToken => {
                let outcome = self.gateway.validate_subrequest(&parts.headers);
                validation_response(outcome.as_ref().map(|_| ()))
            }
            GatewayRoute::Manifest => match self.gateway.serve_manifest(parts).await {
                Ok(manifest) => manifest_response(manifest),
                Err(err) => manifest_error_response(&err),
            },
        };

        info!(%route, status = response.status().as_u16(), request_id, "handled gateway request");
        response
    }
}

impl<B> Service<http::Request<B>> for GatewayHttpService
where
    B: Send + 'static,
{
    type Response = http::Response<GatewayResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let service = self.clone();

        Box::pin(async move {
            let request_id = Uuid::new_v4().to_string();
            let (parts, body) = req.into_parts();
            drop(body);

            let response = service.handle_request(&parts, &request_id).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Add headers present on every response.
fn add_common_headers(
    mut response: http::Response<GatewayResponseBody>,
    request_id: &str,
) -> http::Response<GatewayResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::header::HeaderValue::from_str(request_id) {
        headers.insert("x-request-id", hv);
    }
    headers.insert(
        "Server",
        http::header::HeaderValue::from_static("StreamGate"),
    );

    response
}
