//! Response construction.
//!
//! API callers (issuance and sub-request validation) receive JSON; the
//! manifest endpoint answers with the manifest itself or a short plain-text
//! error.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use serde_json::json;
use streamgate_auth::SignedReference;
use streamgate_core::GatewayError;

/// Body of every gateway response. Responses are small and fully buffered;
/// segment bytes never pass through the gateway.
pub type GatewayResponseBody = Full<Bytes>;

/// Content type of HLS manifests.
pub const HLS_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Content type of JSON responses.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type of plain-text responses.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Build a JSON response.
#[must_use]
pub fn json_response(
    status: StatusCode,
    value: &serde_json::Value,
) -> http::Response<GatewayResponseBody> {
    let json = serde_json::to_vec(value).expect("JSON serialization of a Value cannot fail");
    http::Response::builder()
        .status(status)
        .header("Content-Type", JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from(json)))
        .expect("valid JSON response")
}

/// Build a plain-text response.
#[must_use]
pub fn text_response(status: StatusCode, text: &str) -> http::Response<GatewayResponseBody> {
    http::Response::builder()
        .status(status)
        .header("Content-Type", TEXT_CONTENT_TYPE)
        .body(Full::new(Bytes::copy_from_slice(text.as_bytes())))
        .expect("valid text response")
}

/// `200 {"signed_url": ...}`.
#[must_use]
pub fn signed_url_response(reference: &SignedReference) -> http::Response<GatewayResponseBody> {
    json_response(StatusCode::OK, &json!({ "signed_url": reference.to_url() }))
}

/// Error response for the issuance endpoint.
#[must_use]
pub fn issue_error_response(error: &GatewayError) -> http::Response<GatewayResponseBody> {
    let message = match error {
        GatewayError::Unauthenticated => "Unauthorized".to_owned(),
        other => other.to_string(),
    };
    json_response(error.status_code(), &json!({ "error": message }))
}

/// Response for the sub-request validation endpoint.
///
/// `200 {"valid": true}` on success, `400 {"valid": false, "error": "Missing
/// headers"}` when parameters are missing, and `{"valid": false}` with the
/// error's status otherwise.
#[must_use]
pub fn validation_response(outcome: Result<(), &GatewayError>) -> http::Response<GatewayResponseBody> {
    match outcome {
        Ok(()) => json_response(StatusCode::OK, &json!({ "valid": true })),
        Err(err) if matches!(err, GatewayError::MalformedRequest(_)) => json_response(
            err.status_code(),
            &json!({ "valid": false, "error": "Missing headers" }),
        ),
        Err(err) => json_response(err.status_code(), &json!({ "valid": false })),
    }
}

/// `200` with the rewritten manifest.
#[must_use]
pub fn manifest_response(manifest: String) -> http::Response<GatewayResponseBody> {
    http::Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", HLS_CONTENT_TYPE)
        .header("Cache-Control", "no-store")
        .body(Full::new(Bytes::from(manifest)))
        .expect("valid manifest response")
}

/// Plain-text error response for the manifest endpoint.
#[must_use]
pub fn manifest_error_response(error: &GatewayError) -> http::Response<GatewayResponseBody> {
    let text = match error {
        GatewayError::Unauthenticated => "Unauthorized",
        GatewayError::MalformedRequest(_) => "Missing parameters",
        GatewayError::Unauthorized => "Invalid or expired signature",
        GatewayError::ResourceNotFound(_) => "Playlist not found",
    };
    text_response(error.status_code(), text)
}

/// Liveness response.
#[must_use]
pub fn health_response(version: &str) -> http::Response<GatewayResponseBody> {
    json_response(
        StatusCode::OK,
        &json!({ "status": "running", "version": version }),
    )
}

/// `404 {"error": "Not found"}`.
#[must_use]
pub fn not_found_response() -> http::Response<GatewayResponseBody> {
    json_response(StatusCode::NOT_FOUND, &json!({ "error": "Not found" }))
}

/// `405 {"error": "Method not allowed"}`.
#[must_use]
pub fn method_not_allowed_response() -> http::Response<GatewayResponseBody> {
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &json!({ "error": "Method not allowed" }),
    );
    response
        .headers_mut()
        .insert("Allow", http::HeaderValue::from_static("GET, HEAD"));
    response
}

#[cfg(test)]
mod tests {
    use http_body::Body;
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: http::Response<GatewayResponseBody>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn content_type(response: &http::Response<GatewayResponseBody>) -> Option<&str> {
        response
            .headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_should_render_signed_url() {
        let reference = SignedReference {
            resource_path: "/hls/streamkey/index.m3u8".to_owned(),
            expiry: 42,
            signature: "ab".to_owned(),
        };
        let response = signed_url_response(&reference);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "signed_url": "/hls/streamkey/index.m3u8?expiry=42&sig=ab" })
        );
    }

    #[tokio::test]
    async fn test_should_render_issue_error() {
        let response = issue_error_response(&GatewayError::Unauthenticated);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn test_should_render_validation_outcomes() {
        let ok = validation_response(Ok(()));
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(body_json(ok).await, json!({ "valid": true }));

        let missing =
            validation_response(Err(&GatewayError::MalformedRequest("sig".to_owned())));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(missing).await,
            json!({ "valid": false, "error": "Missing headers" })
        );

        let denied = validation_response(Err(&GatewayError::Unauthorized));
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(denied).await, json!({ "valid": false }));
    }

    #[test]
    fn test_should_render_manifest_with_hls_content_type() {
        let response = manifest_response("#EXTM3U".to_owned());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), Some(HLS_CONTENT_TYPE));
    }

    #[test]
    fn test_should_render_manifest_errors_as_text() {
        let cases = [
            (GatewayError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                GatewayError::MalformedRequest("sig".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (GatewayError::Unauthorized, StatusCode::FORBIDDEN),
            (
                GatewayError::ResourceNotFound("/x".to_owned()),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (error, status) in cases {
            let response = manifest_error_response(&error);
            assert_eq!(response.status(), status);
            assert_eq!(content_type(&response), Some(TEXT_CONTENT_TYPE));
        }
    }

    #[test]
    fn test_should_advertise_allowed_methods() {
        let response = method_not_allowed_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get("Allow").and_then(|v| v.to_str().ok()),
            Some("GET, HEAD")
        );
    }

    #[test]
    fn test_should_buffer_manifest_body_with_exact_size() {
        let manifest = "#EXTM3U\n/hls/streamkey/seg0.ts?expiry=1&sig=ab".to_owned();
        let len = u64::try_from(manifest.len()).unwrap();
        let response = manifest_response(manifest);
        assert_eq!(response.body().size_hint().exact(), Some(len));
        assert!(!response.body().is_end_stream());
    }
}
