//! Sub-request validation integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{MANIFEST_PATH, codec, http_client, issue_signed_url, test_user, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_validate_segment_with_manifest_signature() {
        let client = http_client();
        let reference = issue_signed_url(&client, &test_user("validate")).await.unwrap();
        let original = format!(
            "/hls/streamkey/seg3.ts?expiry={}&sig={}",
            reference.expiry, reference.signature
        );

        let response = client
            .get(url("/validate_token"))
            .header("X-Original-URI", original)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["valid"], true);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_merge_supplementary_args() {
        let client = http_client();
        let reference = issue_signed_url(&client, &test_user("args")).await.unwrap();

        let response = client
            .get(url("/validate_token"))
            .header("X-Original-URI", "/hls/streamkey/seg0.ts")
            .header(
                "X-Original-Args",
                format!("expiry={}&sig={}", reference.expiry, reference.signature),
            )
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_missing_carriers() {
        let client = http_client();
        let response = client.get(url("/validate_token")).send().await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["valid"], false);
        assert_eq!(body["error"], "Missing headers");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_forged_and_expired_references() {
        let client = http_client();

        let forged = format!("{MANIFEST_PATH}?expiry=9999999999&sig={}", "0".repeat(64));
        let response = client
            .get(url("/validate_token"))
            .header("X-Original-URI", forged)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let expired = codec().unwrap().issue_until(MANIFEST_PATH, 1);
        let response = client
            .get(url("/validate_token"))
            .header("X-Original-URI", expired.to_url())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
