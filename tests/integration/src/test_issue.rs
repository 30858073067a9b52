//! Signed URL issuance integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{MANIFEST_PATH, http_client, issue_signed_url, test_user, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_health() {
        let client = http_client();
        let body: serde_json::Value = client
            .get(url("/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "running");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_issue_without_session() {
        let client = http_client();
        let response = client.get(url("/api/get_signed_url")).send().await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_issue_manifest_url_for_session() {
        let client = http_client();
        let reference = issue_signed_url(&client, &test_user("issue")).await.unwrap();

        assert_eq!(reference.resource_path, MANIFEST_PATH);
        assert_eq!(reference.signature.len(), 64);
        assert!(reference.expiry > 0);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_tag_responses_with_request_id() {
        let client = http_client();
        let response = client.get(url("/health")).send().await.unwrap();

        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            response.headers().get("server").and_then(|v| v.to_str().ok()),
            Some("StreamGate")
        );
    }
}
