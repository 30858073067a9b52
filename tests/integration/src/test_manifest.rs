//! Signed manifest integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{
        MANIFEST_PATH, SESSION_HEADER, codec, http_client, install_manifest, issue_signed_url,
        test_user, url,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_serve_manifest_with_signed_segments() {
        install_manifest("#EXTM3U\n#EXTINF:9,\nseg0.ts\n#EXT-X-ENDLIST").unwrap();
        let client = http_client();
        let user = test_user("manifest");
        let reference = issue_signed_url(&client, &user).await.unwrap();

        let response = client
            .get(url(&reference.to_url()))
            .header(SESSION_HEADER, &user)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.text().await.unwrap();
        let segment = body
            .lines()
            .find(|line| line.contains("seg0.ts"))
            .expect("segment line present");
        assert!(segment.ends_with(&format!(
            "seg0.ts?expiry={}&sig={}",
            reference.expiry, reference.signature
        )));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_manifest_without_session() {
        let client = http_client();
        let reference = issue_signed_url(&client, &test_user("anon")).await.unwrap();

        let response = client.get(url(&reference.to_url())).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_expired_manifest_url() {
        let client = http_client();
        let expired = codec().unwrap().issue_until(MANIFEST_PATH, 1);

        let response = client
            .get(url(&expired.to_url()))
            .header(SESSION_HEADER, test_user("expired"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.text().await.unwrap(), "Invalid or expired signature");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_manifest_without_signature() {
        let client = http_client();
        let response = client
            .get(url(MANIFEST_PATH))
            .header(SESSION_HEADER, test_user("unsigned"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
