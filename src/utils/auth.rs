//! Authentication header helper for completion requests.

/// Attach the bearer credential expected by OpenAI-compatible services.
pub fn add_auth_headers(request: reqwest::RequestBuilder, api_key: &str) -> reqwest::RequestBuilder {
    request.bearer_auth(api_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_bearer_authorization() {
        let client = reqwest::Client::new();
        let request = add_auth_headers(client.get("https://example.com"), "test-key")
            .build()
            .unwrap();
        let header = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        assert_eq!(header, Some("Bearer test-key"));
    }
}
