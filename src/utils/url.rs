//! Helpers for building completion endpoint URLs.

/// Strip trailing slashes so endpoints can be appended without doubling them.
///
/// ```
/// use ponder::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.groq.com/openai/v1/"), "https://api.groq.com/openai/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use ponder::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.groq.com/openai/v1/", "/chat/completions"),
///     "https://api.groq.com/openai/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Check that a user-supplied base URL is an absolute http(s) URL and return
/// it normalized.
pub fn validate_base_url(base_url: &str) -> Result<String, String> {
    let normalized = normalize_base_url(base_url);
    let parsed = reqwest::Url::parse(&normalized)
        .map_err(|err| format!("Invalid base URL '{base_url}': {err}"))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(normalized),
        _ => Err(format!(
            "Invalid base URL '{base_url}': expected an http:// or https:// address"
        )),
    }
}
