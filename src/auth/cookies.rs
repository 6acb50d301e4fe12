//! Cookie header helpers.
//!
//! Cookie format: `<name>=<value>; HttpOnly; SameSite=Lax; Path=/; Max-Age=<n>[; Secure]`

use anyhow::{Context, Result};
use axum::http::{header, HeaderMap, HeaderValue};

/// Build a `Set-Cookie` header value.
///
/// `value` must already be cookie-safe (no `;`, whitespace or non-ASCII).
pub fn build_cookie(name: &str, value: &str, max_age_secs: u64, is_secure: bool) -> Result<HeaderValue> {
    let secure_flag = if is_secure { "; Secure" } else { "" };
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        name, value, max_age_secs, secure_flag
    );
    HeaderValue::from_str(&cookie).with_context(|| format!("Invalid value for cookie {}", name))
}

/// Build a `Set-Cookie` header that deletes cookie `name`.
pub fn build_clear_cookie(name: &str, is_secure: bool) -> Result<HeaderValue> {
    build_cookie(name, "", 0, is_secure)
}

/// Find cookie `name` across all `Cookie` headers.
///
/// Empty values are treated as absent.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|part| part.trim().strip_prefix(prefix.as_str()))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Determine whether the `Secure` flag should be set on cookies.
///
/// True only when the site is served over HTTPS.
pub fn should_set_secure(public_url: Option<&str>) -> bool {
    public_url.is_some_and(|url| url.starts_with("https://"))
}
