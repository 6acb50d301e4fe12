//! One-shot flash messages carried in a cookie between a redirect and the
//! next rendered view.

use anyhow::{Context, Result};

/// Cookie name for pending flash messages.
pub const FLASH_COOKIE_NAME: &str = "flash";

/// Lifetime of an unread flash cookie
pub const FLASH_MAX_AGE_SECS: u64 = 300;

/// Serialize messages into a cookie-safe value
pub fn encode_flashes(messages: &[String]) -> Result<String> {
    let json = serde_json::to_string(messages).context("Failed to serialize flashes")?;
    Ok(urlencoding::encode(&json).into_owned())
}

/// Parse a flash cookie value. Unreadable values yield no messages.
pub fn decode_flashes(raw: &str) -> Vec<String> {
    urlencoding::decode(raw)
        .ok()
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}
