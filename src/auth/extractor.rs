//! Visitor extractor for Axum handlers.
//!
//! Reads the session and flash cookies of the incoming request. Never
//! rejects: a missing or invalid session simply means an anonymous visitor.

use crate::api::handlers::SiteState;
use crate::auth::cookies::extract_cookie;
use crate::auth::flash::{decode_flashes, FLASH_COOKIE_NAME};
use crate::auth::session::{decode_session, SESSION_COOKIE_NAME};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;

/// The person behind a request.
///
/// ```rust,ignore
/// async fn my_handler(visitor: Visitor) -> impl IntoResponse {
///     format!("Hello, {}!", visitor.username.unwrap_or_default())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Visitor {
    /// Logged-in username, `None` when anonymous
    pub username: Option<String>,
    /// Flash messages waiting to be shown
    pub flashes: Vec<String>,
}

impl Visitor {
    /// Build from request headers
    pub fn from_headers(headers: &HeaderMap, session_secret: &str) -> Self {
        let username = extract_cookie(headers, SESSION_COOKIE_NAME).and_then(|token| {
            match decode_session(&token, session_secret) {
                Ok(claims) => Some(claims.sub),
                Err(e) => {
                    tracing::debug!("Ignoring invalid session cookie: {:#}", e);
                    None
                }
            }
        });
        let flashes = extract_cookie(headers, FLASH_COOKIE_NAME)
            .map(|raw| decode_flashes(&raw))
            .unwrap_or_default();

        Self { username, flashes }
    }
}

impl FromRequestParts<SiteState> for Visitor {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &SiteState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let visitor = Self::from_headers(&parts.headers, &state.config.session_secret);
        async move { Ok(visitor) }
    }
}
