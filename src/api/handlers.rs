//! Site request handlers: shared state, errors, view helpers and the read-only pages

use crate::auth::cookies::{build_clear_cookie, build_cookie, should_set_secure};
use crate::auth::flash::{encode_flashes, FLASH_COOKIE_NAME, FLASH_MAX_AGE_SECS};
use crate::auth::Visitor;
use crate::neo4j::models::{RatedMode, SearchKind};
use crate::social::movie::{embed_trailer_link, parse_cast};
use crate::social::{feed, Social};
use crate::Config;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Posts shown on the index, profile and movie pages
pub const FEED_SIZE: usize = 5;

/// Shared server state
pub struct ServerState {
    pub social: Social,
    pub config: Arc<Config>,
}

/// Shared site state
pub type SiteState = Arc<ServerState>;

impl ServerState {
    /// Whether cookies carry the `Secure` flag
    pub fn secure_cookies(&self) -> bool {
        should_set_secure(self.config.public_url.as_deref())
    }
}

// ============================================================================
// Views and redirects
// ============================================================================

/// Attach `Set-Cookie` headers to a response
pub(crate) fn with_cookies(response: impl IntoResponse, cookies: Vec<HeaderValue>) -> Response {
    let mut response = response.into_response();
    for cookie in cookies {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

fn flash_cookie(state: &ServerState, flashes: &[String]) -> Result<HeaderValue, AppError> {
    let secure = state.secure_cookies();
    let cookie = if flashes.is_empty() {
        build_clear_cookie(FLASH_COOKIE_NAME, secure)?
    } else {
        build_cookie(
            FLASH_COOKIE_NAME,
            &encode_flashes(flashes)?,
            FLASH_MAX_AGE_SECS,
            secure,
        )?
    };
    Ok(cookie)
}

fn view_with(
    state: &ServerState,
    visitor: &Visitor,
    flashes: Vec<String>,
    mut body: Value,
) -> Result<Response, AppError> {
    if let Value::Object(map) = &mut body {
        map.insert("username".into(), json!(visitor.username));
        map.insert("flashes".into(), json!(flashes));
    }
    let cookies = if visitor.flashes.is_empty() {
        vec![]
    } else {
        vec![flash_cookie(state, &[])?]
    };
    Ok(with_cookies(Json(body), cookies))
}

/// Render a view, consuming the visitor's pending flashes
pub(crate) fn render(state: &ServerState, visitor: &Visitor, body: Value) -> Result<Response, AppError> {
    view_with(state, visitor, visitor.flashes.clone(), body)
}

/// Render a view with one extra flash shown immediately
pub(crate) fn render_flash(
    state: &ServerState,
    visitor: &Visitor,
    message: &str,
    body: Value,
) -> Result<Response, AppError> {
    let mut flashes = visitor.flashes.clone();
    flashes.push(message.to_string());
    view_with(state, visitor, flashes, body)
}

/// Queue a flash and redirect to `to`
pub(crate) fn redirect_flash(
    state: &ServerState,
    visitor: &Visitor,
    message: &str,
    to: &str,
) -> Result<Response, AppError> {
    redirect_flash_with(state, visitor, message, to, vec![])
}

/// Like [`redirect_flash`] with additional cookies (session changes)
pub(crate) fn redirect_flash_with(
    state: &ServerState,
    visitor: &Visitor,
    message: &str,
    to: &str,
    mut cookies: Vec<HeaderValue>,
) -> Result<Response, AppError> {
    let mut flashes = visitor.flashes.clone();
    flashes.push(message.to_string());
    cookies.push(flash_cookie(state, &flashes)?);
    Ok(with_cookies(Redirect::to(to), cookies))
}

/// Local path of the referring page, or `/`.
///
/// Only the path and query are kept so a forged Referer cannot redirect
/// off-site.
pub(crate) fn back_to(headers: &HeaderMap) -> String {
    let Some(referer) = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<axum::http::Uri>().ok())
    else {
        return "/".to_string();
    };

    match referer.path_and_query() {
        Some(pq) if pq.as_str().starts_with('/') && !pq.as_str().starts_with("//") => {
            pq.as_str().to_string()
        }
        _ => "/".to_string(),
    }
}

// ============================================================================
// Health check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health(State(state): State<SiteState>) -> (StatusCode, Json<HealthResponse>) {
    let neo4j_ok = state.social.store().health_check().await.unwrap_or(false);

    let (http_status, status) = if neo4j_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

// ============================================================================
// Pages
// ============================================================================

/// Front page: latest posts plus the top and trending rankings
pub async fn index(State(state): State<SiteState>, visitor: Visitor) -> Result<Response, AppError> {
    let posts = feed::todays_recent_posts(state.social.store(), FEED_SIZE).await?;
    let movies = state.social.movies();
    let top_rated = movies.rated_films(RatedMode::Top).await?;
    let trending = movies.rated_films(RatedMode::Trending).await?;

    render(
        &state,
        &visitor,
        json!({
            "view": "index",
            "posts": posts,
            "top_rated": top_rated,
            "trending": trending,
        }),
    )
}

/// A user's page. Similar users are only listed on one's own profile.
pub async fn profile(
    State(state): State<SiteState>,
    visitor: Visitor,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let user = state.social.user(username.as_str());
    let Some(userid) = user.get_userid().await? else {
        return redirect_flash(&state, &visitor, "User not found", "/");
    };

    let movies = state.social.movies();
    let posts = user.recent_posts(FEED_SIZE).await?;
    let trending = movies.rated_films(RatedMode::Trending).await?;
    let recommendations = movies.recommend_films(userid).await?;
    let recent_recommendations = movies.recommend_recent_films(userid).await?;
    let similar = if visitor.username.as_deref() == Some(username.as_str()) {
        user.get_similar_users().await?
    } else {
        vec![]
    };

    render(
        &state,
        &visitor,
        json!({
            "view": "profile",
            "profile": username,
            "posts": posts,
            "similar": similar,
            "recommendations": recommendations,
            "recent_recommendations": recent_recommendations,
            "trending": trending,
        }),
    )
}

/// A movie's page with details, cast, reviews and similar films
pub async fn movie(
    State(state): State<SiteState>,
    visitor: Visitor,
    Path(movie_id): Path<String>,
) -> Result<Response, AppError> {
    let movies = state.social.movies();
    let details = match movie_id.trim().parse::<i64>() {
        Ok(id) => movies.get_film_data(id).await?,
        Err(_) => None,
    };
    let Some(details) = details else {
        return redirect_flash(&state, &visitor, "Film isn't in database", "/");
    };

    let id = details.movie.movie_id;
    let genres = movies.get_film_genres(id).await?;
    let posts = movies.movie_recent_posts(FEED_SIZE, id).await?;
    let similar = movies.get_similar_films(id).await?;
    let film = &details.movie;

    render(
        &state,
        &visitor,
        json!({
            "view": "movie",
            "movieID": film.movie_id,
            "title": film.title,
            "year": film.year,
            "overview": film.overview,
            "poster": film.poster,
            "lang": film.lang,
            "runtime": film.runtime,
            "budget": film.budget,
            "revenue": film.revenue,
            "ytlink": film.ytlink.as_deref().map(embed_trailer_link),
            "featcrew": parse_cast(film.featcrew.as_deref()),
            "genres": genres,
            "keywords": details.keywords,
            "posts": posts,
            "similar": similar,
        }),
    )
}

/// Search form fields
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub searchobj: String,
}

/// Search results for users or movies
pub async fn results(
    State(state): State<SiteState>,
    visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    let text = form.title.trim();
    if text.is_empty() {
        return redirect_flash(&state, &visitor, "Please enter Text", &back_to(&headers));
    }
    let Ok(kind) = form.searchobj.parse::<SearchKind>() else {
        return redirect_flash(
            &state,
            &visitor,
            "Please enter Search Query",
            &back_to(&headers),
        );
    };

    let hits = feed::query_search(state.social.store(), kind, text).await?;

    render(
        &state,
        &visitor,
        json!({
            "view": "results",
            "searchobj": kind.to_string(),
            "results": hits,
        }),
    )
}

// ============================================================================
// Error handling
// ============================================================================

/// API error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}
