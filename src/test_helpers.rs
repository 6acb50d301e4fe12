//! Test helper factories and mock state builders
//!
//! Provides convenience functions for creating test objects with sensible defaults,
//! and helpers for building mock `Social` / router instances.
#![allow(dead_code)]

use crate::api::create_router;
use crate::api::handlers::{ServerState, SiteState};
use crate::auth::session::{encode_session, SESSION_COOKIE_NAME};
use crate::neo4j::mock::MockGraphStore;
use crate::neo4j::models::*;
use crate::social::{PostDraft, Social};
use crate::Config;
use axum::http::header;
use axum::response::Response;
use axum::Router;
use std::sync::Arc;

/// Session secret used by every test config
pub const TEST_SECRET: &str = "test-session-secret-minimum-32-chars";

/// bcrypt cost 4 for fast tests
pub const TEST_BCRYPT_COST: u32 = 4;

// ============================================================================
// Mock state builders
// ============================================================================

/// Config pointing at nothing real
pub fn test_config() -> Config {
    Config {
        neo4j_uri: "bolt://mock:7687".to_string(),
        neo4j_user: "neo4j".to_string(),
        neo4j_password: "mock".to_string(),
        server_port: 0,
        public_url: None,
        static_path: "./static".to_string(),
        session_secret: TEST_SECRET.to_string(),
        session_expiry_secs: 3600,
        bcrypt_cost: TEST_BCRYPT_COST,
    }
}

/// Wrap a mock store in a `Social`, keeping a handle for inspection
pub fn social_with(store: MockGraphStore) -> (Social, Arc<MockGraphStore>) {
    let store = Arc::new(store);
    let social = Social::new(store.clone(), TEST_BCRYPT_COST);
    (social, store)
}

/// Store with two similar crime movies, the first one fully described
pub async fn seeded_store() -> MockGraphStore {
    let mut heat = MovieNode::new(1, "Heat");
    heat.year = Some(1995);
    heat.overview = Some("A thief and a detective.".to_string());
    heat.ytlink = Some("https://www.youtube.com/watch?v=xyz".to_string());
    heat.featcrew = Some("['Lead Actor', 'Director']".to_string());

    MockGraphStore::new()
        .with_movie(heat)
        .await
        .with_movie(MovieNode::new(2, "Ronin"))
        .await
        .with_genre(1, "Crime")
        .await
        .with_genre(2, "Crime")
        .await
        .with_keyword(1, "heist")
        .await
        .with_keyword(2, "heist")
        .await
        .with_similar(1, 2)
        .await
}

/// Full router over [`seeded_store`]
pub async fn mock_app() -> (Router, SiteState) {
    let (social, _) = social_with(seeded_store().await);
    let state: SiteState = Arc::new(ServerState {
        social,
        config: Arc::new(test_config()),
    });
    (create_router(state.clone()), state)
}

/// `Cookie` header value for a logged-in user
pub fn login_cookie(state: &ServerState, username: &str) -> String {
    let token = encode_session(username, &state.config.session_secret, 3600)
        .expect("test token encoding should succeed");
    format!("{}={}", SESSION_COOKIE_NAME, token)
}

/// The `Set-Cookie` header for cookie `name`, if the response sets it
pub fn cookie_header(resp: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

/// Read a JSON response body
pub async fn body_json(resp: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&body).expect("body should be JSON")
}

// ============================================================================
// Test data factories
// ============================================================================

/// A movie with a generated title
pub fn test_movie(id: i64) -> MovieNode {
    let mut movie = MovieNode::new(id, format!("Movie {}", id));
    movie.year = Some(2000 + id);
    movie
}

/// A rating-3 review of `movie_id` with raw `tags`
pub fn test_draft(movie_id: i64, tags: &str) -> PostDraft {
    PostDraft {
        title: "Review".to_string(),
        tags: tags.to_string(),
        rating: 3,
        text: "Some thoughts".to_string(),
        movie_id,
    }
}
