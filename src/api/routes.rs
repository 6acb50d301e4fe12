//! Site route definitions

use super::account_handlers;
use super::handlers::{self, SiteState};
use super::post_handlers;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the site router
pub fn create_router(state: SiteState) -> Router {
    let static_files = ServeDir::new(&state.config.static_path);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // ====================================================================
        // Pages
        // ====================================================================
        .route("/", get(handlers::index))
        .route("/profile/{username}", get(handlers::profile))
        .route("/movie/{movie_id}", get(handlers::movie))
        .route("/results", post(handlers::results))
        // ====================================================================
        // Accounts
        // ====================================================================
        .route(
            "/register",
            get(account_handlers::register_page).post(account_handlers::register),
        )
        .route(
            "/login",
            get(account_handlers::login_page).post(account_handlers::login),
        )
        .route("/logout", get(account_handlers::logout))
        // ====================================================================
        // Reviews
        // ====================================================================
        .route("/add_post", post(post_handlers::add_post))
        .route("/like_post/{postid}", get(post_handlers::like_post))
        // Static assets
        .nest_service("/static", static_files)
        .fallback(handlers::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
