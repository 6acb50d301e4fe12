//! Account route handlers: registration, login and logout.
//!
//! Endpoints:
//! - `GET/POST /register` - Create an account (bcrypt-hashed password)
//! - `GET/POST /login`    - Check credentials and set the session cookie
//! - `GET      /logout`   - Clear the session cookie

use crate::api::handlers::{redirect_flash_with, render, render_flash, AppError, SiteState};
use crate::auth::cookies::{build_clear_cookie, build_cookie};
use crate::auth::session::{encode_session, SESSION_COOKIE_NAME};
use crate::auth::Visitor;
use axum::{extract::State, response::Response, Form};
use serde::Deserialize;
use serde_json::json;

/// Form body for POST /register and POST /login
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsForm {
    fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

pub async fn register_page(
    State(state): State<SiteState>,
    visitor: Visitor,
) -> Result<Response, AppError> {
    render(&state, &visitor, json!({ "view": "register" }))
}

/// Create an account, then send the user to the login page
pub async fn register(
    State(state): State<SiteState>,
    visitor: Visitor,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let page = json!({ "view": "register" });
    if !form.is_complete() {
        return render_flash(&state, &visitor, "Please enter a username and password", page);
    }

    let username = form.username.trim();
    if !state.social.user(username).register(&form.password).await? {
        tracing::debug!(username, "Registration rejected: username taken");
        return render_flash(
            &state,
            &visitor,
            "A user with that username already exists.",
            page,
        );
    }

    redirect_flash_with(&state, &visitor, "Successfully Registered.", "/login", vec![])
}

pub async fn login_page(
    State(state): State<SiteState>,
    visitor: Visitor,
) -> Result<Response, AppError> {
    render(&state, &visitor, json!({ "view": "login" }))
}

/// Check credentials and start a session
pub async fn login(
    State(state): State<SiteState>,
    visitor: Visitor,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    let valid = form.is_complete()
        && state
            .social
            .user(username)
            .verify_password(&form.password)
            .await?;

    if !valid {
        tracing::info!(username, "Failed login attempt");
        return render_flash(&state, &visitor, "Invalid login.", json!({ "view": "login" }));
    }

    let token = encode_session(
        username,
        &state.config.session_secret,
        state.config.session_expiry_secs,
    )?;
    let session_cookie = build_cookie(
        SESSION_COOKIE_NAME,
        &token,
        state.config.session_expiry_secs,
        state.secure_cookies(),
    )?;

    tracing::info!(username, "User logged in");
    redirect_flash_with(
        &state,
        &visitor,
        "Successfully logged in.",
        "/",
        vec![session_cookie],
    )
}

/// End the session. Anonymous visitors are simply redirected.
pub async fn logout(
    State(state): State<SiteState>,
    visitor: Visitor,
) -> Result<Response, AppError> {
    let clear = build_clear_cookie(SESSION_COOKIE_NAME, state.secure_cookies())?;
    if let Some(username) = &visitor.username {
        tracing::debug!(username = %username, "User logged out");
    }
    redirect_flash_with(&state, &visitor, "Logged Out", "/", vec![clear])
}
