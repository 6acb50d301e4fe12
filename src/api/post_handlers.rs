//! Review route handlers: publishing and liking posts.

use crate::api::handlers::{back_to, redirect_flash, AppError, SiteState};
use crate::auth::Visitor;
use crate::social::tags::parse_tags;
use crate::social::PostDraft;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
    Form,
};
use serde::Deserialize;

/// Form body for POST /add_post
#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "movieID")]
    pub movie_id: String,
}

/// Why a review form was rejected. The message is shown to the user as is.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PostFormError {
    #[error("you must fill the form out correctly")]
    MissingField(&'static str),
    #[error("you must fill the form out correctly")]
    InvalidRating(String),
    #[error("you must fill the form out correctly")]
    InvalidMovieId(String),
}

impl TryFrom<PostForm> for PostDraft {
    type Error = PostFormError;

    fn try_from(form: PostForm) -> Result<Self, Self::Error> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(PostFormError::MissingField("title"));
        }
        if parse_tags(&form.tags).is_empty() {
            return Err(PostFormError::MissingField("tags"));
        }
        let rating_raw = form.rating.trim();
        if rating_raw.is_empty() {
            return Err(PostFormError::MissingField("rating"));
        }
        let rating = rating_raw
            .parse::<i64>()
            .map_err(|_| PostFormError::InvalidRating(rating_raw.to_string()))?;
        let movie_id = form
            .movie_id
            .trim()
            .parse::<i64>()
            .map_err(|_| PostFormError::InvalidMovieId(form.movie_id.clone()))?;

        Ok(PostDraft {
            title: title.to_string(),
            tags: form.tags,
            rating,
            text: form.text,
            movie_id,
        })
    }
}

/// Publish a review, then go back to the page the form was on
pub async fn add_post(
    State(state): State<SiteState>,
    visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let Some(username) = visitor.username.as_deref() else {
        return redirect_flash(
            &state,
            &visitor,
            "You must be logged in to post a review",
            "/login",
        );
    };
    let back = back_to(&headers);

    let draft = match PostDraft::try_from(form) {
        Ok(draft) => draft,
        Err(e) => {
            tracing::debug!(username, error = ?e, "Rejected post form");
            return redirect_flash(&state, &visitor, &e.to_string(), &back);
        }
    };

    let message = match state.social.user(username).add_post(draft).await? {
        Some(_) => "post added",
        None => "Film isn't in database",
    };
    redirect_flash(&state, &visitor, message, &back)
}

/// Like a post, then go back
pub async fn like_post(
    State(state): State<SiteState>,
    visitor: Visitor,
    headers: HeaderMap,
    Path(postid): Path<String>,
) -> Result<Response, AppError> {
    let Some(username) = visitor.username.as_deref() else {
        return redirect_flash(
            &state,
            &visitor,
            "You must be logged in to like a post",
            "/login",
        );
    };

    if !state.social.user(username).like_post(&postid).await? {
        tracing::debug!(username, postid = %postid, "Like ignored: unknown post");
    }
    redirect_flash(&state, &visitor, "Liked Post!", &back_to(&headers))
}
