//! User entity: registration, login, posting and likes

use super::tags::parse_tags;
use super::Social;
use crate::neo4j::models::{NewPost, PostNode, PostSummary, SimilarUser, UserNode};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// How many similar users the profile page shows
pub const SIMILAR_USERS_LIMIT: usize = 5;

/// Form input for a new review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    /// Raw comma-separated tags as typed by the user
    pub tags: String,
    pub rating: i64,
    pub text: String,
    pub movie_id: i64,
}

/// A user identified by username
pub struct User<'a> {
    social: &'a Social,
    username: String,
}

impl<'a> User<'a> {
    pub(crate) fn new(social: &'a Social, username: impl Into<String>) -> Self {
        Self {
            social,
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The stored user node, if registered
    pub async fn find(&self) -> Result<Option<UserNode>> {
        self.social.store().get_user(&self.username).await
    }

    /// Numeric id of the user, if registered
    pub async fn get_userid(&self) -> Result<Option<i64>> {
        Ok(self.find().await?.map(|u| u.userid))
    }

    /// Register with a bcrypt-hashed password.
    ///
    /// Returns `false` when the username is already taken.
    pub async fn register(&self, password: &str) -> Result<bool> {
        if self.find().await?.is_some() {
            return Ok(false);
        }

        let password_hash = bcrypt::hash(password, self.social.bcrypt_cost())
            .context("Failed to hash password")?;

        match self
            .social
            .store()
            .create_user(&self.username, &password_hash)
            .await?
        {
            Some(user) => {
                tracing::info!(username = %user.username, userid = user.userid, "Registered user");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Check a password against the stored hash.
    ///
    /// Unknown users and malformed hashes both verify as `false`.
    pub async fn verify_password(&self, password: &str) -> Result<bool> {
        let Some(user) = self.find().await? else {
            return Ok(false);
        };
        Ok(bcrypt::verify(password, &user.password).unwrap_or(false))
    }

    /// Publish a review of `draft.movie_id`.
    ///
    /// Returns `None` when the user or the movie does not exist.
    pub async fn add_post(&self, draft: PostDraft) -> Result<Option<PostNode>> {
        self.add_post_at(draft, Utc::now()).await
    }

    pub(crate) async fn add_post_at(
        &self,
        draft: PostDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<PostNode>> {
        let post = PostNode {
            postid: Uuid::new_v4().to_string(),
            title: draft.title,
            rating: draft.rating,
            text: draft.text,
            movid: draft.movie_id,
            timestamp: now.timestamp(),
            date: now.date_naive(),
        };
        let new_post = NewPost {
            post,
            tags: parse_tags(&draft.tags),
        };

        let created = self
            .social
            .store()
            .create_post(&self.username, &new_post)
            .await?;

        if created {
            tracing::debug!(
                username = %self.username,
                postid = %new_post.post.postid,
                movie_id = new_post.post.movid,
                tags = new_post.tags.len(),
                "Post published"
            );
            Ok(Some(new_post.post))
        } else {
            Ok(None)
        }
    }

    /// Like a post. Repeated likes leave a single edge.
    pub async fn like_post(&self, postid: &str) -> Result<bool> {
        self.social.store().like_post(&self.username, postid).await
    }

    /// The user's `n` most recent posts
    pub async fn recent_posts(&self, n: usize) -> Result<Vec<PostSummary>> {
        self.social
            .store()
            .user_recent_posts(&self.username, n)
            .await
    }

    /// Other users who tagged posts with the same tags
    pub async fn get_similar_users(&self) -> Result<Vec<SimilarUser>> {
        self.social
            .store()
            .similar_users(&self.username, SIMILAR_USERS_LIMIT)
            .await
    }
}
