//! GraphStore trait definition
//!
//! Defines the abstract interface for all Neo4j graph operations.
//! This trait mirrors the public async methods of `Neo4jClient`,
//! enabling testing with the in-memory mock.

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;

/// Abstract interface for all graph database operations.
///
/// Each method maps to exactly one Cypher statement on the Neo4j side.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Check that the database answers queries
    async fn health_check(&self) -> Result<bool>;

    // ========================================================================
    // User operations
    // ========================================================================

    /// Get a user by username
    async fn get_user(&self, username: &str) -> Result<Option<UserNode>>;

    /// Create a user with the next sequential id.
    ///
    /// Returns `None` when the username is already taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<UserNode>>;

    /// Write a post with its PUBLISHED, REVIEWED, RATED and TAGGED edges.
    ///
    /// Returns `false` when the author or the reviewed movie does not exist.
    async fn create_post(&self, username: &str, new_post: &NewPost) -> Result<bool>;

    /// Merge a LIKES edge. Returns `false` when the user or post is missing.
    async fn like_post(&self, username: &str, postid: &str) -> Result<bool>;

    /// Most recent posts published by a user (optional tag/movie joins)
    async fn user_recent_posts(&self, username: &str, limit: usize) -> Result<Vec<PostSummary>>;

    /// Users sharing tags with this user, most shared tags first
    async fn similar_users(&self, username: &str, limit: usize) -> Result<Vec<SimilarUser>>;

    // ========================================================================
    // Movie operations
    // ========================================================================

    /// Get a movie by id
    async fn get_movie(&self, movie_id: i64) -> Result<Option<MovieNode>>;

    /// Get a movie with its keywords
    async fn get_film_data(&self, movie_id: i64) -> Result<Option<FilmDetails>>;

    /// Genre names of a movie
    async fn get_film_genres(&self, movie_id: i64) -> Result<Vec<String>>;

    /// Most recent posts reviewing a movie
    async fn movie_recent_posts(&self, movie_id: i64, limit: usize) -> Result<Vec<PostSummary>>;

    /// Movies ranked by summed post rating
    async fn top_rated_movies(&self, limit: usize) -> Result<Vec<MovieCard>>;

    /// Movies ranked by average post timestamp
    async fn trending_movies(&self, limit: usize) -> Result<Vec<MovieCard>>;

    /// Movies SIMILAR to those the user rated above `min_rating`, excluding
    /// movies the user already rated
    async fn recommend_movies(
        &self,
        userid: i64,
        min_rating: i64,
        limit: usize,
    ) -> Result<Vec<MovieCard>>;

    /// Like `recommend_movies`, but only from posts published at or after `since`
    async fn recommend_recent_movies(
        &self,
        userid: i64,
        min_rating: i64,
        since: i64,
        limit: usize,
    ) -> Result<Vec<MovieCard>>;

    /// Movies sharing a genre and a keyword with the target movie
    async fn similar_movies(&self, movie_id: i64, limit: usize) -> Result<Vec<MovieCard>>;

    // ========================================================================
    // Aggregate queries
    // ========================================================================

    /// Global feed of the most recent posts (inner tag/movie joins)
    async fn recent_posts(&self, limit: usize) -> Result<Vec<PostSummary>>;

    /// Case-insensitive substring search over usernames
    async fn search_users(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// Case-insensitive substring search over movie titles
    async fn search_movies(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>>;
}
