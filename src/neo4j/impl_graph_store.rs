//! `GraphStore` implementation for `Neo4jClient`.
//!
//! Every method simply delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::GraphStore;

#[async_trait]
impl GraphStore for Neo4jClient {
    async fn health_check(&self) -> anyhow::Result<bool> {
        self.health_check().await
    }

    // ========================================================================
    // User operations
    // ========================================================================

    async fn get_user(&self, username: &str) -> anyhow::Result<Option<UserNode>> {
        self.get_user(username).await
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<UserNode>> {
        self.create_user(username, password_hash).await
    }

    async fn create_post(&self, username: &str, new_post: &NewPost) -> anyhow::Result<bool> {
        self.create_post(username, new_post).await
    }

    async fn like_post(&self, username: &str, postid: &str) -> anyhow::Result<bool> {
        self.like_post(username, postid).await
    }

    async fn user_recent_posts(
        &self,
        username: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<PostSummary>> {
        self.user_recent_posts(username, limit).await
    }

    async fn similar_users(
        &self,
        username: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<SimilarUser>> {
        self.similar_users(username, limit).await
    }

    // ========================================================================
    // Movie operations
    // ========================================================================

    async fn get_movie(&self, movie_id: i64) -> anyhow::Result<Option<MovieNode>> {
        self.get_movie(movie_id).await
    }

    async fn get_film_data(&self, movie_id: i64) -> anyhow::Result<Option<FilmDetails>> {
        self.get_film_data(movie_id).await
    }

    async fn get_film_genres(&self, movie_id: i64) -> anyhow::Result<Vec<String>> {
        self.get_film_genres(movie_id).await
    }

    async fn movie_recent_posts(
        &self,
        movie_id: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<PostSummary>> {
        self.movie_recent_posts(movie_id, limit).await
    }

    async fn top_rated_movies(&self, limit: usize) -> anyhow::Result<Vec<MovieCard>> {
        self.top_rated_movies(limit).await
    }

    async fn trending_movies(&self, limit: usize) -> anyhow::Result<Vec<MovieCard>> {
        self.trending_movies(limit).await
    }

    async fn recommend_movies(
        &self,
        userid: i64,
        min_rating: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<MovieCard>> {
        self.recommend_movies(userid, min_rating, limit).await
    }

    async fn recommend_recent_movies(
        &self,
        userid: i64,
        min_rating: i64,
        since: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<MovieCard>> {
        self.recommend_recent_movies(userid, min_rating, since, limit)
            .await
    }

    async fn similar_movies(&self, movie_id: i64, limit: usize) -> anyhow::Result<Vec<MovieCard>> {
        self.similar_movies(movie_id, limit).await
    }

    // ========================================================================
    // Aggregate queries
    // ========================================================================

    async fn recent_posts(&self, limit: usize) -> anyhow::Result<Vec<PostSummary>> {
        self.recent_posts(limit).await
    }

    async fn search_users(&self, text: &str, limit: usize) -> anyhow::Result<Vec<SearchHit>> {
        self.search_users(text, limit).await
    }

    async fn search_movies(&self, text: &str, limit: usize) -> anyhow::Result<Vec<SearchHit>> {
        self.search_movies(text, limit).await
    }
}
