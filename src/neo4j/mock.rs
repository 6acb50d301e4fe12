//! In-memory mock implementation of GraphStore for testing.
//!
//! Mirrors the Cypher semantics of `Neo4jClient` (merges, joins, rankings)
//! using `tokio::sync::RwLock` collections.
//! Conditionally compiled with `#[cfg(test)]`.

use crate::neo4j::models::*;
use crate::neo4j::traits::GraphStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory mock implementation of GraphStore for testing.
pub struct MockGraphStore {
    // Entity stores
    pub users: RwLock<HashMap<String, UserNode>>,
    pub user_counter: RwLock<Option<i64>>,
    pub movies: RwLock<HashMap<i64, MovieNode>>,
    pub posts: RwLock<HashMap<String, PostNode>>,
    pub tags: RwLock<BTreeSet<String>>,

    // Relationships
    /// postid -> author username (PUBLISHED)
    pub published: RwLock<HashMap<String, String>>,
    /// (username, movie_id) -> rating (RATED)
    pub rated: RwLock<HashMap<(String, i64), i64>>,
    /// (tag, postid) (TAGGED)
    pub tagged: RwLock<HashSet<(String, String)>>,
    /// (username, postid) (LIKES)
    pub likes: RwLock<HashSet<(String, String)>>,
    pub movie_genres: RwLock<HashMap<i64, BTreeSet<String>>>,
    pub movie_keywords: RwLock<HashMap<i64, BTreeSet<String>>>,
    pub similar: RwLock<HashMap<i64, Vec<i64>>>,
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            user_counter: RwLock::new(None),
            movies: RwLock::new(HashMap::new()),
            posts: RwLock::new(HashMap::new()),
            tags: RwLock::new(BTreeSet::new()),
            published: RwLock::new(HashMap::new()),
            rated: RwLock::new(HashMap::new()),
            tagged: RwLock::new(HashSet::new()),
            likes: RwLock::new(HashSet::new()),
            movie_genres: RwLock::new(HashMap::new()),
            movie_keywords: RwLock::new(HashMap::new()),
            similar: RwLock::new(HashMap::new()),
        }
    }

    // ========================================================================
    // Builder / seeding methods for tests
    // ========================================================================

    /// Seed a user directly (bypasses the id counter, like a bulk import).
    pub async fn with_user(self, user: UserNode) -> Self {
        self.users
            .write()
            .await
            .insert(user.username.clone(), user);
        self
    }

    /// Seed a movie.
    pub async fn with_movie(self, movie: MovieNode) -> Self {
        self.movies.write().await.insert(movie.movie_id, movie);
        self
    }

    /// Seed a HAS_GENRE edge.
    pub async fn with_genre(self, movie_id: i64, genre: &str) -> Self {
        self.movie_genres
            .write()
            .await
            .entry(movie_id)
            .or_default()
            .insert(genre.to_string());
        self
    }

    /// Seed a KEYWORD edge (merging the tag).
    pub async fn with_keyword(self, movie_id: i64, tag: &str) -> Self {
        self.tags.write().await.insert(tag.to_string());
        self.movie_keywords
            .write()
            .await
            .entry(movie_id)
            .or_default()
            .insert(tag.to_string());
        self
    }

    /// Seed a SIMILAR edge.
    pub async fn with_similar(self, from: i64, to: i64) -> Self {
        self.similar.write().await.entry(from).or_default().push(to);
        self
    }

    /// Seed a RATED edge without a post.
    pub async fn with_rating(self, username: &str, movie_id: i64, rating: i64) -> Self {
        self.rated
            .write()
            .await
            .insert((username.to_string(), movie_id), rating);
        self
    }

    // ========================================================================
    // Inspection helpers
    // ========================================================================

    /// Number of TAGGED edges pointing at a post
    pub async fn tag_edge_count(&self, postid: &str) -> usize {
        self.tagged
            .read()
            .await
            .iter()
            .filter(|(_, p)| p == postid)
            .count()
    }

    /// Number of LIKES edges for a (user, post) pair
    pub async fn like_edge_count(&self, username: &str, postid: &str) -> usize {
        self.likes
            .read()
            .await
            .iter()
            .filter(|(u, p)| u == username && p == postid)
            .count()
    }

    /// Join posts with author, tags and movie title.
    ///
    /// With `require_joins` set, posts lacking a tag or a reviewed movie are
    /// dropped (inner-join semantics).
    async fn summarize(&self, posts: Vec<PostNode>, require_joins: bool) -> Vec<PostSummary> {
        let published = self.published.read().await;
        let tagged = self.tagged.read().await;
        let movies = self.movies.read().await;

        posts
            .into_iter()
            .filter_map(|post| {
                let mut tags: Vec<String> = tagged
                    .iter()
                    .filter(|(_, p)| *p == post.postid)
                    .map(|(t, _)| t.clone())
                    .collect();
                tags.sort();
                let movie_title = movies.get(&post.movid).map(|m| m.title.clone());
                if require_joins && (tags.is_empty() || movie_title.is_none()) {
                    return None;
                }
                Some(PostSummary {
                    username: published.get(&post.postid).cloned(),
                    post,
                    tags,
                    movie_title,
                })
            })
            .collect()
    }

    fn newest_first(posts: &mut [PostNode]) {
        posts.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
    }

    async fn cards(&self, ids: impl IntoIterator<Item = i64>) -> Vec<MovieCard> {
        let movies = self.movies.read().await;
        ids.into_iter()
            .filter_map(|id| movies.get(&id).map(MovieCard::from))
            .collect()
    }

    async fn username_for(&self, userid: i64) -> Option<String> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.userid == userid)
            .map(|u| u.username.clone())
    }

    async fn recommend_from(
        &self,
        username: &str,
        sources: Vec<i64>,
        limit: usize,
    ) -> Vec<MovieCard> {
        let rated = self.rated.read().await;
        let similar = self.similar.read().await;
        let mut seen = HashSet::new();
        let mut picks = Vec::new();
        for source in sources {
            for rec in similar.get(&source).into_iter().flatten() {
                if rated.contains_key(&(username.to_string(), *rec)) {
                    continue;
                }
                if seen.insert(*rec) {
                    picks.push(*rec);
                }
            }
        }
        drop(rated);
        drop(similar);
        let mut cards = self.cards(picks).await;
        cards.truncate(limit);
        cards
    }
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    // ========================================================================
    // User operations
    // ========================================================================

    async fn get_user(&self, username: &str) -> Result<Option<UserNode>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<UserNode>> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Ok(None);
        }
        let mut counter = self.user_counter.write().await;
        let last = (*counter)
            .unwrap_or_else(|| users.values().map(|u| u.userid).max().unwrap_or(0));
        let userid = last + 1;
        *counter = Some(userid);

        let user = UserNode {
            userid,
            username: username.to_string(),
            password: password_hash.to_string(),
        };
        users.insert(username.to_string(), user.clone());
        Ok(Some(user))
    }

    async fn create_post(&self, username: &str, new_post: &NewPost) -> Result<bool> {
        let post = &new_post.post;
        if !self.users.read().await.contains_key(username)
            || !self.movies.read().await.contains_key(&post.movid)
        {
            return Ok(false);
        }

        self.posts
            .write()
            .await
            .insert(post.postid.clone(), post.clone());
        self.published
            .write()
            .await
            .insert(post.postid.clone(), username.to_string());
        self.rated
            .write()
            .await
            .insert((username.to_string(), post.movid), post.rating);

        let mut tags = self.tags.write().await;
        let mut tagged = self.tagged.write().await;
        for name in &new_post.tags {
            tags.insert(name.clone());
            tagged.insert((name.clone(), post.postid.clone()));
        }
        Ok(true)
    }

    async fn like_post(&self, username: &str, postid: &str) -> Result<bool> {
        if !self.users.read().await.contains_key(username)
            || !self.posts.read().await.contains_key(postid)
        {
            return Ok(false);
        }
        self.likes
            .write()
            .await
            .insert((username.to_string(), postid.to_string()));
        Ok(true)
    }

    async fn user_recent_posts(&self, username: &str, limit: usize) -> Result<Vec<PostSummary>> {
        let mut posts: Vec<PostNode> = {
            let published = self.published.read().await;
            self.posts
                .read()
                .await
                .values()
                .filter(|p| published.get(&p.postid).map(String::as_str) == Some(username))
                .cloned()
                .collect()
        };
        Self::newest_first(&mut posts);
        posts.truncate(limit);
        Ok(self.summarize(posts, false).await)
    }

    async fn similar_users(&self, username: &str, limit: usize) -> Result<Vec<SimilarUser>> {
        let published = self.published.read().await;
        let tagged = self.tagged.read().await;

        let tags_of = |user: &str| -> BTreeSet<String> {
            tagged
                .iter()
                .filter(|(_, p)| published.get(p).map(String::as_str) == Some(user))
                .map(|(t, _)| t.clone())
                .collect()
        };

        let mine = tags_of(username);
        let others: BTreeSet<&String> = published.values().filter(|u| *u != username).collect();

        let mut similar: Vec<SimilarUser> = others
            .into_iter()
            .filter_map(|other| {
                let shared: Vec<String> = tags_of(other).intersection(&mine).cloned().collect();
                (!shared.is_empty()).then(|| SimilarUser {
                    similar_user: other.clone(),
                    tags: shared,
                })
            })
            .collect();
        similar.sort_by(|a, b| {
            b.tags
                .len()
                .cmp(&a.tags.len())
                .then_with(|| a.similar_user.cmp(&b.similar_user))
        });
        similar.truncate(limit);
        Ok(similar)
    }

    // ========================================================================
    // Movie operations
    // ========================================================================

    async fn get_movie(&self, movie_id: i64) -> Result<Option<MovieNode>> {
        Ok(self.movies.read().await.get(&movie_id).cloned())
    }

    async fn get_film_data(&self, movie_id: i64) -> Result<Option<FilmDetails>> {
        let Some(movie) = self.movies.read().await.get(&movie_id).cloned() else {
            return Ok(None);
        };
        let keywords = self
            .movie_keywords
            .read()
            .await
            .get(&movie_id)
            .map(|k| k.iter().cloned().collect())
            .unwrap_or_default();
        Ok(Some(FilmDetails { movie, keywords }))
    }

    async fn get_film_genres(&self, movie_id: i64) -> Result<Vec<String>> {
        Ok(self
            .movie_genres
            .read()
            .await
            .get(&movie_id)
            .map(|g| g.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn movie_recent_posts(&self, movie_id: i64, limit: usize) -> Result<Vec<PostSummary>> {
        let mut posts: Vec<PostNode> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.movid == movie_id)
            .cloned()
            .collect();
        Self::newest_first(&mut posts);
        posts.truncate(limit);
        Ok(self.summarize(posts, false).await)
    }

    async fn top_rated_movies(&self, limit: usize) -> Result<Vec<MovieCard>> {
        let mut scores: HashMap<i64, i64> = HashMap::new();
        for post in self.posts.read().await.values() {
            *scores.entry(post.movid).or_default() += post.rating;
        }
        let mut ranked: Vec<(i64, i64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        Ok(self.cards(ranked.into_iter().map(|(id, _)| id)).await)
    }

    async fn trending_movies(&self, limit: usize) -> Result<Vec<MovieCard>> {
        let mut sums: HashMap<i64, (f64, f64)> = HashMap::new();
        for post in self.posts.read().await.values() {
            let entry = sums.entry(post.movid).or_default();
            entry.0 += post.timestamp as f64;
            entry.1 += 1.0;
        }
        let mut ranked: Vec<(i64, f64)> = sums
            .into_iter()
            .map(|(id, (total, count))| (id, total / count))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);
        Ok(self.cards(ranked.into_iter().map(|(id, _)| id)).await)
    }

    async fn recommend_movies(
        &self,
        userid: i64,
        min_rating: i64,
        limit: usize,
    ) -> Result<Vec<MovieCard>> {
        let Some(username) = self.username_for(userid).await else {
            return Ok(vec![]);
        };
        let mut sources: Vec<i64> = self
            .rated
            .read()
            .await
            .iter()
            .filter(|((u, _), rating)| *u == username && **rating > min_rating)
            .map(|((_, movie), _)| *movie)
            .collect();
        sources.sort();
        Ok(self.recommend_from(&username, sources, limit).await)
    }

    async fn recommend_recent_movies(
        &self,
        userid: i64,
        min_rating: i64,
        since: i64,
        limit: usize,
    ) -> Result<Vec<MovieCard>> {
        let Some(username) = self.username_for(userid).await else {
            return Ok(vec![]);
        };
        let mut sources: Vec<i64> = {
            let published = self.published.read().await;
            self.posts
                .read()
                .await
                .values()
                .filter(|p| published.get(&p.postid) == Some(&username))
                .filter(|p| p.timestamp >= since && p.rating > min_rating)
                .map(|p| p.movid)
                .collect()
        };
        sources.sort();
        sources.dedup();
        Ok(self.recommend_from(&username, sources, limit).await)
    }

    async fn similar_movies(&self, movie_id: i64, limit: usize) -> Result<Vec<MovieCard>> {
        let genres = self.movie_genres.read().await;
        let keywords = self.movie_keywords.read().await;
        let empty = BTreeSet::new();
        let my_genres = genres.get(&movie_id).unwrap_or(&empty);
        let my_keywords = keywords.get(&movie_id).unwrap_or(&empty);

        let mut ranked: Vec<(i64, usize, usize)> = self
            .movies
            .read()
            .await
            .keys()
            .filter(|id| **id != movie_id)
            .filter_map(|id| {
                let shared_genres = genres
                    .get(id)
                    .map(|g| g.intersection(my_genres).count())
                    .unwrap_or(0);
                let shared_tags = keywords
                    .get(id)
                    .map(|k| k.intersection(my_keywords).count())
                    .unwrap_or(0);
                (shared_genres > 0 && shared_tags > 0).then_some((*id, shared_genres, shared_tags))
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| b.2.cmp(&a.2))
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(limit);
        drop(genres);
        drop(keywords);
        Ok(self.cards(ranked.into_iter().map(|(id, _, _)| id)).await)
    }

    // ========================================================================
    // Aggregate queries
    // ========================================================================

    async fn recent_posts(&self, limit: usize) -> Result<Vec<PostSummary>> {
        let mut posts: Vec<PostNode> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let mut summaries = self.summarize(posts, true).await;
        summaries.truncate(limit);
        Ok(summaries)
    }

    async fn search_users(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let needle = text.to_lowercase();
        let mut users: Vec<UserNode> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users.truncate(limit);
        Ok(users
            .into_iter()
            .map(|u| SearchHit::User {
                username: u.username,
                userid: u.userid,
            })
            .collect())
    }

    async fn search_movies(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let needle = text.to_lowercase();
        let mut movies: Vec<MovieNode> = self
            .movies
            .read()
            .await
            .values()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        movies.sort_by(|a, b| a.title.cmp(&b.title));
        movies.truncate(limit);
        Ok(movies
            .into_iter()
            .map(|m| SearchHit::Movie {
                title: m.title,
                year: m.year,
                text: m.overview,
                movie_id: m.movie_id,
            })
            .collect())
    }
}
