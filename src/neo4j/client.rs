//! Neo4j client for the review graph

use super::models::*;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use neo4rs::{query, Graph, Query};
use std::sync::Arc;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

/// Error code Neo4j reports when a uniqueness constraint rejects a write
const CONSTRAINT_VIOLATION: &str = "ConstraintValidationFailed";

/// Which uniqueness constraint rejected a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistrationConflict {
    /// Another registration took the same username
    Username,
    /// Any other constraint, e.g. two registrations creating the counter at once
    Other,
}

fn registration_conflict(message: &str) -> Option<RegistrationConflict> {
    if !message.contains(CONSTRAINT_VIOLATION) {
        return None;
    }
    if message.contains("property `username`") {
        Some(RegistrationConflict::Username)
    } else {
        Some(RegistrationConflict::Other)
    }
}

/// Read an integer property that older imports may have stored as a float or string
fn int_prop(node: &neo4rs::Node, key: &str) -> Option<i64> {
    node.get::<i64>(key)
        .ok()
        .or_else(|| node.get::<f64>(key).ok().map(|f| f as i64))
        .or_else(|| {
            node.get::<String>(key)
                .ok()
                .and_then(|s| s.trim().parse().ok())
        })
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        // Initialize schema
        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the graph schema with constraints and indexes
    pub async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT user_username IF NOT EXISTS FOR (u:User) REQUIRE u.username IS UNIQUE",
            "CREATE CONSTRAINT movie_id IF NOT EXISTS FOR (m:Movie) REQUIRE m.movieID IS UNIQUE",
            "CREATE CONSTRAINT genre_id IF NOT EXISTS FOR (g:Genre) REQUIRE g.genreID IS UNIQUE",
            "CREATE CONSTRAINT post_id IF NOT EXISTS FOR (p:Post) REQUIRE p.postid IS UNIQUE",
            "CREATE CONSTRAINT tag_name IF NOT EXISTS FOR (t:Tag) REQUIRE t.name IS UNIQUE",
            "CREATE CONSTRAINT counter_name IF NOT EXISTS FOR (c:Counter) REQUIRE c.name IS UNIQUE",
        ];

        let indexes = vec!["CREATE INDEX post_date IF NOT EXISTS FOR (p:Post) ON (p.date)"];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        tracing::info!("Graph schema initialized");
        Ok(())
    }

    /// Execute a parameterized Cypher query and collect every row
    async fn fetch_all(&self, q: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a parameterized Cypher query and return the first row, if any
    async fn fetch_one(&self, q: Query) -> Result<Option<neo4rs::Row>> {
        let mut result = self.graph.execute(q).await?;
        Ok(result.next().await?)
    }

    /// Verify that Neo4j answers a trivial query
    pub async fn health_check(&self) -> Result<bool> {
        let row = self.fetch_one(query("RETURN 1 AS ok")).await?;
        Ok(row.and_then(|r| r.get::<i64>("ok").ok()) == Some(1))
    }

    // ========================================================================
    // User operations
    // ========================================================================

    /// Get a user by username
    pub async fn get_user(&self, username: &str) -> Result<Option<UserNode>> {
        let q = query("MATCH (u:User {username: $username}) RETURN u").param("username", username);

        match self.fetch_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("u")?;
                Ok(Some(self.node_to_user(&node)?))
            }
            None => Ok(None),
        }
    }

    /// Create a user, allocating `userid` from the `Counter {name: 'userid'}` node.
    ///
    /// The counter is seeded from the highest existing id the first time it is
    /// created; the User scan runs only while no counter exists.
    /// `SET c.value = c.value + 1` takes a write lock on the counter so
    /// concurrent registrations receive distinct ids. A duplicate username
    /// (checked in the statement, and enforced by the uniqueness constraint when
    /// two registrations race) yields `None`. Losing the race to create the
    /// counter itself is retried once, since the counter exists by then.
    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<UserNode>> {
        let mut retried = false;
        loop {
            match self.try_create_user(username, password_hash).await {
                Ok(Some(node)) => return Ok(Some(self.node_to_user(&node)?)),
                Ok(None) => return Ok(None),
                Err(e) => match registration_conflict(&e.to_string()) {
                    Some(RegistrationConflict::Username) => {
                        tracing::warn!(username, "Concurrent registration lost the username race");
                        return Ok(None);
                    }
                    Some(RegistrationConflict::Other) if !retried => {
                        tracing::debug!(username, error = %e, "Retrying registration after a constraint conflict");
                        retried = true;
                    }
                    _ => return Err(e).context("Failed to create user"),
                },
            }
        }
    }

    async fn try_create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> std::result::Result<Option<neo4rs::Node>, neo4rs::Error> {
        let q = query(
            r#"
            OPTIONAL MATCH (existing:User {username: $username})
            WITH existing
            WHERE existing IS NULL
            OPTIONAL MATCH (seeded:Counter {name: 'userid'})
            CALL {
                WITH seeded
                WITH seeded WHERE seeded IS NULL
                MATCH (u:User)
                RETURN COALESCE(max(u.userid), 0) AS maxid
            }
            MERGE (c:Counter {name: 'userid'})
            ON CREATE SET c.value = maxid
            SET c.value = c.value + 1
            CREATE (user:User {userid: c.value, username: $username, password: $password})
            RETURN user
            "#,
        )
        .param("username", username)
        .param("password", password_hash);

        let mut result = self.graph.execute(q).await?;
        match result.next().await? {
            Some(row) => Ok(Some(row.get::<neo4rs::Node>("user").map_err(neo4rs::Error::DeserializationError)?)),
            None => Ok(None),
        }
    }

    /// Create a post and all of its relationships in a single statement
    pub async fn create_post(&self, username: &str, new_post: &NewPost) -> Result<bool> {
        let post = &new_post.post;
        let q = query(
            r#"
            MATCH (user:User {username: $username})
            MATCH (movie:Movie {movieID: $movid})
            CREATE (post:Post {
                postid: $postid,
                title: $title,
                rating: $rating,
                text: $text,
                movid: $movid,
                timestamp: $timestamp,
                date: $date
            })
            CREATE (user)-[:PUBLISHED]->(post)
            CREATE (post)-[:REVIEWED]->(movie)
            MERGE (user)-[r:RATED]->(movie)
            SET r.rating = $rating
            FOREACH (name IN $tags |
                MERGE (tag:Tag {name: name})
                MERGE (tag)-[:TAGGED]->(post)
            )
            RETURN post.postid AS postid
            "#,
        )
        .param("username", username)
        .param("movid", post.movid)
        .param("postid", post.postid.clone())
        .param("title", post.title.clone())
        .param("rating", post.rating)
        .param("text", post.text.clone())
        .param("timestamp", post.timestamp)
        .param("date", post.date.format("%Y-%m-%d").to_string())
        .param("tags", new_post.tags.clone());

        let row = self
            .fetch_one(q)
            .await
            .context("Failed to create post")?;
        Ok(row.is_some())
    }

    /// Merge a LIKES edge between a user and a post
    pub async fn like_post(&self, username: &str, postid: &str) -> Result<bool> {
        let q = query(
            r#"
            MATCH (user:User {username: $username})
            MATCH (post:Post {postid: $postid})
            MERGE (user)-[:LIKES]->(post)
            RETURN post.postid AS postid
            "#,
        )
        .param("username", username)
        .param("postid", postid);

        Ok(self.fetch_one(q).await?.is_some())
    }

    /// Most recent posts published by a user
    pub async fn user_recent_posts(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<PostSummary>> {
        let q = query(
            r#"
            MATCH (user:User {username: $username})-[:PUBLISHED]->(post:Post)
            OPTIONAL MATCH (post)<-[:TAGGED]-(tag:Tag)
            OPTIONAL MATCH (post)-[:REVIEWED]->(movie:Movie)
            RETURN user.username AS username, post, COLLECT(tag.name) AS tags,
                   movie.title AS movie_title
            ORDER BY post.date DESC, post.timestamp DESC
            LIMIT $limit
            "#,
        )
        .param("username", username)
        .param("limit", limit as i64);

        self.rows_to_summaries(self.fetch_all(q).await?)
    }

    /// Users who tagged their posts with the same tags as this user
    pub async fn similar_users(&self, username: &str, limit: usize) -> Result<Vec<SimilarUser>> {
        let q = query(
            r#"
            MATCH (you:User {username: $username})-[:PUBLISHED]->(:Post)<-[:TAGGED]-(tag:Tag),
                  (they:User)-[:PUBLISHED]->(:Post)<-[:TAGGED]-(tag)
            WHERE you <> they
            WITH they, COLLECT(DISTINCT tag.name) AS tags
            ORDER BY SIZE(tags) DESC, they.username
            LIMIT $limit
            RETURN they.username AS similar_user, tags
            "#,
        )
        .param("username", username)
        .param("limit", limit as i64);

        let rows = self.fetch_all(q).await?;
        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(SimilarUser {
                similar_user: row.get("similar_user")?,
                tags: row.get::<Vec<String>>("tags").unwrap_or_default(),
            });
        }
        Ok(users)
    }

    // ========================================================================
    // Movie operations
    // ========================================================================

    /// Get a movie by id
    pub async fn get_movie(&self, movie_id: i64) -> Result<Option<MovieNode>> {
        let q = query("MATCH (m:Movie {movieID: $movie_id}) RETURN m").param("movie_id", movie_id);

        match self.fetch_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("m")?;
                Ok(Some(self.node_to_movie(&node)?))
            }
            None => Ok(None),
        }
    }

    /// Get a movie together with its keyword tags
    pub async fn get_film_data(&self, movie_id: i64) -> Result<Option<FilmDetails>> {
        let q = query(
            r#"
            MATCH (m:Movie {movieID: $movie_id})
            OPTIONAL MATCH (m)-[:KEYWORD]-(t:Tag)
            RETURN m, COLLECT(DISTINCT t.name) AS keywords
            "#,
        )
        .param("movie_id", movie_id);

        match self.fetch_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("m")?;
                Ok(Some(FilmDetails {
                    movie: self.node_to_movie(&node)?,
                    keywords: row.get::<Vec<String>>("keywords").unwrap_or_default(),
                }))
            }
            None => Ok(None),
        }
    }

    /// Genre names of a movie
    pub async fn get_film_genres(&self, movie_id: i64) -> Result<Vec<String>> {
        let q = query(
            r#"
            MATCH (m:Movie {movieID: $movie_id})-[:HAS_GENRE]->(g:Genre)
            RETURN COLLECT(g.name) AS genres
            "#,
        )
        .param("movie_id", movie_id);

        Ok(self
            .fetch_one(q)
            .await?
            .and_then(|row| row.get::<Vec<String>>("genres").ok())
            .unwrap_or_default())
    }

    /// Most recent posts reviewing a movie
    pub async fn movie_recent_posts(
        &self,
        movie_id: i64,
        limit: usize,
    ) -> Result<Vec<PostSummary>> {
        let q = query(
            r#"
            MATCH (post:Post)-[:REVIEWED]->(movie:Movie {movieID: $movie_id})
            OPTIONAL MATCH (post)<-[:TAGGED]-(tag:Tag)
            OPTIONAL MATCH (user:User)-[:PUBLISHED]->(post)
            RETURN user.username AS username, post, COLLECT(tag.name) AS tags,
                   movie.title AS movie_title
            ORDER BY post.date DESC, post.timestamp DESC
            LIMIT $limit
            "#,
        )
        .param("movie_id", movie_id)
        .param("limit", limit as i64);

        self.rows_to_summaries(self.fetch_all(q).await?)
    }

    /// Movies ranked by the sum of their post ratings
    pub async fn top_rated_movies(&self, limit: usize) -> Result<Vec<MovieCard>> {
        let q = query(
            r#"
            MATCH (post:Post)-[:REVIEWED]->(movie:Movie)
            WITH movie, SUM(toInteger(post.rating)) AS score
            ORDER BY score DESC
            LIMIT $limit
            RETURN movie.title AS title, movie.movieID AS movie_id, movie.poster AS poster
            "#,
        )
        .param("limit", limit as i64);

        self.rows_to_cards(self.fetch_all(q).await?)
    }

    /// Movies ranked by the average timestamp of their posts
    pub async fn trending_movies(&self, limit: usize) -> Result<Vec<MovieCard>> {
        let q = query(
            r#"
            MATCH (post:Post)-[:REVIEWED]->(movie:Movie)
            WITH movie, AVG(toFloat(post.timestamp)) AS recency
            ORDER BY recency DESC
            LIMIT $limit
            RETURN movie.title AS title, movie.movieID AS movie_id, movie.poster AS poster
            "#,
        )
        .param("limit", limit as i64);

        self.rows_to_cards(self.fetch_all(q).await?)
    }

    /// Movies similar to well-rated ones, excluding those already rated
    pub async fn recommend_movies(
        &self,
        userid: i64,
        min_rating: i64,
        limit: usize,
    ) -> Result<Vec<MovieCard>> {
        let q = query(
            r#"
            MATCH (u:User {userid: $userid})-[r:RATED]->(:Movie)-[:SIMILAR]->(rec:Movie)
            WHERE toInteger(r.rating) > $min_rating AND NOT (u)-[:RATED]->(rec)
            RETURN DISTINCT rec.title AS title, rec.movieID AS movie_id, rec.poster AS poster
            LIMIT $limit
            "#,
        )
        .param("userid", userid)
        .param("min_rating", min_rating)
        .param("limit", limit as i64);

        self.rows_to_cards(self.fetch_all(q).await?)
    }

    /// Recommendations from posts published at or after `since`
    pub async fn recommend_recent_movies(
        &self,
        userid: i64,
        min_rating: i64,
        since: i64,
        limit: usize,
    ) -> Result<Vec<MovieCard>> {
        let q = query(
            r#"
            MATCH (u:User {userid: $userid})-[:PUBLISHED]->(post:Post)-[:REVIEWED]->(:Movie)-[:SIMILAR]->(rec:Movie)
            WHERE post.timestamp >= $since
              AND toInteger(post.rating) > $min_rating
              AND NOT (u)-[:RATED]->(rec)
            RETURN DISTINCT rec.title AS title, rec.movieID AS movie_id, rec.poster AS poster
            LIMIT $limit
            "#,
        )
        .param("userid", userid)
        .param("min_rating", min_rating)
        .param("since", since)
        .param("limit", limit as i64);

        self.rows_to_cards(self.fetch_all(q).await?)
    }

    /// Movies sharing both a genre and a keyword with the target movie
    pub async fn similar_movies(&self, movie_id: i64, limit: usize) -> Result<Vec<MovieCard>> {
        let q = query(
            r#"
            MATCH (t:Tag)-[:KEYWORD]-(m:Movie {movieID: $movie_id})-[:HAS_GENRE]->(g:Genre),
                  (t)-[:KEYWORD]-(m2:Movie)-[:HAS_GENRE]->(g)
            WHERE m <> m2
            WITH m2, COLLECT(DISTINCT t.name) AS tags, COLLECT(DISTINCT g.name) AS genres
            ORDER BY SIZE(genres) DESC, SIZE(tags) DESC
            LIMIT $limit
            RETURN m2.title AS title, m2.movieID AS movie_id, m2.poster AS poster
            "#,
        )
        .param("movie_id", movie_id)
        .param("limit", limit as i64);

        self.rows_to_cards(self.fetch_all(q).await?)
    }

    // ========================================================================
    // Aggregate queries
    // ========================================================================

    /// Global feed. Posts without a tag or a reviewed movie do not match.
    pub async fn recent_posts(&self, limit: usize) -> Result<Vec<PostSummary>> {
        let q = query(
            r#"
            MATCH (user:User)-[:PUBLISHED]->(post:Post)<-[:TAGGED]-(tag:Tag)
            MATCH (post)-[:REVIEWED]->(movie:Movie)
            RETURN user.username AS username, post, COLLECT(tag.name) AS tags,
                   movie.title AS movie_title
            ORDER BY post.timestamp DESC
            LIMIT $limit
            "#,
        )
        .param("limit", limit as i64);

        self.rows_to_summaries(self.fetch_all(q).await?)
    }

    /// Search usernames
    pub async fn search_users(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let q = query(
            r#"
            MATCH (u:User)
            WHERE toLower(u.username) CONTAINS toLower($text)
            RETURN u.username AS username, u.userid AS userid
            ORDER BY u.username
            LIMIT $limit
            "#,
        )
        .param("text", text)
        .param("limit", limit as i64);

        let rows = self.fetch_all(q).await?;
        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            hits.push(SearchHit::User {
                username: row.get("username")?,
                userid: row.get::<i64>("userid").unwrap_or_default(),
            });
        }
        Ok(hits)
    }

    /// Search movie titles
    pub async fn search_movies(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let q = query(
            r#"
            MATCH (m:Movie)
            WHERE toLower(m.title) CONTAINS toLower($text)
            RETURN m.title AS title, m.year AS year, m.overview AS text, m.movieID AS movie_id
            ORDER BY m.title
            LIMIT $limit
            "#,
        )
        .param("text", text)
        .param("limit", limit as i64);

        let rows = self.fetch_all(q).await?;
        let mut hits = Vec::with_capacity(rows.len());
        for row in rows {
            hits.push(SearchHit::Movie {
                title: row.get("title")?,
                year: row.get::<i64>("year").ok(),
                text: row.get::<String>("text").ok(),
                movie_id: row.get("movie_id")?,
            });
        }
        Ok(hits)
    }

    // ========================================================================
    // Row / node conversion
    // ========================================================================

    fn rows_to_summaries(&self, rows: Vec<neo4rs::Row>) -> Result<Vec<PostSummary>> {
        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("post")?;
            posts.push(PostSummary {
                username: row.get::<String>("username").ok(),
                post: self.node_to_post(&node)?,
                tags: row.get::<Vec<String>>("tags").unwrap_or_default(),
                movie_title: row.get::<String>("movie_title").ok(),
            });
        }
        Ok(posts)
    }

    fn rows_to_cards(&self, rows: Vec<neo4rs::Row>) -> Result<Vec<MovieCard>> {
        let mut cards = Vec::with_capacity(rows.len());
        for row in rows {
            cards.push(MovieCard {
                title: row.get::<String>("title").unwrap_or_default(),
                movie_id: row.get("movie_id")?,
                poster: row.get::<String>("poster").ok(),
            });
        }
        Ok(cards)
    }

    /// Parse a Neo4j Node into a UserNode
    fn node_to_user(&self, node: &neo4rs::Node) -> Result<UserNode> {
        Ok(UserNode {
            userid: int_prop(node, "userid").unwrap_or_default(),
            username: node.get("username")?,
            password: node.get::<String>("password").unwrap_or_default(),
        })
    }

    /// Parse a Neo4j Node into a MovieNode
    fn node_to_movie(&self, node: &neo4rs::Node) -> Result<MovieNode> {
        Ok(MovieNode {
            movie_id: int_prop(node, "movieID").context("Movie node without movieID")?,
            title: node.get::<String>("title").unwrap_or_default(),
            year: int_prop(node, "year"),
            overview: node.get::<String>("overview").ok(),
            poster: node.get::<String>("poster").ok(),
            runtime: int_prop(node, "runtime"),
            budget: int_prop(node, "budget"),
            revenue: int_prop(node, "revenue"),
            featcrew: node.get::<String>("featcrew").ok(),
            lang: node.get::<String>("lang").ok(),
            ytlink: node.get::<String>("ytlink").ok(),
        })
    }

    /// Parse a Neo4j Node into a PostNode
    fn node_to_post(&self, node: &neo4rs::Node) -> Result<PostNode> {
        let timestamp = int_prop(node, "timestamp").unwrap_or_default();
        let date = node
            .get::<String>("date")
            .ok()
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
            .or_else(|| chrono::DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive()))
            .unwrap_or_default();

        Ok(PostNode {
            postid: node.get("postid")?,
            title: node.get::<String>("title").unwrap_or_default(),
            rating: int_prop(node, "rating").unwrap_or_default(),
            text: node.get::<String>("text").unwrap_or_default(),
            movid: int_prop(node, "movid").unwrap_or_default(),
            timestamp,
            date,
        })
    }
}
