//! Neo4j graph models for users, movies, posts and the rows read back from queries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Nodes
// ============================================================================

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNode {
    pub userid: i64,
    pub username: String,
    /// bcrypt hash, never sent to clients
    #[serde(skip_serializing, default)]
    pub password: String,
}

/// A pre-loaded movie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieNode {
    #[serde(rename = "movieID")]
    pub movie_id: i64,
    pub title: String,
    pub year: Option<i64>,
    pub overview: Option<String>,
    pub poster: Option<String>,
    pub runtime: Option<i64>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    /// Cast and crew, stored as a list literal (e.g. `['Tom Hanks', 'Tim Allen']`)
    pub featcrew: Option<String>,
    pub lang: Option<String>,
    /// Trailer link (YouTube watch URL)
    pub ytlink: Option<String>,
}

impl MovieNode {
    /// Minimal movie with only the required fields set
    pub fn new(movie_id: i64, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
            year: None,
            overview: None,
            poster: None,
            runtime: None,
            budget: None,
            revenue: None,
            featcrew: None,
            lang: None,
            ytlink: None,
        }
    }
}

/// A published review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostNode {
    pub postid: String,
    pub title: String,
    pub rating: i64,
    pub text: String,
    /// Denormalized id of the reviewed movie
    pub movid: i64,
    /// Creation time in epoch seconds
    pub timestamp: i64,
    pub date: NaiveDate,
}

// ============================================================================
// Query rows
// ============================================================================

/// A post joined with its author, tags and reviewed movie title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub username: Option<String>,
    pub post: PostNode,
    pub tags: Vec<String>,
    pub movie_title: Option<String>,
}

/// Compact movie reference used by rankings and recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieCard {
    pub title: String,
    #[serde(rename = "movieID")]
    pub movie_id: i64,
    pub poster: Option<String>,
}

impl From<&MovieNode> for MovieCard {
    fn from(m: &MovieNode) -> Self {
        Self {
            title: m.title.clone(),
            movie_id: m.movie_id,
            poster: m.poster.clone(),
        }
    }
}

/// A movie together with its keyword tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmDetails {
    pub movie: MovieNode,
    pub keywords: Vec<String>,
}

/// Another user sharing tags with the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarUser {
    pub similar_user: String,
    pub tags: Vec<String>,
}

/// One row of a search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SearchHit {
    User {
        username: String,
        userid: i64,
    },
    Movie {
        title: String,
        year: Option<i64>,
        text: Option<String>,
        #[serde(rename = "movieID")]
        movie_id: i64,
    },
}

// ============================================================================
// Inputs
// ============================================================================

/// Everything needed to write a post and its relationships in one statement
#[derive(Debug, Clone)]
pub struct NewPost {
    pub post: PostNode,
    /// Normalized, distinct tag names
    pub tags: Vec<String>,
}

/// Which nodes `query_search` looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchKind {
    User,
    Movie,
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchKind::User => write!(f, "User"),
            SearchKind::Movie => write!(f, "Movie"),
        }
    }
}

impl FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(SearchKind::User),
            "Movie" => Ok(SearchKind::Movie),
            other => Err(format!("Unknown search kind: {}", other)),
        }
    }
}

/// Ranking used by `rated_films`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatedMode {
    Top,
    Trending,
}

impl FromStr for RatedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(RatedMode::Top),
            "trending" => Ok(RatedMode::Trending),
            other => Err(format!("Unknown ranking: {}", other)),
        }
    }
}
