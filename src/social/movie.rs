//! Movie queries: details, rankings and recommendations

use crate::neo4j::models::{FilmDetails, MovieCard, MovieNode, PostSummary, RatedMode};
use crate::neo4j::GraphStore;
use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::Value;

/// Size of every ranked movie list
pub const RANKING_LIMIT: usize = 10;

/// Ratings strictly above this seed recommendations
pub const RECOMMEND_MIN_RATING: i64 = 3;

/// Movie entity bound to a store handle
pub struct Movie<'a> {
    store: &'a dyn GraphStore,
}

impl<'a> Movie<'a> {
    pub(crate) fn new(store: &'a dyn GraphStore) -> Self {
        Self { store }
    }

    pub async fn find_film(&self, movie_id: i64) -> Result<Option<MovieNode>> {
        self.store.get_movie(movie_id).await
    }

    /// Movie attributes together with its keyword tags
    pub async fn get_film_data(&self, movie_id: i64) -> Result<Option<FilmDetails>> {
        self.store.get_film_data(movie_id).await
    }

    pub async fn get_film_genres(&self, movie_id: i64) -> Result<Vec<String>> {
        self.store.get_film_genres(movie_id).await
    }

    /// The `n` newest reviews of a movie
    pub async fn movie_recent_posts(&self, n: usize, movie_id: i64) -> Result<Vec<PostSummary>> {
        self.store.movie_recent_posts(movie_id, n).await
    }

    /// Top 10 movies by summed rating, or by review recency
    pub async fn rated_films(&self, mode: RatedMode) -> Result<Vec<MovieCard>> {
        match mode {
            RatedMode::Top => self.store.top_rated_movies(RANKING_LIMIT).await,
            RatedMode::Trending => self.store.trending_movies(RANKING_LIMIT).await,
        }
    }

    /// Movies similar to ones the user rated highly and has not rated yet
    pub async fn recommend_films(&self, userid: i64) -> Result<Vec<MovieCard>> {
        self.store
            .recommend_movies(userid, RECOMMEND_MIN_RATING, RANKING_LIMIT)
            .await
    }

    /// Like [`Movie::recommend_films`], seeded only by reviews published
    /// since the start of last month
    pub async fn recommend_recent_films(&self, userid: i64) -> Result<Vec<MovieCard>> {
        self.recommend_recent_films_at(userid, Utc::now()).await
    }

    pub(crate) async fn recommend_recent_films_at(
        &self,
        userid: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<MovieCard>> {
        self.store
            .recommend_recent_movies(
                userid,
                RECOMMEND_MIN_RATING,
                previous_month_start(now),
                RANKING_LIMIT,
            )
            .await
    }

    /// Movies sharing genres and keywords with `movie_id`, excluding itself
    pub async fn get_similar_films(&self, movie_id: i64) -> Result<Vec<MovieCard>> {
        self.store.similar_movies(movie_id, RANKING_LIMIT).await
    }
}

/// Unix timestamp of 00:00 UTC on the first day of the month before `now`
pub fn previous_month_start(now: DateTime<Utc>) -> i64 {
    let (year, month) = match now.month() {
        1 => (now.year() - 1, 12),
        m => (now.year(), m - 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

/// Turn a YouTube watch link into its embeddable form
pub fn embed_trailer_link(link: &str) -> String {
    link.replace("watch?v=", "embed/")
}

/// Parse the stored cast/crew literal into JSON.
///
/// The property holds either JSON or a Python-style literal
/// (`['A', 'B']`, `[{'name': 'A'}]`). Missing or unreadable values give an
/// empty list.
pub fn parse_cast(raw: Option<&str>) -> Value {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Value::Array(vec![]);
    };
    serde_json::from_str(raw)
        .or_else(|_| serde_json::from_str(&literal_to_json(raw)))
        .unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Unreadable featcrew literal");
            Value::Array(vec![])
        })
}

fn literal_to_json(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let mut text = String::new();
                while let Some(ch) = chars.next() {
                    match ch {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                text.push(match escaped {
                                    'n' => '\n',
                                    't' => '\t',
                                    other => other,
                                });
                            }
                        }
                        q if q == c => break,
                        other => text.push(other),
                    }
                }
                out.push_str(&Value::String(text).to_string());
            }
            '(' => out.push('['),
            ')' => out.push(']'),
            c if c.is_ascii_alphabetic() => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !next.is_ascii_alphanumeric() && next != '_' {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                out.push_str(match word.as_str() {
                    "None" => "null",
                    "True" => "true",
                    "False" => "false",
                    _ => "null",
                });
            }
            other => out.push(other),
        }
    }
    out
}
