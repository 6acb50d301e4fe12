//! Site-wide feed and search

use crate::neo4j::models::{PostSummary, SearchHit, SearchKind};
use crate::neo4j::GraphStore;
use anyhow::Result;

/// Maximum number of search results
pub const SEARCH_LIMIT: usize = 20;

/// The `n` most recent posts across the site.
///
/// Posts without tags or without a reviewed movie are left out.
pub async fn todays_recent_posts(store: &dyn GraphStore, n: usize) -> Result<Vec<PostSummary>> {
    store.recent_posts(n).await
}

/// Case-insensitive substring search over usernames or movie titles
pub async fn query_search(
    store: &dyn GraphStore,
    kind: SearchKind,
    text: &str,
) -> Result<Vec<SearchHit>> {
    tracing::debug!(%kind, text, "Search");
    match kind {
        SearchKind::User => store.search_users(text, SEARCH_LIMIT).await,
        SearchKind::Movie => store.search_movies(text, SEARCH_LIMIT).await,
    }
}
