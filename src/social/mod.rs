//! Social layer: users, movies and the aggregate feeds
//!
//! Entities are thin typed wrappers over [`GraphStore`]: they normalize input
//! (tags, ids, timestamps), hash passwords, and delegate every lookup or
//! ranking to a single store query.

pub mod feed;
pub mod movie;
pub mod tags;
pub mod user;

pub use movie::Movie;
pub use user::{PostDraft, User};

use crate::neo4j::GraphStore;
use std::sync::Arc;

/// Entry point to the entity layer, holding the explicit store handle
#[derive(Clone)]
pub struct Social {
    store: Arc<dyn GraphStore>,
    bcrypt_cost: u32,
}

impl Social {
    pub fn new(store: Arc<dyn GraphStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// The underlying graph store
    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    /// User entity for `username` (which may or may not exist yet)
    pub fn user(&self, username: impl Into<String>) -> User<'_> {
        User::new(self, username)
    }

    /// Movie queries
    pub fn movies(&self) -> Movie<'_> {
        Movie::new(self.store())
    }

    pub(crate) fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }
}
