//! HTTP surface of the review site

pub mod account_handlers;
pub mod handlers;
pub mod post_handlers;
pub mod routes;

pub use routes::create_router;
