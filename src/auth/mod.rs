//! Session authentication: signed cookie + flash messages
//!
//! Provides:
//! - Session token encoding/decoding (`session` submodule)
//! - `Set-Cookie` / `Cookie` helpers (`cookies` submodule)
//! - One-shot flash messages (`flash` submodule)
//! - The `Visitor` request extractor (`extractor` submodule)

pub mod cookies;
pub mod extractor;
pub mod flash;
pub mod session;

pub use extractor::Visitor;
