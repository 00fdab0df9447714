//! SQLite implementation of [`gather_core::store::CommunityStore`].
//!
//! Queries run through [`tokio_rusqlite`] on its background connection
//! thread. Timestamps are stored as fixed-width RFC 3339 text so that `ORDER
//! BY` on them is chronological, and every team write re-derives the team's
//! region and country from its city before touching the database.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
