//! Core types and policy for the Gather community model.
//!
//! Teams, organizations, profiles and memberships, the authorization checks
//! that run over them, and the [`store::CommunityStore`] trait backends
//! implement. Free of HTTP and database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod event;
pub mod location;
pub mod membership;
pub mod organization;
pub mod policy;
pub mod profile;
pub mod store;
pub mod taxonomy;
pub mod team;

pub use error::{Error, PresentationError, Result};
