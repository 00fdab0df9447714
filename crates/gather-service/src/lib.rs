//! Request-level operations for Gather.
//!
//! Every operation is generic over a [`gather_core::store::CommunityStore`]
//! and takes the acting [`Profile`](gather_core::profile::Profile) as
//! returned by [`resolve_profile`]. Permission checks go through
//! [`gather_core::policy`]; a denied check becomes
//! [`ServiceError::PermissionDenied`] and nothing is written.
//!
//! Transport, sessions and rendering are the caller's responsibility.

pub mod error;
pub mod events;
pub mod members;
pub mod organizations;
pub mod profiles;
pub mod proximity;
pub mod teams;

pub use error::{EDIT_DENIED, Result, ServiceError};
pub use profiles::resolve_profile;
pub use proximity::TeamDistance;

#[cfg(test)]
mod tests;
