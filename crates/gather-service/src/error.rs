//! Service error type.

use thiserror::Error;

/// Shown to a caller who tried to change a team they may not change.
pub const EDIT_DENIED: &str = "You can not make changes to this team.";

/// An error returned by a service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("not found: {0}")]
  NotFound(String),

  /// The message is meant for the end user as is.
  #[error("permission denied: {0}")]
  PermissionDenied(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ServiceError {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub fn edit_denied() -> Self { Self::PermissionDenied(EDIT_DENIED.to_owned()) }

  /// The user-facing warning, if this is a permission failure.
  pub fn warning(&self) -> Option<&str> {
    match self {
      Self::PermissionDenied(message) => Some(message),
      _ => None,
    }
  }
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
