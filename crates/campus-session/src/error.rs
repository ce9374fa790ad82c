//! Errors returned by [`SessionStore`](crate::SessionStore) operations.
//!
//! Each public operation has its own error type. Provider reason codes are
//! wrapped unchanged so callers can pick a user-facing message.

use campus_core::{ProviderError, Role};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistrationError {
  #[error("email and password are required")]
  MissingCredentials,

  #[error("a {profile} profile cannot be registered as a {role} account")]
  RoleMismatch { role: Role, profile: Role },

  #[error("user record could not be encoded: {0}")]
  Record(#[from] campus_core::Error),

  #[error("account creation failed: {0}")]
  Provider(#[source] ProviderError),

  /// The account exists at the provider but has no user record. It is not
  /// deleted.
  #[error("account {uid} was created but its user record was not saved: {source}")]
  RecordWrite {
    uid:    String,
    #[source]
    source: BoxError,
  },
}

impl RegistrationError {
  /// The provider's reason code, if the provider rejected the request.
  pub fn reason(&self) -> Option<&ProviderError> {
    match self {
      Self::Provider(reason) => Some(reason),
      _ => None,
    }
  }
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
  #[error("email and password are required")]
  MissingCredentials,

  #[error("sign-in failed: {0}")]
  Provider(#[source] ProviderError),
}

impl AuthenticationError {
  pub fn reason(&self) -> Option<&ProviderError> {
    match self {
      Self::Provider(reason) => Some(reason),
      Self::MissingCredentials => None,
    }
  }
}

#[derive(Debug, Error)]
#[error("sign-out failed: {0}")]
pub struct SessionTerminationError(#[source] pub ProviderError);

/// Failure to load the user record for a freshly observed identity.
///
/// Only ever logged; the session settles without a profile instead.
#[derive(Debug, Error)]
pub enum ProfileFetchError {
  #[error("document store error: {0}")]
  Store(#[source] BoxError),

  #[error("malformed user record: {0}")]
  Record(#[from] campus_core::Error),
}
