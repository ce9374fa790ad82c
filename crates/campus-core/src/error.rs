//! Error types for `campus-core`.

use thiserror::Error;

use crate::identity::Role;

/// Decoding and consistency errors for core types.
#[derive(Debug, Error)]
pub enum Error {
  #[error("profile does not match the {role} shape: {source}")]
  ProfileShape {
    role:   Role,
    #[source]
    source: serde_json::Error,
  },

  #[error("record role {record} does not match profile role {profile}")]
  RoleMismatch { record: Role, profile: Role },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reason codes reported by an identity provider.
///
/// These are the only failures a provider may surface; backends map their own
/// I/O errors to [`ProviderError::Unavailable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
  #[error("an account already exists for this email")]
  AccountExists,

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("no account exists for this email")]
  AccountNotFound,

  #[error("email address is malformed")]
  InvalidEmail,

  #[error("password is too weak")]
  WeakPassword,

  #[error("identity provider unavailable: {0}")]
  Unavailable(String),
}
