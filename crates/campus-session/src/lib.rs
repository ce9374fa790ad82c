//! Session/identity synchronisation for Campus Connect.
//!
//! [`SessionStore`] mirrors an [`IdentityProvider`]'s identity-change stream
//! into a consistent [`SessionState`], loading each account's role and profile
//! from a [`DocumentStore`].
//!
//! [`IdentityProvider`]: campus_core::provider::IdentityProvider
//! [`DocumentStore`]: campus_core::documents::DocumentStore
//! [`SessionState`]: campus_core::session::SessionState

pub mod error;
pub mod liveness;
mod store;

pub use error::{
  AuthenticationError, ProfileFetchError, RegistrationError,
  SessionTerminationError,
};
pub use liveness::LivenessToken;
pub use store::SessionStore;
