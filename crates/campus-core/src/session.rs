//! The consumer-visible session snapshot.

use serde::Serialize;

use crate::{identity::{Identity, Role}, profile::Profile};

/// Where the session is in its sign-in lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
  /// No notification received from the provider yet.
  #[default]
  Uninitialized,
  /// An identity is known and its user record is being fetched.
  Resolving,
  /// An identity is signed in; role and profile are present if a record was
  /// found.
  Ready,
  SignedOut,
}

/// Who is signed in and what their profile is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
  pub phase:    SessionPhase,
  pub identity: Option<Identity>,
  pub role:     Option<Role>,
  pub profile:  Option<Profile>,
  pub loading:  bool,
  /// Incremented once per committed change.
  pub revision: u64,
}

impl Default for SessionState {
  fn default() -> Self {
    Self {
      phase:    SessionPhase::Uninitialized,
      identity: None,
      role:     None,
      profile:  None,
      loading:  true,
      revision: 0,
    }
  }
}

impl SessionState {
  pub fn is_signed_in(&self) -> bool { self.identity.is_some() }

  /// Signed in, resolved, but without a user record.
  pub fn is_profile_missing(&self) -> bool {
    self.phase == SessionPhase::Ready && self.profile.is_none()
  }

  pub fn resolving(identity: Identity) -> Self {
    Self {
      phase:    SessionPhase::Resolving,
      identity: Some(identity),
      role:     None,
      profile:  None,
      loading:  true,
      revision: 0,
    }
  }

  /// A settled sign-in. Role is taken from the profile so the two can never
  /// disagree.
  pub fn ready(identity: Identity, profile: Option<Profile>) -> Self {
    Self {
      phase: SessionPhase::Ready,
      identity: Some(identity),
      role: profile.as_ref().map(Profile::role),
      profile,
      loading: false,
      revision: 0,
    }
  }

  pub fn signed_out() -> Self {
    Self {
      phase:    SessionPhase::SignedOut,
      identity: None,
      role:     None,
      profile:  None,
      loading:  false,
      revision: 0,
    }
  }
}
