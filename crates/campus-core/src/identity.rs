//! Identity and role, the two things the provider and the user record agree
//! on about an account.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// An authenticated account as issued by the identity provider.
///
/// The session store only ever reads identities; it never constructs one on
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
  /// Opaque provider handle; also the key of the account's user record.
  pub uid:   String,
  pub email: String,
}

impl Identity {
  pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
    Self { uid: uid.into(), email: email.into() }
  }
}

/// Classification of an account, fixed at registration.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Student,
  Corporate,
}

impl Role {
  /// Heading shown on the account's profile page.
  pub fn account_label(self) -> &'static str {
    match self {
      Role::Student => "Student Account",
      Role::Corporate => "Corporate Account",
    }
  }

  /// Title of the directory an account of this role browses: students look
  /// at companies and companies look at students.
  pub fn directory_title(self) -> &'static str {
    match self {
      Role::Student => "Companies",
      Role::Corporate => "Students",
    }
  }
}
