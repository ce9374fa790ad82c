//! The persisted user record: `users/<uid>` in the document store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{
  Error, Result,
  identity::Role,
  profile::Profile,
};

/// Collection holding one [`UserRecord`] per account, keyed by uid.
pub const USERS_COLLECTION: &str = "users";

/// Role and profile written together at registration and read together on
/// every session restore.
///
/// Only `userType` and `profile` are needed to restore a session. A missing
/// email or creation time does not invalidate the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
  pub email:      String,
  pub role:       Role,
  pub profile:    Profile,
  pub created_at: Option<DateTime<Utc>>,
}

/// Wire shape. The profile stays raw until the role is known.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserRecord {
  #[serde(default)]
  email:      String,
  user_type:  Role,
  profile:    Value,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  created_at: Option<String>,
}

impl UserRecord {
  /// Build a record, rejecting a profile whose variant disagrees with `role`.
  pub fn new(
    email: impl Into<String>,
    role: Role,
    profile: Profile,
    created_at: DateTime<Utc>,
  ) -> Result<Self> {
    if profile.role() != role {
      return Err(Error::RoleMismatch { record: role, profile: profile.role() });
    }
    Ok(Self {
      email: email.into(),
      role,
      profile,
      created_at: Some(created_at),
    })
  }

  pub fn to_json(&self) -> Result<Value> {
    let raw = RawUserRecord {
      email:      self.email.clone(),
      user_type:  self.role,
      profile:    self.profile.to_json()?,
      created_at: self
        .created_at
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    };
    Ok(serde_json::to_value(raw)?)
  }

  pub fn from_json(value: Value) -> Result<Self> {
    let raw: RawUserRecord = serde_json::from_value(value)?;
    let profile = Profile::from_json(raw.user_type, raw.profile)?;
    let created_at = raw.created_at.as_deref().and_then(parse_timestamp);
    Ok(Self {
      email: raw.email,
      role: raw.user_type,
      profile,
      created_at,
    })
  }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  match DateTime::parse_from_rfc3339(raw) {
    Ok(dt) => Some(dt.with_timezone(&Utc)),
    Err(e) => {
      warn!(value = raw, error = %e, "ignoring unparseable createdAt");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use serde_json::json;

  use super::*;
  use crate::profile::CorporateProfile;

  fn acme() -> Profile {
    Profile::Corporate(CorporateProfile {
      company_name: "Acme".into(),
      industry:     "Manufacturing".into(),
      location:     "Springfield".into(),
      company_size: "51-200".into(),
      about:        None,
    })
  }

  #[test]
  fn record_json_has_expected_keys() {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let record = UserRecord::new("hr@acme.com", Role::Corporate, acme(), at).unwrap();
    let value = record.to_json().unwrap();

    assert_eq!(value["email"], "hr@acme.com");
    assert_eq!(value["userType"], "corporate");
    assert_eq!(value["profile"]["companyName"], "Acme");
    assert_eq!(value["createdAt"], "2025-03-01T12:00:00.000Z");

    assert_eq!(UserRecord::from_json(value).unwrap(), record);
  }

  #[test]
  fn new_rejects_mismatched_role() {
    let err = UserRecord::new("a@x.com", Role::Student, acme(), Utc::now()).unwrap_err();
    assert!(matches!(
      err,
      Error::RoleMismatch { record: Role::Student, profile: Role::Corporate }
    ));
  }

  #[test]
  fn from_json_rejects_profile_of_other_role() {
    let value = json!({
      "email": "a@x.com",
      "userType": "student",
      "profile": { "companyName": "Acme", "industry": "x", "location": "y", "companySize": "1-10" },
      "createdAt": "2025-03-01T12:00:00.000Z",
    });
    assert!(matches!(
      UserRecord::from_json(value),
      Err(Error::ProfileShape { role: Role::Student, .. })
    ));
  }

  #[test]
  fn from_json_tolerates_bad_or_missing_timestamp() {
    let mut value = UserRecord::new("hr@acme.com", Role::Corporate, acme(), Utc::now())
      .unwrap()
      .to_json()
      .unwrap();
    value["createdAt"] = json!("yesterday");
    let record = UserRecord::from_json(value.clone()).unwrap();
    assert_eq!(record.created_at, None);
    assert_eq!(record.profile, acme());

    value.as_object_mut().unwrap().remove("createdAt");
    let record = UserRecord::from_json(value).unwrap();
    assert_eq!(record.created_at, None);
    assert_eq!(record.role, Role::Corporate);
  }

  #[test]
  fn from_json_ignores_extra_profile_keys() {
    let value = json!({
      "email": "hr@acme.com",
      "userType": "corporate",
      "profile": {
        "companyName": "Acme", "industry": "Manufacturing",
        "location": "Springfield", "companySize": "51-200",
        "logoUrl": "https://example.com/acme.png",
      },
    });
    let record = UserRecord::from_json(value).unwrap();
    assert_eq!(record.profile, acme());
  }
}
