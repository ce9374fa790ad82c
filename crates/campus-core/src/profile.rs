//! Role-specific profile payloads.
//!
//! The stored profile object carries no tag of its own; its shape is chosen by
//! the record's `userType`. [`Profile::from_json`] performs that role-directed
//! decode so a student record can never be read back as a corporate profile.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, identity::Role};

// ─── Variants ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
  pub full_name:       String,
  /// Institution name; stored as `university` for compatibility with existing
  /// records.
  pub university:      String,
  pub department:      String,
  /// Four-digit year, kept as text exactly as entered.
  pub graduation_year: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bio:             Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub skills:          Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateProfile {
  pub company_name: String,
  pub industry:     String,
  pub location:     String,
  /// Size bucket label, e.g. `"51-200"`.
  pub company_size: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub about:        Option<String>,
}

// ─── Sum type ────────────────────────────────────────────────────────────────

/// Profile of an account. The variant always agrees with the account's
/// [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Profile {
  Student(StudentProfile),
  Corporate(CorporateProfile),
}

impl Profile {
  pub fn role(&self) -> Role {
    match self {
      Profile::Student(_) => Role::Student,
      Profile::Corporate(_) => Role::Corporate,
    }
  }

  /// The name shown in greetings: a student's full name or a company name.
  pub fn display_name(&self) -> &str {
    match self {
      Profile::Student(p) => &p.full_name,
      Profile::Corporate(p) => &p.company_name,
    }
  }

  /// Labelled fields in the order the profile page lists them.
  pub fn summary(&self) -> Vec<(&'static str, &str)> {
    match self {
      Profile::Student(p) => vec![
        ("Full Name", p.full_name.as_str()),
        ("University", p.university.as_str()),
        ("Department", p.department.as_str()),
        ("Graduation Year", p.graduation_year.as_str()),
      ],
      Profile::Corporate(p) => vec![
        ("Company Name", p.company_name.as_str()),
        ("Industry", p.industry.as_str()),
        ("Location", p.location.as_str()),
        ("Company Size", p.company_size.as_str()),
      ],
    }
  }

  pub fn to_json(&self) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(self)?)
  }

  /// Decode an untagged profile object using the role it was stored under.
  pub fn from_json(role: Role, value: serde_json::Value) -> Result<Self> {
    let decoded = match role {
      Role::Student => serde_json::from_value(value).map(Profile::Student),
      Role::Corporate => serde_json::from_value(value).map(Profile::Corporate),
    };
    decoded.map_err(|source| Error::ProfileShape { role, source })
  }
}

impl From<StudentProfile> for Profile {
  fn from(p: StudentProfile) -> Self { Profile::Student(p) }
}

impl From<CorporateProfile> for Profile {
  fn from(p: CorporateProfile) -> Self { Profile::Corporate(p) }
}
