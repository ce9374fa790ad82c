//! Form-level input rules for the login and signup flows.
//!
//! Every rule is checked so the caller can report all failing fields at once.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::profile::{CorporateProfile, Profile, StudentProfile};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("static regex"));
static YEAR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{4}$").expect("static regex"));

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
  pub field:   &'static str,
  pub message: &'static str,
}

/// All fields that failed validation, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
    write!(f, "{}", parts.join("; "))
  }
}

impl ValidationErrors {
  pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.0.iter().map(|e| e.field)
  }
}

#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
  fn fail(&mut self, field: &'static str, message: &'static str) {
    self.0.push(FieldError { field, message });
  }

  fn required(&mut self, field: &'static str, value: &str, message: &'static str) -> bool {
    if value.trim().is_empty() {
      self.fail(field, message);
      false
    } else {
      true
    }
  }

  fn finish(self) -> Result<(), ValidationErrors> {
    if self.0.is_empty() { Ok(()) } else { Err(ValidationErrors(self.0)) }
  }
}

fn check_email(c: &mut Collector, email: &str) {
  if c.required("email", email, "Email is required") && !EMAIL.is_match(email) {
    c.fail("email", "Email is invalid");
  }
}

fn check_password(c: &mut Collector, password: &str) {
  if c.required("password", password, "Password is required")
    && password.chars().count() < MIN_PASSWORD_LEN
  {
    c.fail("password", "Password must be at least 6 characters");
  }
}

/// Rules applied by the login form.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
  let mut c = Collector::default();
  check_email(&mut c, email);
  check_password(&mut c, password);
  c.finish()
}

/// Rules applied by the signup forms: account fields, then profile fields.
pub fn validate_signup(
  email: &str,
  password: &str,
  confirm_password: &str,
  profile: &Profile,
) -> Result<(), ValidationErrors> {
  let mut c = Collector::default();
  check_email(&mut c, email);
  check_password(&mut c, password);
  if c.required("confirmPassword", confirm_password, "Please confirm your password")
    && password != confirm_password
  {
    c.fail("confirmPassword", "Passwords do not match");
  }

  match profile {
    Profile::Student(p) => check_student(&mut c, p),
    Profile::Corporate(p) => check_corporate(&mut c, p),
  }
  c.finish()
}

fn check_student(c: &mut Collector, p: &StudentProfile) {
  c.required("fullName", &p.full_name, "Full name is required");
  c.required("university", &p.university, "University name is required");
  c.required("department", &p.department, "Department is required");
  if c.required("graduationYear", &p.graduation_year, "Graduation year is required")
    && !YEAR.is_match(&p.graduation_year)
  {
    c.fail("graduationYear", "Please enter a valid year (e.g., 2024)");
  }
}

fn check_corporate(c: &mut Collector, p: &CorporateProfile) {
  c.required("companyName", &p.company_name, "Company name is required");
  c.required("industry", &p.industry, "Industry is required");
  c.required("location", &p.location, "Company location is required");
  c.required("companySize", &p.company_size, "Company size is required");
}

#[cfg(test)]
mod tests {
  use super::*;

  fn student(year: &str) -> Profile {
    Profile::Student(StudentProfile {
      full_name:       "Jo".into(),
      university:      "State".into(),
      department:      "Physics".into(),
      graduation_year: year.into(),
      bio:             None,
      skills:          None,
    })
  }

  #[test]
  fn login_accepts_plausible_credentials() {
    assert!(validate_login("a@x.com", "secret1").is_ok());
  }

  #[test]
  fn login_reports_every_field() {
    let err = validate_login("not-an-email", "123").unwrap_err();
    assert_eq!(err.fields().collect::<Vec<_>>(), ["email", "password"]);
    assert_eq!(err.0[0].message, "Email is invalid");
    assert_eq!(err.0[1].message, "Password must be at least 6 characters");
  }

  #[test]
  fn empty_fields_are_required() {
    let err = validate_login("", "").unwrap_err();
    assert_eq!(err.0[0].message, "Email is required");
    assert_eq!(err.0[1].message, "Password is required");
  }

  #[test]
  fn signup_checks_confirmation_and_year() {
    let err = validate_signup("a@x.com", "secret1", "secret2", &student("26")).unwrap_err();
    assert_eq!(
      err.fields().collect::<Vec<_>>(),
      ["confirmPassword", "graduationYear"]
    );
  }

  #[test]
  fn signup_accepts_complete_student() {
    assert!(validate_signup("a@x.com", "secret1", "secret1", &student("2026")).is_ok());
  }

  #[test]
  fn corporate_fields_are_required() {
    let profile = Profile::Corporate(CorporateProfile {
      company_name: "".into(),
      industry:     "Tech".into(),
      location:     " ".into(),
      company_size: "11-50".into(),
      about:        None,
    });
    let err = validate_signup("hr@acme.com", "secret1", "secret1", &profile).unwrap_err();
    assert_eq!(err.fields().collect::<Vec<_>>(), ["companyName", "location"]);
  }
}
