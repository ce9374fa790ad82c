//! Subcommand handlers. Each runs against an already-settled
//! [`SessionStore`] and returns the text to print.

use anyhow::{Context as _, Result};
use campus_core::{
  CorporateProfile, Profile, StudentProfile,
  documents::DocumentStore,
  provider::IdentityProvider,
  session::{SessionPhase, SessionState},
  validate::{ValidationErrors, validate_login, validate_signup},
};
use campus_session::SessionStore;
use clap::{Args, Subcommand};

// ─── CLI surface ──────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create a student account and sign in.
  SignupStudent(StudentSignup),
  /// Create a corporate account and sign in.
  SignupCorporate(CorporateSignup),
  /// Sign in with an existing account.
  Login(Credentials),
  /// Sign out of the current account.
  Logout,
  /// Show the signed-in account and its profile.
  Whoami,
}

#[derive(Args, Debug)]
pub struct Credentials {
  #[arg(long)]
  pub email:    String,
  #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
  pub password: String,
}

#[derive(Args, Debug)]
pub struct SignupCredentials {
  #[command(flatten)]
  pub credentials:      Credentials,
  /// Defaults to `--password`.
  #[arg(long)]
  pub confirm_password: Option<String>,
}

#[derive(Args, Debug)]
pub struct StudentSignup {
  #[command(flatten)]
  pub account:         SignupCredentials,
  #[arg(long)]
  pub full_name:       String,
  #[arg(long)]
  pub university:      String,
  #[arg(long)]
  pub department:      String,
  #[arg(long)]
  pub graduation_year: String,
  #[arg(long)]
  pub bio:             Option<String>,
  /// Repeat for several skills.
  #[arg(long = "skill")]
  pub skills:          Vec<String>,
}

#[derive(Args, Debug)]
pub struct CorporateSignup {
  #[command(flatten)]
  pub account:      SignupCredentials,
  #[arg(long)]
  pub company_name: String,
  #[arg(long)]
  pub industry:     String,
  #[arg(long)]
  pub location:     String,
  #[arg(long)]
  pub company_size: String,
  #[arg(long)]
  pub about:        Option<String>,
}

impl StudentSignup {
  fn profile(&self) -> Profile {
    Profile::Student(StudentProfile {
      full_name:       self.full_name.clone(),
      university:      self.university.clone(),
      department:      self.department.clone(),
      graduation_year: self.graduation_year.clone(),
      bio:             self.bio.clone(),
      skills:          (!self.skills.is_empty()).then(|| self.skills.clone()),
    })
  }
}

impl CorporateSignup {
  fn profile(&self) -> Profile {
    Profile::Corporate(CorporateProfile {
      company_name: self.company_name.clone(),
      industry:     self.industry.clone(),
      location:     self.location.clone(),
      company_size: self.company_size.clone(),
      about:        self.about.clone(),
    })
  }
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

pub async fn run<P, D>(store: &SessionStore<P, D>, command: Command) -> Result<String>
where
  P: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  match command {
    Command::SignupStudent(args) => {
      let profile = args.profile();
      signup(store, &args.account, profile).await
    }
    Command::SignupCorporate(args) => {
      let profile = args.profile();
      signup(store, &args.account, profile).await
    }
    Command::Login(creds) => {
      validate_login(&creds.email, &creds.password).map_err(invalid)?;
      let identity = store.authenticate(&creds.email, &creds.password).await?;
      let state = settle_on(store, |s| {
        s.phase == SessionPhase::Ready && s.identity.as_ref() == Some(&identity)
      })
      .await?;
      Ok(render(&state))
    }
    Command::Logout => {
      if !store.state().is_signed_in() {
        return Ok("Not signed in.".to_string());
      }
      store.end_session().await?;
      settle_on(store, |s| s.phase == SessionPhase::SignedOut).await?;
      Ok("Signed out.".to_string())
    }
    Command::Whoami => Ok(render(&store.state())),
  }
}

async fn signup<P, D>(
  store: &SessionStore<P, D>,
  account: &SignupCredentials,
  profile: Profile,
) -> Result<String>
where
  P: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  let creds = &account.credentials;
  let confirm = account.confirm_password.as_deref().unwrap_or(&creds.password);
  validate_signup(&creds.email, &creds.password, confirm, &profile).map_err(invalid)?;

  let role = profile.role();
  let identity = store
    .register(&creds.email, &creds.password, role, profile)
    .await?;
  let state = settle_on(store, |s| {
    s.phase == SessionPhase::Ready && s.identity.as_ref() == Some(&identity)
  })
  .await?;
  Ok(render(&state))
}

async fn settle_on<P, D>(
  store: &SessionStore<P, D>,
  predicate: impl FnMut(&SessionState) -> bool,
) -> Result<SessionState>
where
  P: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  store
    .wait_for(predicate)
    .await
    .context("session store shut down before the session settled")
}

fn invalid(errors: ValidationErrors) -> anyhow::Error {
  let lines: Vec<String> = errors
    .0
    .iter()
    .map(|e| format!("  {}: {}", e.field, e.message))
    .collect();
  anyhow::anyhow!("invalid input:\n{}", lines.join("\n"))
}

// ─── Rendering ────────────────────────────────────────────────────────────────

/// Human-readable description of the session, as shown by `whoami`.
pub fn render(state: &SessionState) -> String {
  let Some(identity) = &state.identity else {
    return "Not signed in.".to_string();
  };

  let mut out = format!("Signed in as {}\n", identity.email);
  match (&state.role, &state.profile) {
    (Some(role), Some(profile)) => {
      out.push_str(&format!("{}: {}\n", role.account_label(), profile.display_name()));
      for (label, value) in profile.summary() {
        out.push_str(&format!("  {label:<16} {value}\n"));
      }
      out.push_str(&format!("Browse: {}\n", role.directory_title()));
    }
    _ if state.loading => out.push_str("Profile is still loading.\n"),
    _ => out.push_str("No profile on record for this account.\n"),
  }
  out
}
