//! [`SqliteIdentityProvider`]: local email/password accounts implementing
//! [`IdentityProvider`].
//!
//! The signed-in account is persisted in the `session` table so a sign-in
//! survives process restarts, and mirrored in memory for subscribers.

use campus_core::{
  Identity, ProviderError,
  provider::{IdentityBroadcaster, IdentityProvider, IdentitySubscription},
  validate::MIN_PASSWORD_LEN,
};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::OptionalExtension as _;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  documents::init_schema,
  password::{hash_password, verify_password},
};

/// Lowercased, trimmed form used for storage and lookup.
fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

fn unavailable(e: Error) -> ProviderError {
  warn!(error = %e, "identity store failure");
  ProviderError::Unavailable(e.to_string())
}

struct AccountRow {
  uid:           String,
  email:         String,
  password_hash: String,
}

pub struct SqliteIdentityProvider {
  conn:        tokio_rusqlite::Connection,
  hub:         IdentityBroadcaster,
  current:     Mutex<Option<Identity>>,
  /// Serialises sign-in and sign-out so the persisted session row and the
  /// emitted notifications agree on order.
  transitions: tokio::sync::Mutex<()>,
}

impl SqliteIdentityProvider {
  /// Build a provider over `conn`, restoring any persisted sign-in.
  pub async fn new(conn: tokio_rusqlite::Connection) -> Result<Self> {
    init_schema(&conn).await?;

    let restored: Option<(String, String)> = conn
      .call(|conn| {
        Ok(conn
          .query_row(
            "SELECT a.uid, a.email
             FROM session s JOIN accounts a ON a.uid = s.uid
             WHERE s.slot = 0",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    if let Some((uid, _)) = &restored {
      debug!(%uid, "restored persisted session");
    }

    Ok(Self {
      conn,
      hub: IdentityBroadcaster::new(),
      current: Mutex::new(restored.map(|(uid, email)| Identity::new(uid, email))),
      transitions: tokio::sync::Mutex::new(()),
    })
  }

  pub fn current(&self) -> Option<Identity> { self.current.lock().clone() }

  pub fn subscriber_count(&self) -> usize { self.hub.subscriber_count() }

  async fn find_account(&self, email: String) -> Result<Option<AccountRow>> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT uid, email, password_hash FROM accounts WHERE email = ?1",
            rusqlite::params![email],
            |row| {
              Ok(AccountRow {
                uid:           row.get(0)?,
                email:         row.get(1)?,
                password_hash: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;
    Ok(row)
  }

  /// Insert an account unless the email is taken. Returns `false` if taken.
  async fn insert_account(&self, identity: &Identity, password_hash: String) -> Result<bool> {
    let uid    = identity.uid.clone();
    let email  = identity.email.clone();
    let at_str = Utc::now().to_rfc3339();

    let inserted = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM accounts WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO accounts (uid, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![uid, email, password_hash, at_str],
        )?;
        Ok(true)
      })
      .await?;
    Ok(inserted)
  }

  /// Persist `identity` as signed in and notify subscribers if it changed.
  async fn sign_in(&self, identity: Identity) -> Result<()> {
    let _transition = self.transitions.lock().await;

    let uid    = identity.uid.clone();
    let at_str = Utc::now().to_rfc3339();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO session (slot, uid, signed_in_at) VALUES (0, ?1, ?2)
           ON CONFLICT (slot) DO UPDATE SET uid = excluded.uid,
                                            signed_in_at = excluded.signed_in_at",
          rusqlite::params![uid, at_str],
        )?;
        Ok(())
      })
      .await?;

    let mut current = self.current.lock();
    if current.as_ref().map(|c| &c.uid) != Some(&identity.uid) {
      *current = Some(identity.clone());
      self.hub.emit(Some(identity));
    }
    Ok(())
  }

  async fn sign_out(&self) -> Result<()> {
    let _transition = self.transitions.lock().await;
    if self.current.lock().is_none() {
      return Ok(());
    }

    self
      .conn
      .call(|conn| {
        conn.execute("DELETE FROM session WHERE slot = 0", [])?;
        Ok(())
      })
      .await?;

    let mut current = self.current.lock();
    if current.take().is_some() {
      self.hub.emit(None);
    }
    Ok(())
  }
}

impl IdentityProvider for SqliteIdentityProvider {
  async fn create_account(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
    let email = normalize_email(email);
    if !email.contains('@') {
      return Err(ProviderError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
      return Err(ProviderError::WeakPassword);
    }

    let password = password.to_owned();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
      .await
      .map_err(Error::from)
      .and_then(|hashed| hashed)
      .map_err(unavailable)?;

    let identity = Identity::new(Uuid::new_v4().to_string(), email);
    if !self
      .insert_account(&identity, password_hash)
      .await
      .map_err(unavailable)?
    {
      return Err(ProviderError::AccountExists);
    }
    debug!(uid = %identity.uid, "account created");

    self.sign_in(identity.clone()).await.map_err(unavailable)?;
    Ok(identity)
  }

  async fn validate_credentials(
    &self,
    email: &str,
    password: &str,
  ) -> Result<Identity, ProviderError> {
    let account = self
      .find_account(normalize_email(email))
      .await
      .map_err(unavailable)?
      .ok_or(ProviderError::AccountNotFound)?;

    let password = password.to_owned();
    let phc = account.password_hash;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &phc))
      .await
      .map_err(|e| unavailable(e.into()))?;
    if !verified {
      return Err(ProviderError::InvalidCredentials);
    }

    let identity = Identity::new(account.uid, account.email);
    self.sign_in(identity.clone()).await.map_err(unavailable)?;
    Ok(identity)
  }

  async fn invalidate_session(&self) -> Result<(), ProviderError> {
    self.sign_out().await.map_err(unavailable)
  }

  fn subscribe(&self) -> IdentitySubscription {
    let current = self.current.lock();
    self.hub.subscribe(current.clone())
  }
}
