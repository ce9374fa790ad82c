//! [`SessionStore`]: the single authoritative view of who is signed in.

use std::sync::Arc;

use campus_core::{
  Identity, Profile, Role,
  documents::DocumentStore,
  provider::{IdentityProvider, IdentitySubscription, SubscriptionHandle},
  record::{USERS_COLLECTION, UserRecord},
  session::{SessionPhase, SessionState},
};
use chrono::Utc;
use tokio::sync::{RwLock, watch};
use tracing::{debug, error, info, warn};

use crate::{
  error::{
    AuthenticationError, ProfileFetchError, RegistrationError,
    SessionTerminationError,
  },
  liveness::LivenessToken,
};

// ─── Shared worker state ─────────────────────────────────────────────────────

/// Everything the identity-change worker touches. Held by both the worker and
/// the store handle.
struct Shared<D> {
  documents:    Arc<D>,
  state:        watch::Sender<SessionState>,
  liveness:     LivenessToken,
  /// Held for writing by `register` from account creation until the user
  /// record is written; held for reading by the worker while it resolves a
  /// profile.
  registration: RwLock<()>,
}

impl<D> Shared<D> {
  /// Revoke liveness under the state lock. Returns `true` on the first call.
  fn revoke(&self) -> bool {
    let mut revoked = false;
    self.state.send_if_modified(|_| {
      revoked = self.liveness.revoke();
      false
    });
    revoked
  }
}

impl<D: DocumentStore> Shared<D> {
  /// Apply `next` unless the store is torn down or `next` returns `None`.
  ///
  /// The liveness check and the write happen under the state channel's lock,
  /// so a concurrent teardown either precedes the whole commit or follows it.
  fn commit(&self, next: impl FnOnce(&SessionState) -> Option<SessionState>) -> bool {
    self.state.send_if_modified(|current| {
      let Some(applied) = self.liveness.run_if_alive(|| next(current)) else {
        return false;
      };
      let Some(state) = applied else {
        return false;
      };
      let revision = current.revision + 1;
      debug!(phase = ?state.phase, revision, "session state committed");
      *current = SessionState { revision, ..state };
      true
    })
  }

  async fn fetch_record(
    &self,
    identity: &Identity,
  ) -> Result<Option<UserRecord>, ProfileFetchError> {
    let value = self
      .documents
      .read_record(USERS_COLLECTION, &identity.uid)
      .await
      .map_err(|e| ProfileFetchError::Store(Box::new(e)))?;
    Ok(value.map(UserRecord::from_json).transpose()?)
  }

  /// Load the profile for `identity`. Failures are logged, never returned.
  async fn resolve_profile(&self, identity: &Identity) -> Option<Profile> {
    let _gate = self.registration.read().await;
    match self.fetch_record(identity).await {
      Ok(Some(record)) => Some(record.profile),
      Ok(None) => {
        debug!(uid = %identity.uid, "no user record for identity");
        None
      }
      Err(e) => {
        warn!(uid = %identity.uid, error = %e, "failed to fetch user record");
        None
      }
    }
  }
}

// ─── Worker ──────────────────────────────────────────────────────────────────

/// Drain identity changes one at a time, in emission order. The next
/// notification is not read until the current one's fetch has settled.
async fn run_worker<D>(shared: Arc<Shared<D>>, mut changes: IdentitySubscription)
where
  D: DocumentStore + 'static,
{
  loop {
    let change = tokio::select! {
      biased;
      _ = shared.liveness.revoked() => break,
      change = changes.next() => match change {
        Some(change) => change,
        None => {
          if shared.revoke() {
            warn!("identity stream closed by provider; session store torn down");
          }
          break;
        }
      },
    };

    match change {
      None => {
        shared.commit(|current| {
          (current.phase != SessionPhase::SignedOut).then(SessionState::signed_out)
        });
      }
      Some(identity) => {
        if !shared.commit(|_| Some(SessionState::resolving(identity.clone()))) {
          break;
        }
        let profile = shared.resolve_profile(&identity).await;
        if changes.has_pending() {
          debug!(uid = %identity.uid, "discarding profile for superseded identity");
          continue;
        }
        shared.commit(|_| Some(SessionState::ready(identity, profile)));
      }
    }
  }

  changes.unsubscribe();
  debug!("session worker stopped");
}

// ─── Store ───────────────────────────────────────────────────────────────────

struct Inner<P, D> {
  provider:     Arc<P>,
  shared:       Arc<Shared<D>>,
  subscription: SubscriptionHandle,
}

impl<P, D> Inner<P, D> {
  fn shutdown(&self) {
    if self.shared.revoke() {
      self.subscription.unsubscribe();
      info!("session store torn down");
    }
  }
}

impl<P, D> Drop for Inner<P, D> {
  fn drop(&mut self) { self.shutdown(); }
}

/// Tracks the provider's identity-change stream and the matching user record.
///
/// Role and profile are only ever written by the store's worker task, in
/// response to identity changes. `register`, `authenticate` and
/// `end_session` talk to the collaborators and let the resulting
/// notification update the state.
///
/// Cloning is cheap and every clone refers to the same session. Dropping the
/// last clone tears the store down.
pub struct SessionStore<P, D> {
  inner: Arc<Inner<P, D>>,
}

impl<P, D> Clone for SessionStore<P, D> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<P, D> SessionStore<P, D>
where
  P: IdentityProvider + 'static,
  D: DocumentStore + 'static,
{
  /// Subscribe to `provider` and start the worker task.
  ///
  /// Must be called from within a tokio runtime.
  pub fn new(provider: Arc<P>, documents: Arc<D>) -> Self {
    let (state, _) = watch::channel(SessionState::default());
    let shared = Arc::new(Shared {
      documents,
      state,
      liveness: LivenessToken::new(),
      registration: RwLock::new(()),
    });

    let changes = provider.subscribe();
    let subscription = changes.handle();
    tokio::spawn(run_worker(shared.clone(), changes));

    Self {
      inner: Arc::new(Inner { provider, shared, subscription }),
    }
  }

  // ── Reads ────────────────────────────────────────────────────────────────

  pub fn state(&self) -> SessionState { self.inner.shared.state.borrow().clone() }

  /// A receiver that is notified on every committed change.
  pub fn subscribe(&self) -> watch::Receiver<SessionState> {
    self.inner.shared.state.subscribe()
  }

  pub fn liveness(&self) -> LivenessToken { self.inner.shared.liveness.clone() }

  pub fn is_alive(&self) -> bool { self.inner.shared.liveness.is_alive() }

  /// Wait for the first state satisfying `predicate`. Returns `None` if the
  /// store is torn down first.
  pub async fn wait_for(
    &self,
    mut predicate: impl FnMut(&SessionState) -> bool,
  ) -> Option<SessionState> {
    let mut rx = self.subscribe();
    let liveness = self.liveness();
    tokio::select! {
      biased;
      found = rx.wait_for(|s| predicate(s)) => found.ok().map(|s| s.clone()),
      _ = liveness.revoked() => None,
    }
  }

  /// Wait until the session is no longer loading.
  pub async fn wait_until_settled(&self) -> Option<SessionState> {
    self.wait_for(|s| !s.loading).await
  }

  // ── Operations ───────────────────────────────────────────────────────────

  /// Create an account and persist its user record.
  ///
  /// If the account is created but the record write fails, the account is
  /// left in place and [`RegistrationError::RecordWrite`] is returned.
  pub async fn register(
    &self,
    email: &str,
    password: &str,
    role: Role,
    profile: Profile,
  ) -> Result<Identity, RegistrationError> {
    if email.trim().is_empty() || password.is_empty() {
      return Err(RegistrationError::MissingCredentials);
    }
    if profile.role() != role {
      return Err(RegistrationError::RoleMismatch { role, profile: profile.role() });
    }

    let record = UserRecord::new(email, role, profile, Utc::now())?.to_json()?;

    let _gate = self.inner.shared.registration.write().await;
    let identity = self
      .inner
      .provider
      .create_account(email, password)
      .await
      .map_err(|reason| {
        error!(error = %reason, "account creation failed");
        RegistrationError::Provider(reason)
      })?;

    self
      .inner
      .shared
      .documents
      .write_record(USERS_COLLECTION, &identity.uid, record)
      .await
      .map_err(|e| {
        error!(uid = %identity.uid, error = %e, "user record write failed; account kept");
        RegistrationError::RecordWrite {
          uid:    identity.uid.clone(),
          source: Box::new(e),
        }
      })?;

    info!(uid = %identity.uid, %role, "account registered");
    Ok(identity)
  }

  /// Sign in with existing credentials.
  pub async fn authenticate(
    &self,
    email: &str,
    password: &str,
  ) -> Result<Identity, AuthenticationError> {
    if email.trim().is_empty() || password.is_empty() {
      return Err(AuthenticationError::MissingCredentials);
    }

    let identity = self
      .inner
      .provider
      .validate_credentials(email, password)
      .await
      .map_err(|reason| {
        error!(error = %reason, "sign-in failed");
        AuthenticationError::Provider(reason)
      })?;

    info!(uid = %identity.uid, "signed in");
    Ok(identity)
  }

  /// Sign out. Local state is untouched if the provider call fails.
  pub async fn end_session(&self) -> Result<(), SessionTerminationError> {
    self.inner.provider.invalidate_session().await.map_err(|reason| {
      error!(error = %reason, "sign-out failed");
      SessionTerminationError(reason)
    })?;
    info!("signed out");
    Ok(())
  }

  /// Tear the store down: no further state changes are applied and the
  /// identity-change subscription is released. In-flight provider and
  /// document-store calls run to completion but their results are dropped.
  ///
  /// Calling this more than once has no further effect.
  pub fn shutdown(&self) { self.inner.shutdown(); }
}
