//! The `IdentityProvider` trait and its identity-change subscription.
//!
//! The trait is implemented by authentication backends (e.g.
//! `campus-store-sqlite`). The session store depends on this abstraction, not
//! on any concrete backend.

use std::{
  collections::HashMap,
  fmt,
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::{error::ProviderError, identity::Identity};

/// One notification on the identity-change stream: the newly signed-in
/// identity, or `None` after a sign-out.
pub type IdentityChange = Option<Identity>;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an external authentication service.
///
/// All methods return `Send` futures so the trait can be driven from a
/// multi-threaded tokio runtime.
pub trait IdentityProvider: Send + Sync {
  /// Create an account and sign it in. The new identity is announced on every
  /// live subscription.
  fn create_account<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Identity, ProviderError>> + Send + 'a;

  /// Check credentials and sign the matching account in.
  fn validate_credentials<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Identity, ProviderError>> + Send + 'a;

  /// Sign out the current account. Succeeds without notifying anyone when no
  /// account is signed in.
  fn invalidate_session(
    &self,
  ) -> impl Future<Output = Result<(), ProviderError>> + Send + '_;

  /// Open an identity-change subscription.
  ///
  /// The first notification is the provider's current identity; after that
  /// one notification is delivered per sign-in or sign-out, in the order the
  /// provider observed them.
  fn subscribe(&self) -> IdentitySubscription;
}

// ─── Subscription ────────────────────────────────────────────────────────────

type Unsubscribe = Box<dyn FnOnce() + Send>;

/// Cloneable handle that detaches a subscription from its provider.
#[derive(Clone)]
pub struct SubscriptionHandle {
  detach: Arc<Mutex<Option<Unsubscribe>>>,
}

impl SubscriptionHandle {
  /// Stop delivery. Calling this more than once has no further effect.
  pub fn unsubscribe(&self) {
    let detach = self.detach.lock().take();
    if let Some(detach) = detach {
      detach();
    }
  }

  pub fn is_active(&self) -> bool { self.detach.lock().is_some() }
}

impl fmt::Debug for SubscriptionHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SubscriptionHandle")
      .field("active", &self.is_active())
      .finish()
  }
}

/// An ordered stream of [`IdentityChange`] notifications.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct IdentitySubscription {
  events: mpsc::UnboundedReceiver<IdentityChange>,
  handle: SubscriptionHandle,
}

impl IdentitySubscription {
  /// Wrap a receiver fed by the provider. `on_unsubscribe` runs at most once,
  /// when the subscriber detaches.
  pub fn new(
    events: mpsc::UnboundedReceiver<IdentityChange>,
    on_unsubscribe: impl FnOnce() + Send + 'static,
  ) -> Self {
    Self {
      events,
      handle: SubscriptionHandle {
        detach: Arc::new(Mutex::new(Some(Box::new(on_unsubscribe)))),
      },
    }
  }

  /// Wait for the next notification. Returns `None` once the subscription is
  /// detached and the buffered notifications are drained.
  pub async fn next(&mut self) -> Option<IdentityChange> {
    self.events.recv().await
  }

  /// Whether a notification is already queued behind the one being handled.
  pub fn has_pending(&self) -> bool { !self.events.is_empty() }

  pub fn handle(&self) -> SubscriptionHandle { self.handle.clone() }

  pub fn unsubscribe(&mut self) {
    self.handle.unsubscribe();
    self.events.close();
  }
}

impl Drop for IdentitySubscription {
  fn drop(&mut self) { self.handle.unsubscribe(); }
}

// ─── Fan-out ─────────────────────────────────────────────────────────────────

type Senders = HashMap<u64, mpsc::UnboundedSender<IdentityChange>>;

/// Delivers identity changes to every live subscriber, in emission order.
///
/// Providers hold one of these and call [`emit`](Self::emit) on each real
/// sign-in or sign-out. Cloning shares the subscriber set.
#[derive(Clone, Default)]
pub struct IdentityBroadcaster {
  senders: Arc<Mutex<Senders>>,
  next_id: Arc<AtomicU64>,
}

impl IdentityBroadcaster {
  pub fn new() -> Self { Self::default() }

  /// Register a subscriber whose first notification is `current`.
  pub fn subscribe(&self, current: IdentityChange) -> IdentitySubscription {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let _ = tx.send(current);
    self.senders.lock().insert(id, tx);

    let senders = Arc::downgrade(&self.senders);
    IdentitySubscription::new(rx, move || {
      if let Some(senders) = senders.upgrade() {
        senders.lock().remove(&id);
      }
    })
  }

  /// Send `change` to all subscribers, pruning any whose receiver is gone.
  pub fn emit(&self, change: IdentityChange) {
    self
      .senders
      .lock()
      .retain(|_, tx| tx.send(change.clone()).is_ok());
  }

  pub fn subscriber_count(&self) -> usize { self.senders.lock().len() }
}
