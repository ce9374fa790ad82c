//! Liveness token shared between a long-lived component and its pending
//! continuations.

use tokio_util::sync::CancellationToken;

/// Cleared once, at teardown. Asynchronous work checks it immediately before
/// committing an effect and drops the effect if the owner is gone.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct LivenessToken {
  cancel: CancellationToken,
}

impl LivenessToken {
  pub fn new() -> Self { Self::default() }

  pub fn is_alive(&self) -> bool { !self.cancel.is_cancelled() }

  /// Mark the owner as torn down. Returns `true` only for the call that
  /// actually flipped the flag.
  pub fn revoke(&self) -> bool {
    let was_alive = self.is_alive();
    self.cancel.cancel();
    was_alive
  }

  /// Resolves once the token has been revoked.
  pub async fn revoked(&self) { self.cancel.cancelled().await }

  /// Run `effect` only while the owner is alive.
  pub fn run_if_alive<T>(&self, effect: impl FnOnce() -> T) -> Option<T> {
    self.is_alive().then(effect)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn revoke_is_idempotent() {
    let token = LivenessToken::new();
    let clone = token.clone();
    assert!(clone.is_alive());

    assert!(token.revoke());
    assert!(!token.revoke());
    assert!(!clone.is_alive());
  }

  #[test]
  fn effects_are_dropped_after_revoke() {
    let token = LivenessToken::new();
    assert_eq!(token.run_if_alive(|| 1), Some(1));
    token.revoke();
    assert_eq!(token.run_if_alive(|| 2), None);
  }

  #[tokio::test]
  async fn revoked_wakes_waiters() {
    let token = LivenessToken::new();
    let waiter = tokio::spawn({
      let token = token.clone();
      async move { token.revoked().await }
    });
    token.revoke();
    waiter.await.unwrap();
  }
}
