//! The `DocumentStore` trait: keyed JSON documents grouped in collections.

use std::future::Future;

use serde_json::Value;

/// Abstraction over a remote document database.
///
/// Writes replace any existing document under the same key.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn write_record<'a>(
    &'a self,
    collection: &'a str,
    key: &'a str,
    value: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Returns `None` if no document exists under `key`.
  fn read_record<'a>(
    &'a self,
    collection: &'a str,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + 'a;
}
