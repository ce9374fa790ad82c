//! SQLite backends for the Campus Connect session layer.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`SqliteDocumentStore`] holds user
//! records; [`SqliteIdentityProvider`] holds accounts and the current sign-in.

mod accounts;
mod documents;
mod password;
mod schema;

pub mod error;

use std::path::Path;

pub use accounts::SqliteIdentityProvider;
pub use documents::SqliteDocumentStore;
pub use error::{Error, Result};
pub use password::{hash_password, verify_password};

/// Open both backends over a single connection to the database at `path`.
pub async fn open_pair(
  path: impl AsRef<Path>,
) -> Result<(SqliteIdentityProvider, SqliteDocumentStore)> {
  let conn = tokio_rusqlite::Connection::open(path).await?;
  pair(conn).await
}

/// In-memory variant of [`open_pair`].
pub async fn open_pair_in_memory() -> Result<(SqliteIdentityProvider, SqliteDocumentStore)> {
  let conn = tokio_rusqlite::Connection::open_in_memory().await?;
  pair(conn).await
}

async fn pair(
  conn: tokio_rusqlite::Connection,
) -> Result<(SqliteIdentityProvider, SqliteDocumentStore)> {
  let documents = SqliteDocumentStore::from_connection(conn.clone()).await?;
  let provider = SqliteIdentityProvider::new(conn).await?;
  Ok((provider, documents))
}
