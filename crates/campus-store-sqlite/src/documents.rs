//! [`SqliteDocumentStore`]: the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use campus_core::documents::DocumentStore;
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde_json::Value;

use crate::{Result, schema::SCHEMA};

/// Collection/key JSON documents backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteDocumentStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteDocumentStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::from_connection(conn).await
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn).await
  }

  /// Wrap an existing connection, e.g. one shared with
  /// [`SqliteIdentityProvider`](crate::SqliteIdentityProvider).
  pub async fn from_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    init_schema(&conn).await?;
    Ok(Self { conn })
  }

  pub fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

pub(crate) async fn init_schema(conn: &tokio_rusqlite::Connection) -> Result<()> {
  conn
    .call(|conn| {
      conn.execute_batch(SCHEMA)?;
      Ok(())
    })
    .await?;
  Ok(())
}

impl DocumentStore for SqliteDocumentStore {
  type Error = crate::Error;

  async fn write_record(&self, collection: &str, key: &str, value: Value) -> Result<()> {
    let collection = collection.to_owned();
    let key        = key.to_owned();
    let value_json = serde_json::to_string(&value)?;
    let at_str     = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, key, value_json, updated_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (collection, key)
           DO UPDATE SET value_json = excluded.value_json,
                         updated_at = excluded.updated_at",
          rusqlite::params![collection, key, value_json, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn read_record(&self, collection: &str, key: &str) -> Result<Option<Value>> {
    let collection = collection.to_owned();
    let key        = key.to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT value_json FROM documents WHERE collection = ?1 AND key = ?2",
            rusqlite::params![collection, key],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(|s| serde_json::from_str(&s)).transpose()?)
  }
}
