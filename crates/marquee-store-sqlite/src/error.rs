//! Error type for `marquee-store-sqlite`.

use marquee_core::store::{StoreError, StoreErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] marquee_core::Error),

  /// The queried table has not been created yet.
  #[error("collection does not exist: {0}")]
  MissingCollection(String),

  #[error("already exists: {0}")]
  AlreadyExists(String),

  #[error("database error: {0}")]
  Database(#[source] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

const NO_SUCH_TABLE: &str = "no such table: ";

/// The SQLite message carried by a failed statement, if any.
fn sqlite_message(e: &tokio_rusqlite::Error) -> Option<&str> {
  match e {
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(_, Some(m))) => {
      Some(m.as_str())
    }
    _ => None,
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match sqlite_message(&e).map(str::to_owned) {
      Some(m) if m.starts_with(NO_SUCH_TABLE) => {
        Error::MissingCollection(m[NO_SUCH_TABLE.len()..].to_owned())
      }
      Some(m) if m.ends_with("already exists") => Error::AlreadyExists(m),
      _ => Error::Database(e),
    }
  }
}

impl StoreError for Error {
  fn kind(&self) -> StoreErrorKind {
    match self {
      Error::MissingCollection(_) => StoreErrorKind::MissingCollection,
      Error::AlreadyExists(_) => StoreErrorKind::AlreadyExists,
      _ => StoreErrorKind::Other,
    }
  }
}
