//! Error type for `marquee-engine`.

use marquee_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("authentication required")]
  Unauthorized,

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// Machine-readable error class.
  pub fn code(&self) -> &'static str {
    match self {
      Error::InvalidInput(_) => "invalid_input",
      Error::NotFound(_) => "not_found",
      Error::Unauthorized => "unauthorized",
      Error::Internal(_) => "internal_error",
    }
  }

  pub fn internal(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Internal(Box::new(e))
  }
}

impl From<marquee_core::Error> for Error {
  fn from(e: marquee_core::Error) -> Self {
    match e {
      marquee_core::Error::Serialization(_) => Error::internal(e),
      other => Error::InvalidInput(other.to_string()),
    }
  }
}

/// Conversions from backend results into engine results.
pub(crate) trait StoreResultExt<T> {
  /// Any storage failure is internal.
  fn internal(self) -> Result<T>;

  /// A collection that was never created reads as empty; any other failure
  /// is internal.
  fn or_empty(self) -> Result<T>
  where
    T: Default;
}

impl<T, E: StoreError> StoreResultExt<T> for Result<T, E> {
  fn internal(self) -> Result<T> { self.map_err(Error::internal) }

  fn or_empty(self) -> Result<T>
  where
    T: Default,
  {
    match self {
      Ok(v) => Ok(v),
      Err(e) if e.is_missing_collection() => Ok(T::default()),
      Err(e) => Err(Error::internal(e)),
    }
  }
}
