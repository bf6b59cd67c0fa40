//! Error types for `marquee-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid subject id: {0:?}")]
  InvalidSubjectId(String),

  #[error("identity id must not be empty")]
  EmptyIdentityId,

  #[error("unknown event type: {0:?}")]
  UnknownEventKind(String),

  #[error("a numeric rating value is required")]
  MissingRating,

  #[error("rating must be between 1 and 5, got {0}")]
  RatingOutOfRange(f64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
