//! Subject: the thing being engaged with (a movie, a trailer page, …).
//!
//! Subjects are owned by an external catalog. This crate only carries their
//! identifier, which follows the 24-hex-character document id shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of hex characters in a subject identifier.
pub const SUBJECT_ID_LEN: usize = 24;

/// Opaque identifier of a subject. Always 24 lowercase hex characters.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
  /// Validate and normalise a raw identifier.
  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.len() == SUBJECT_ID_LEN
      && trimmed.bytes().all(|b| b.is_ascii_hexdigit())
    {
      Ok(Self(trimmed.to_ascii_lowercase()))
    } else {
      Err(Error::InvalidSubjectId(raw.to_owned()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SubjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for SubjectId {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(&value) }
}

impl From<SubjectId> for String {
  fn from(id: SubjectId) -> Self { id.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_24_hex_chars() {
    let id = SubjectId::parse("65F0C2A1B3D4E5F60718293A").unwrap();
    assert_eq!(id.as_str(), "65f0c2a1b3d4e5f60718293a");
  }

  #[test]
  fn rejects_wrong_length_and_non_hex() {
    assert!(SubjectId::parse("abc").is_err());
    assert!(SubjectId::parse("65f0c2a1b3d4e5f60718293a0").is_err());
    assert!(SubjectId::parse("zzf0c2a1b3d4e5f60718293a").is_err());
    assert!(SubjectId::parse("").is_err());
  }
}
