//! Identity: the acting user, as handed to us by the session layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Opaque identifier of a user. Anonymous callers have no `IdentityId` at
/// all; the type itself is never empty.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityId(String);

impl IdentityId {
  pub fn new(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    if raw.trim().is_empty() {
      return Err(Error::EmptyIdentityId);
    }
    Ok(Self(raw))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for IdentityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for IdentityId {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<IdentityId> for String {
  fn from(id: IdentityId) -> Self { id.0 }
}
