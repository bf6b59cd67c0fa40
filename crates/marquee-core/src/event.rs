//! Engagement events: the append-only fact table of the analytics engine.
//!
//! An event records one occurrence of viewing, favoriting or rating a
//! subject. Events are never updated or deleted; every aggregate is derived
//! from them at read time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result, identity::IdentityId, subject::SubjectId};

/// Viewing context recorded when the caller does not supply one.
pub const DEFAULT_MODE: &str = "movie";

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The closed set of engagement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
  View,
  Favorite,
  Rating,
}

impl EventKind {
  pub const ALL: [EventKind; 3] = [Self::View, Self::Favorite, Self::Rating];

  /// Parse the wire discriminant. Anything outside the closed set is
  /// rejected rather than stored.
  pub fn parse(raw: &str) -> Result<Self> {
    match raw {
      "view" => Ok(Self::View),
      "favorite" => Ok(Self::Favorite),
      "rating" => Ok(Self::Rating),
      other => Err(Error::UnknownEventKind(other.to_owned())),
    }
  }

  /// The discriminant string stored in the `event_type` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::View => "view",
      Self::Favorite => "favorite",
      Self::Rating => "rating",
    }
  }
}

impl fmt::Display for EventKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── Rating value ────────────────────────────────────────────────────────────

/// A star rating, always in `1..=5`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct RatingValue(u8);

impl RatingValue {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 5;

  /// Event-ingestion rule: round to the nearest integer and clamp into
  /// range. Absent or non-numeric input is an error.
  pub fn clamped(raw: Option<&Value>) -> Result<Self> {
    let n = numeric(raw).ok_or(Error::MissingRating)?;
    let rounded = n.round().clamp(f64::from(Self::MIN), f64::from(Self::MAX));
    Ok(Self(rounded as u8))
  }

  /// Rating-submission rule: round to the nearest integer, then reject
  /// anything outside `1..=5`.
  pub fn strict(raw: Option<&Value>) -> Result<Self> {
    let n = numeric(raw).ok_or(Error::MissingRating)?;
    let rounded = n.round();
    if rounded < f64::from(Self::MIN) || rounded > f64::from(Self::MAX) {
      return Err(Error::RatingOutOfRange(n));
    }
    Ok(Self(rounded as u8))
  }

  pub fn get(self) -> u8 { self.0 }
}

impl TryFrom<u8> for RatingValue {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self> {
    if (Self::MIN..=Self::MAX).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::RatingOutOfRange(f64::from(value)))
    }
  }
}

impl From<RatingValue> for u8 {
  fn from(v: RatingValue) -> Self { v.0 }
}

/// Numbers and numeric strings count as numeric input.
fn numeric(raw: Option<&Value>) -> Option<f64> {
  let n = match raw? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  n.filter(|v| v.is_finite())
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// Kind-specific value semantics: views and favorites always count once,
/// ratings carry their star value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventType", content = "value", rename_all = "lowercase")]
pub enum EventPayload {
  View,
  Favorite,
  Rating(RatingValue),
}

impl EventPayload {
  /// Build a payload from the raw ingestion fields. The raw value is ignored
  /// for views and favorites.
  pub fn from_raw(kind: EventKind, raw_value: Option<&Value>) -> Result<Self> {
    Ok(match kind {
      EventKind::View => Self::View,
      EventKind::Favorite => Self::Favorite,
      EventKind::Rating => Self::Rating(RatingValue::clamped(raw_value)?),
    })
  }

  /// Rebuild a payload from its stored `(event_type, value)` pair.
  pub fn from_parts(discriminant: &str, value: i64) -> Result<Self> {
    match EventKind::parse(discriminant)? {
      EventKind::View => Ok(Self::View),
      EventKind::Favorite => Ok(Self::Favorite),
      EventKind::Rating => {
        let v = u8::try_from(value)
          .map_err(|_| Error::RatingOutOfRange(value as f64))?;
        Ok(Self::Rating(RatingValue::try_from(v)?))
      }
    }
  }

  pub fn kind(&self) -> EventKind {
    match self {
      Self::View => EventKind::View,
      Self::Favorite => EventKind::Favorite,
      Self::Rating(_) => EventKind::Rating,
    }
  }

  /// The numeric `value` column: 1 for views and favorites, the star count
  /// for ratings.
  pub fn value(&self) -> u64 {
    match self {
      Self::View | Self::Favorite => 1,
      Self::Rating(v) => u64::from(v.get()),
    }
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// An immutable engagement fact. Once written, no field is ever updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementEvent {
  pub event_id:    Uuid,
  pub subject_id:  SubjectId,
  /// `None` for anonymous callers.
  pub identity_id: Option<IdentityId>,
  #[serde(flatten)]
  pub payload:     EventPayload,
  pub mode:        String,
  /// Assigned at ingestion time; never client-supplied.
  pub created_at:  DateTime<Utc>,
}

impl EngagementEvent {
  /// Stamp a new event with a fresh id. `mode` falls back to
  /// [`DEFAULT_MODE`] when absent or blank.
  pub fn new(
    subject_id: SubjectId,
    identity_id: Option<IdentityId>,
    payload: EventPayload,
    mode: Option<String>,
    created_at: DateTime<Utc>,
  ) -> Self {
    let mode = mode
      .map(|m| m.trim().to_owned())
      .filter(|m| !m.is_empty())
      .unwrap_or_else(|| DEFAULT_MODE.to_owned());
    Self {
      event_id: Uuid::new_v4(),
      subject_id,
      identity_id,
      payload,
      mode,
      created_at,
    }
  }

  pub fn kind(&self) -> EventKind { self.payload.kind() }
}
