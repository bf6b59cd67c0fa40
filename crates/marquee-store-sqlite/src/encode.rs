//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that string
//! comparison orders them chronologically. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use marquee_core::{
  event::{EngagementEvent, EventPayload, RatingValue},
  identity::IdentityId,
  rating::Rating,
  subject::SubjectId,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Session credentials ──────────────────────────────────────────────────────

/// SHA-256 hex digest of a session token; the only form that is stored.
pub fn hash_credential(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `engagement_events` row.
pub struct RawEvent {
  pub event_id:    String,
  pub subject_id:  String,
  pub identity_id: Option<String>,
  pub event_type:  String,
  pub value:       i64,
  pub mode:        String,
  pub created_at:  String,
}

impl RawEvent {
  pub const COLUMNS: &'static str =
    "event_id, subject_id, identity_id, event_type, value, mode, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      subject_id:  row.get(1)?,
      identity_id: row.get(2)?,
      event_type:  row.get(3)?,
      value:       row.get(4)?,
      mode:        row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_event(self) -> Result<EngagementEvent> {
    Ok(EngagementEvent {
      event_id:    decode_uuid(&self.event_id)?,
      subject_id:  SubjectId::parse(&self.subject_id)?,
      identity_id: self.identity_id.map(IdentityId::new).transpose()?,
      payload:     EventPayload::from_parts(&self.event_type, self.value)?,
      mode:        self.mode,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `ratings` row.
pub struct RawRating {
  pub rating_id:   String,
  pub subject_id:  String,
  pub identity_id: String,
  pub rating:      u8,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawRating {
  pub const COLUMNS: &'static str =
    "rating_id, subject_id, identity_id, rating, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      rating_id:   row.get(0)?,
      subject_id:  row.get(1)?,
      identity_id: row.get(2)?,
      rating:      row.get(3)?,
      created_at:  row.get(4)?,
      updated_at:  row.get(5)?,
    })
  }

  pub fn into_rating(self) -> Result<Rating> {
    Ok(Rating {
      rating_id:   decode_uuid(&self.rating_id)?,
      subject_id:  SubjectId::parse(&self.subject_id)?,
      identity_id: IdentityId::new(self.identity_id)?,
      rating:      RatingValue::try_from(self.rating)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}
