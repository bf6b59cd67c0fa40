//! Ratings: the current-state view of what each identity thinks of a
//! subject.
//!
//! Unlike engagement events, a rating is upserted: there is at most one row
//! per `(subject, identity)` pair. The rating history lives in the event
//! stream as `rating` events and is only used for trends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{event::RatingValue, identity::IdentityId, subject::SubjectId};

/// The stored rating of one identity for one subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
  pub rating_id:   Uuid,
  pub subject_id:  SubjectId,
  pub identity_id: IdentityId,
  pub rating:      RatingValue,
  /// Set on first insert only.
  pub created_at:  DateTime<Utc>,
  /// Refreshed on every upsert.
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::RatingStore::upsert_rating`].
#[derive(Debug, Clone)]
pub struct NewRating {
  pub subject_id:  SubjectId,
  pub identity_id: IdentityId,
  pub rating:      RatingValue,
  pub at:          DateTime<Utc>,
}

/// Count and sum of the current ratings for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingStats {
  pub count: u64,
  pub sum:   u64,
}

impl RatingStats {
  /// Mean rating rounded to two decimal places; `0.0` when nobody rated.
  pub fn average(&self) -> f64 {
    if self.count == 0 {
      return 0.0;
    }
    let mean = self.sum as f64 / self.count as f64;
    (mean * 100.0).round() / 100.0
  }
}

/// What a caller sees for a subject's rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
  pub subject_id:     SubjectId,
  pub average_rating: f64,
  pub rating_count:   u64,
  /// The caller's own rating; `None` for anonymous callers or when they
  /// have not rated yet.
  pub user_rating:    Option<RatingValue>,
}

/// Supporting indexes of the rating collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingIndex {
  /// Uniqueness on `(subject_id, identity_id)`; the only guard against
  /// duplicate ratings from concurrent submissions.
  SubjectIdentityUnique,
  /// Lookup by `subject_id`.
  Subject,
}

impl RatingIndex {
  pub const ALL: [RatingIndex; 2] = [Self::SubjectIdentityUnique, Self::Subject];
}
