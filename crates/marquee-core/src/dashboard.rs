//! The dashboard read model. Never stored, always derived.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  subject::SubjectId,
  timeline::{BucketMetric, Granularity, TimelineEntry},
};

// ─── Scoring ─────────────────────────────────────────────────────────────────

pub const VIEW_WEIGHT: u64 = 1;
pub const LIKE_WEIGHT: u64 = 4;
pub const RATING_STAR_WEIGHT: u64 = 3;
pub const COMMENT_WEIGHT: u64 = 5;

/// Weighted engagement score used to rank hot subjects.
pub fn score(m: &BucketMetric) -> u64 {
  m.views * VIEW_WEIGHT
    + m.likes * LIKE_WEIGHT
    + m.rating_stars * RATING_STAR_WEIGHT
    + m.comments * COMMENT_WEIGHT
}

// ─── Totals ──────────────────────────────────────────────────────────────────

/// All-time sums of event values, grouped by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindTotals {
  pub views:        u64,
  pub likes:        u64,
  pub rating_stars: u64,
}

/// The global counters at the top of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
  pub total_subjects:     u64,
  pub total_identities:   u64,
  pub total_comments:     u64,
  pub total_views:        u64,
  pub total_likes:        u64,
  pub total_rating_stars: u64,
}

// ─── Hot subjects ────────────────────────────────────────────────────────────

/// A subject ranked by its windowed engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotSubject {
  pub subject_id: SubjectId,
  /// `None` when the catalog has no title for the subject.
  pub title:      Option<String>,
  #[serde(flatten)]
  pub metrics:    BucketMetric,
  pub score:      u64,
}

impl HotSubject {
  pub fn new(subject_id: SubjectId, title: Option<String>, metrics: BucketMetric) -> Self {
    Self { subject_id, title, score: score(&metrics), metrics }
  }
}

// ─── Comment rows ────────────────────────────────────────────────────────────

/// One row of the comment scan: which subject, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentStamp {
  pub subject_id: SubjectId,
  pub created_at: DateTime<Utc>,
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// The complete dashboard payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
  pub summary:      Totals,
  /// Exactly `limit` entries, oldest first.
  pub timeline:     Vec<TimelineEntry>,
  pub hot_subjects: Vec<HotSubject>,
  pub granularity:  Granularity,
}
