//! Time buckets and the per-bucket metrics of a dashboard timeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventPayload;

// ─── Granularity ─────────────────────────────────────────────────────────────

/// The bucketing resolution of a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
  #[default]
  Day,
  Month,
}

impl Granularity {
  /// Lenient parse: `"month"` selects monthly buckets, anything else
  /// (including absent input) means daily.
  pub fn parse_lenient(raw: Option<&str>) -> Self {
    match raw.map(str::trim) {
      Some("month") => Self::Month,
      _ => Self::Day,
    }
  }

  pub fn default_limit(self) -> usize {
    match self {
      Self::Day => 30,
      Self::Month => 12,
    }
  }

  pub fn max_limit(self) -> usize {
    match self {
      Self::Day => 120,
      Self::Month => 36,
    }
  }

  /// Lenient bucket-count parse. Non-numeric, non-finite or non-positive
  /// input falls back to the default; everything else is truncated and
  /// clamped into `1..=max_limit`.
  pub fn resolve_limit(self, raw: Option<&str>) -> usize {
    let parsed = raw
      .and_then(|s| s.trim().parse::<f64>().ok())
      .filter(|n| n.is_finite() && *n > 0.0);
    match parsed {
      Some(n) => (n.trunc() as usize).clamp(1, self.max_limit()),
      None => self.default_limit(),
    }
  }
}

/// Normalised parameters of a dashboard request. Only constructible
/// through [`DashboardQuery::new`] and [`DashboardQuery::from_params`], so
/// `limit` is always within `1..=max_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardQuery {
  granularity: Granularity,
  limit:       usize,
}

impl DashboardQuery {
  pub fn new(granularity: Granularity, limit: usize) -> Self {
    Self {
      granularity,
      limit: limit.clamp(1, granularity.max_limit()),
    }
  }

  /// Build from raw query-string values. Malformed input never fails.
  pub fn from_params(granularity: Option<&str>, limit: Option<&str>) -> Self {
    let granularity = Granularity::parse_lenient(granularity);
    Self { granularity, limit: granularity.resolve_limit(limit) }
  }

  pub fn granularity(&self) -> Granularity { self.granularity }

  /// Number of buckets.
  pub fn limit(&self) -> usize { self.limit }
}

impl Default for DashboardQuery {
  fn default() -> Self { Self::from_params(None, None) }
}

// ─── Buckets ─────────────────────────────────────────────────────────────────

/// One fixed-width slot of a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
  /// `YYYY-MM-DD` for days, `YYYY-MM` for months, in local wall-clock terms.
  pub key:   String,
  /// Short human-readable label, e.g. `Oct 17` or `Oct 2026`.
  pub label: String,
  /// Inclusive lower bound for events falling into this bucket.
  pub start: DateTime<Utc>,
}

/// Engagement counters of one bucket (or one subject). All start at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketMetric {
  pub views:        u64,
  /// Favorite events.
  pub likes:        u64,
  /// Sum of rating values.
  pub rating_stars: u64,
  pub comments:     u64,
}

impl BucketMetric {
  /// Fold one event into the counters: views and favorites count, ratings
  /// sum their stars.
  pub fn record(&mut self, payload: &EventPayload) {
    match payload {
      EventPayload::View => self.views += 1,
      EventPayload::Favorite => self.likes += 1,
      EventPayload::Rating(_) => self.rating_stars += payload.value(),
    }
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// A bucket as returned to callers: its key and label plus the metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
  pub key:     String,
  pub label:   String,
  #[serde(flatten)]
  pub metrics: BucketMetric,
}
