//! Time-bucket construction and event-to-bucket keying.
//!
//! Buckets are anchored in the wall-clock time of the zone `now` is
//! expressed in (the host's local zone in production). Day buckets start at
//! local midnight, month buckets at local midnight on the first.

use std::collections::HashMap;

use chrono::{
  DateTime, Datelike as _, Days, Duration, Months, NaiveDate, NaiveTime, TimeZone,
  Utc,
};
use marquee_core::timeline::{BucketMetric, Granularity, TimeBucket, TimelineEntry};

/// Canonical bucket key of a local calendar date.
pub fn date_key(granularity: Granularity, date: NaiveDate) -> String {
  match granularity {
    Granularity::Day => date.format("%Y-%m-%d").to_string(),
    Granularity::Month => date.format("%Y-%m").to_string(),
  }
}

/// Canonical bucket key of an instant, seen from `tz`.
pub fn bucket_key<Tz: TimeZone>(
  granularity: Granularity,
  at: &DateTime<Utc>,
  tz: &Tz,
) -> String {
  date_key(granularity, at.with_timezone(tz).date_naive())
}

fn label(granularity: Granularity, date: NaiveDate) -> String {
  match granularity {
    Granularity::Day => date.format("%b %-d").to_string(),
    Granularity::Month => date.format("%b %Y").to_string(),
  }
}

/// The first instant of `date` in `tz`. When local midnight falls in a DST
/// gap, the first whole hour that exists is used instead.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
  let midnight = date.and_time(NaiveTime::MIN);
  (0..=3)
    .find_map(|h| tz.from_local_datetime(&(midnight + Duration::hours(h))).earliest())
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// `limit` consecutive buckets ending with the one containing `now`, oldest
/// first.
pub fn build_buckets<Tz: TimeZone>(
  granularity: Granularity,
  limit: usize,
  now: &DateTime<Tz>,
) -> Vec<TimeBucket> {
  let tz = now.timezone();
  let today = now.date_naive();
  let newest = match granularity {
    Granularity::Day => today,
    Granularity::Month => today - Days::new(u64::from(today.day0())),
  };

  (0..limit as u32)
    .rev()
    .map(|back| {
      let date = match granularity {
        Granularity::Day => newest - Days::new(u64::from(back)),
        Granularity::Month => newest - Months::new(back),
      };
      TimeBucket {
        key:   date_key(granularity, date),
        label: label(granularity, date),
        start: start_of_day(&tz, date),
      }
    })
    .collect()
}

// ─── Timeline ────────────────────────────────────────────────────────────────

/// A fixed set of buckets being filled with metrics.
pub struct Timeline {
  granularity: Granularity,
  buckets:     Vec<TimeBucket>,
  metrics:     Vec<BucketMetric>,
  by_key:      HashMap<String, usize>,
}

impl Timeline {
  pub fn new<Tz: TimeZone>(granularity: Granularity, limit: usize, now: &DateTime<Tz>) -> Self {
    let buckets = build_buckets(granularity, limit, now);
    let by_key = buckets
      .iter()
      .enumerate()
      .map(|(i, b)| (b.key.clone(), i))
      .collect();
    Self {
      granularity,
      metrics: vec![BucketMetric::default(); buckets.len()],
      buckets,
      by_key,
    }
  }

  /// Lower bound of the oldest bucket; the start of the window.
  pub fn start(&self) -> DateTime<Utc> {
    self
      .buckets
      .first()
      .map(|b| b.start)
      .unwrap_or(DateTime::<Utc>::MAX_UTC)
  }

  /// The metrics of the bucket `at` falls into, or `None` if no bucket
  /// matches (out of range or clock skew).
  pub fn slot_mut<Tz: TimeZone>(
    &mut self,
    at: &DateTime<Utc>,
    tz: &Tz,
  ) -> Option<&mut BucketMetric> {
    let key = bucket_key(self.granularity, at, tz);
    let i = *self.by_key.get(&key)?;
    self.metrics.get_mut(i)
  }

  pub fn into_entries(self) -> Vec<TimelineEntry> {
    self
      .buckets
      .into_iter()
      .zip(self.metrics)
      .map(|(b, metrics)| TimelineEntry { key: b.key, label: b.label, metrics })
      .collect()
  }
}
