//! Comment-count merger.
//!
//! Comments are not engagement events; they live in the comment store. This
//! module folds their creation times into the same bucket and subject keys
//! the engine uses for events.

use std::collections::HashMap;

use chrono::TimeZone;
use marquee_core::{dashboard::CommentStamp, subject::SubjectId};

use crate::buckets::Timeline;

/// Increment each bucket's `comments` counter by the comments created in it.
/// Comments outside every bucket are dropped.
pub fn merge_into_timeline<Tz: TimeZone>(
  timeline: &mut Timeline,
  comments: &[CommentStamp],
  tz: &Tz,
) {
  for c in comments {
    if let Some(slot) = timeline.slot_mut(&c.created_at, tz) {
      slot.comments += 1;
    }
  }
}

/// Number of comments per subject.
pub fn counts_by_subject(comments: &[CommentStamp]) -> HashMap<SubjectId, u64> {
  let mut counts = HashMap::new();
  for c in comments {
    *counts.entry(c.subject_id.clone()).or_insert(0) += 1;
  }
  counts
}
