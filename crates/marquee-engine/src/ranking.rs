//! Hot-subject ranking over the windowed event set.

use std::{cmp::Reverse, collections::HashMap};

use marquee_core::{
  dashboard::HotSubject, event::EngagementEvent, subject::SubjectId,
  timeline::BucketMetric,
};

/// Length of the hot list.
pub const HOT_SUBJECT_LIMIT: usize = 10;

/// Group events by subject and fold in per-subject comment counts.
///
/// Only subjects with at least one event or comment get an entry.
pub fn accumulate(
  events: &[EngagementEvent],
  comment_counts: &HashMap<SubjectId, u64>,
) -> HashMap<SubjectId, BucketMetric> {
  let mut per_subject: HashMap<SubjectId, BucketMetric> = HashMap::new();
  for e in events {
    per_subject
      .entry(e.subject_id.clone())
      .or_default()
      .record(&e.payload);
  }
  for (subject_id, n) in comment_counts {
    per_subject.entry(subject_id.clone()).or_default().comments += n;
  }
  per_subject
}

/// Score, sort descending and keep the top `limit`. Equal scores are
/// ordered by subject id so the list is stable between calls.
pub fn top(per_subject: HashMap<SubjectId, BucketMetric>, limit: usize) -> Vec<HotSubject> {
  let mut ranked: Vec<HotSubject> = per_subject
    .into_iter()
    .map(|(subject_id, metrics)| HotSubject::new(subject_id, None, metrics))
    .collect();
  ranked.sort_by(|a, b| {
    (Reverse(a.score), &a.subject_id).cmp(&(Reverse(b.score), &b.subject_id))
  });
  ranked.truncate(limit);
  ranked
}

/// Attach titles from a batched catalog lookup.
pub fn attach_titles(ranked: &mut [HotSubject], titles: &mut HashMap<SubjectId, String>) {
  for hot in ranked {
    hot.title = titles.remove(&hot.subject_id);
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use marquee_core::event::{EventPayload, RatingValue};

  use super::*;

  fn id(n: u8) -> SubjectId { SubjectId::parse(&format!("{n:024x}")).unwrap() }

  fn events(subject: u8, payload: EventPayload, n: usize) -> Vec<EngagementEvent> {
    (0..n)
      .map(|_| EngagementEvent::new(id(subject), None, payload, None, Utc::now()))
      .collect()
  }

  #[test]
  fn scores_and_orders_subjects() {
    let three = EventPayload::Rating(RatingValue::try_from(3).unwrap());
    let mut all = events(1, EventPayload::View, 10);
    all.extend(events(1, EventPayload::Favorite, 2));
    all.extend(events(1, three, 3));
    // Subject 2: 49 points from views alone.
    all.extend(events(2, EventPayload::View, 49));

    let comments = HashMap::from([(id(1), 1)]);
    let ranked = top(accumulate(&all, &comments), HOT_SUBJECT_LIMIT);

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].subject_id, id(1));
    assert_eq!(ranked[0].score, 50);
    assert_eq!(
      ranked[0].metrics,
      BucketMetric { views: 10, likes: 2, rating_stars: 9, comments: 1 }
    );
    assert_eq!(ranked[1].subject_id, id(2));
    assert_eq!(ranked[1].score, 49);
  }

  #[test]
  fn truncates_and_breaks_ties_by_id() {
    let mut all = Vec::new();
    for n in (1..=12).rev() {
      all.extend(events(n, EventPayload::View, 1));
    }
    let ranked = top(accumulate(&all, &HashMap::new()), HOT_SUBJECT_LIMIT);
    assert_eq!(ranked.len(), 10);
    assert_eq!(ranked[0].subject_id, id(1));
    assert_eq!(ranked[9].subject_id, id(10));
  }

  #[test]
  fn comment_only_subjects_are_ranked() {
    let comments = HashMap::from([(id(7), 2)]);
    let ranked = top(accumulate(&[], &comments), HOT_SUBJECT_LIMIT);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score, 10);

    let mut ranked = ranked;
    let mut titles = HashMap::from([(id(7), "Heat".to_owned())]);
    attach_titles(&mut ranked, &mut titles);
    assert_eq!(ranked[0].title.as_deref(), Some("Heat"));
  }
}
