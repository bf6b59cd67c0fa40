//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, SubsecRound as _, TimeZone, Utc};
use marquee_core::{
  event::{EngagementEvent, EventPayload, RatingValue},
  identity::IdentityId,
  rating::{NewRating, RatingIndex, RatingStats},
  store::{
    CommentSource, EventStore, IdentityDirectory, RatingStore, StoreError,
    SubjectCatalog,
  },
  subject::SubjectId,
};

use crate::{CommentStatus, Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn subject(n: u8) -> SubjectId {
  SubjectId::parse(&format!("{n:024x}")).unwrap()
}

fn identity(name: &str) -> IdentityId { IdentityId::new(name).unwrap() }

fn stars(n: u8) -> RatingValue { RatingValue::try_from(n).unwrap() }

fn event(subject_id: SubjectId, payload: EventPayload) -> EngagementEvent {
  EngagementEvent::new(subject_id, None, payload, None, Utc::now())
}

async fn bootstrapped() -> SqliteStore {
  let s = store().await;
  for index in RatingIndex::ALL {
    s.create_index(index).await.unwrap();
  }
  s
}

// ─── Lazy collections ────────────────────────────────────────────────────────

#[tokio::test]
async fn reading_events_before_first_write_is_missing_collection() {
  let s = store().await;

  let err = s.kind_totals().await.unwrap_err();
  assert!(err.is_missing_collection(), "{err}");
  assert!(matches!(err, Error::MissingCollection(ref t) if t == "engagement_events"));

  let err = s.events_since(Utc::now()).await.unwrap_err();
  assert!(err.is_missing_collection());
}

#[tokio::test]
async fn reading_ratings_before_bootstrap_is_missing_collection() {
  let s = store().await;
  let err = s.rating_stats(&subject(1)).await.unwrap_err();
  assert!(err.is_missing_collection());
  let err = s.total_rating_stars().await.unwrap_err();
  assert!(err.is_missing_collection());
}

#[tokio::test]
async fn creating_an_index_twice_reports_already_exists() {
  let s = store().await;
  s.create_index(RatingIndex::SubjectIdentityUnique).await.unwrap();
  let err = s
    .create_index(RatingIndex::SubjectIdentityUnique)
    .await
    .unwrap_err();
  assert!(err.is_already_exists(), "{err}");

  // The other index is independent.
  s.create_index(RatingIndex::Subject).await.unwrap();
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_and_read_back_events() {
  let s = store().await;
  let a = subject(1);

  let mut e = event(a.clone(), EventPayload::Rating(stars(4)));
  e.identity_id = Some(identity("u1"));
  e.mode = "trailer".into();
  s.append_event(e.clone()).await.unwrap();

  let events = s.events_since(Utc::now() - Duration::hours(1)).await.unwrap();
  assert_eq!(events.len(), 1);
  let got = &events[0];
  assert_eq!(got.event_id, e.event_id);
  assert_eq!(got.subject_id, a);
  assert_eq!(got.identity_id, Some(identity("u1")));
  assert_eq!(got.payload, EventPayload::Rating(stars(4)));
  assert_eq!(got.mode, "trailer");
  assert_eq!(got.created_at, e.created_at.trunc_subsecs(6));
}

#[tokio::test]
async fn events_since_filters_by_creation_time() {
  let s = store().await;
  let old = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

  let mut stale = event(subject(1), EventPayload::View);
  stale.created_at = old;
  s.append_event(stale).await.unwrap();
  s.append_event(event(subject(1), EventPayload::View)).await.unwrap();

  let recent = s.events_since(old + Duration::seconds(1)).await.unwrap();
  assert_eq!(recent.len(), 1);
  let all = s.events_since(old).await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(s.count_events().await.unwrap(), 2);
}

#[tokio::test]
async fn kind_totals_count_views_and_favorites_and_sum_ratings() {
  let s = store().await;
  for payload in [
    EventPayload::View,
    EventPayload::View,
    EventPayload::Favorite,
    EventPayload::Rating(stars(5)),
    EventPayload::Rating(stars(2)),
  ] {
    s.append_event(event(subject(1), payload)).await.unwrap();
  }

  let totals = s.kind_totals().await.unwrap();
  assert_eq!(totals.views, 2);
  assert_eq!(totals.likes, 1);
  assert_eq!(totals.rating_stars, 7);
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_keeps_one_row_per_pair() {
  let s = bootstrapped().await;
  let a = subject(1);
  let u = identity("u1");
  let first_at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
  let second_at = first_at + Duration::days(3);

  let first = s
    .upsert_rating(NewRating {
      subject_id:  a.clone(),
      identity_id: u.clone(),
      rating:      stars(2),
      at:          first_at,
    })
    .await
    .unwrap();

  let second = s
    .upsert_rating(NewRating {
      subject_id:  a.clone(),
      identity_id: u.clone(),
      rating:      stars(5),
      at:          second_at,
    })
    .await
    .unwrap();

  assert_eq!(second.rating_id, first.rating_id);
  assert_eq!(second.rating, stars(5));
  assert_eq!(second.created_at, first_at);
  assert_eq!(second.updated_at, second_at);

  let stats = s.rating_stats(&a).await.unwrap();
  assert_eq!(stats, RatingStats { count: 1, sum: 5 });

  let stored = s.get_rating(&a, &u).await.unwrap().unwrap();
  assert_eq!(stored.rating, stars(5));
}

#[tokio::test]
async fn rating_stats_are_per_subject() {
  let s = bootstrapped().await;
  for (sub, who, n) in [(1, "u1", 4), (1, "u2", 3), (2, "u1", 1)] {
    s.upsert_rating(NewRating {
      subject_id:  subject(sub),
      identity_id: identity(who),
      rating:      stars(n),
      at:          Utc::now(),
    })
    .await
    .unwrap();
  }

  assert_eq!(s.rating_stats(&subject(1)).await.unwrap(), RatingStats { count: 2, sum: 7 });
  assert_eq!(s.rating_stats(&subject(3)).await.unwrap(), RatingStats::default());
  assert_eq!(s.total_rating_stars().await.unwrap(), 8);
  assert!(s.get_rating(&subject(2), &identity("u2")).await.unwrap().is_none());
}

// ─── Collaborators ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subject_catalog_lookups() {
  let s = store().await;
  s.add_subject(&subject(1), "Alien").await.unwrap();
  s.add_subject(&subject(2), "Heat").await.unwrap();

  assert!(s.subject_exists(&subject(1)).await.unwrap());
  assert!(!s.subject_exists(&subject(9)).await.unwrap());
  assert_eq!(s.count_subjects().await.unwrap(), 2);

  let titles = s.titles(&[subject(1), subject(9)]).await.unwrap();
  assert_eq!(titles.len(), 1);
  assert_eq!(titles[&subject(1)], "Alien");
  assert!(s.titles(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn favorite_memberships_count_list_entries() {
  let s = store().await;
  for (who, sub) in [("u1", 1), ("u2", 2), ("u3", 3)] {
    s.add_identity(&identity(who)).await.unwrap();
    s.add_favorite(&identity(who), &subject(sub)).await.unwrap();
  }
  // Duplicates are ignored.
  s.add_favorite(&identity("u1"), &subject(1)).await.unwrap();

  assert_eq!(s.count_identities().await.unwrap(), 3);
  assert_eq!(s.count_favorite_memberships().await.unwrap(), 3);
}

#[tokio::test]
async fn sessions_resolve_to_identities() {
  let s = store().await;
  let u = identity("u1");
  s.add_identity(&u).await.unwrap();
  let token = s.issue_session(&u).await.unwrap();

  assert_eq!(s.resolve_credential(&token).await.unwrap(), Some(u));
  assert_eq!(s.resolve_credential("not-a-token").await.unwrap(), None);
}

#[tokio::test]
async fn comment_counts_respect_moderation() {
  let s = store().await;
  let now = Utc::now();
  let a = subject(1);

  s.add_comment(&a, CommentStatus::Approved, false, now).await.unwrap();
  s.add_comment(&a, CommentStatus::Pending, false, now).await.unwrap();
  s.add_comment(&a, CommentStatus::Rejected, false, now).await.unwrap();
  s.add_comment(&a, CommentStatus::Approved, true, now).await.unwrap();
  s.add_comment(&a, CommentStatus::Approved, false, now - Duration::days(40))
    .await
    .unwrap();

  assert_eq!(s.count_comments().await.unwrap(), 4);

  let window = s.comments_since(now - Duration::days(1)).await.unwrap();
  assert_eq!(window.len(), 3);
  assert!(window.iter().all(|c| c.subject_id == a));
}
