//! Storage traits for the engagement store and its collaborators.
//!
//! Traits are implemented by storage backends (e.g. `marquee-store-sqlite`).
//! The engine depends on these abstractions, not on any concrete backend.
//! Every trait extends [`Backend`], so one backend type carries one error
//! type across all of them.

use std::{collections::HashMap, future::Future};

use chrono::{DateTime, Utc};

use crate::{
  dashboard::{CommentStamp, KindTotals},
  event::EngagementEvent,
  identity::IdentityId,
  rating::{NewRating, Rating, RatingIndex, RatingStats},
  subject::SubjectId,
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// The storage conditions the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
  /// The queried collection has never been written to. Collections are
  /// created lazily, so this means "no data yet".
  MissingCollection,
  /// The object being created (e.g. an index) already exists.
  AlreadyExists,
  Other,
}

/// A backend error that can say which [`StoreErrorKind`] it is.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StoreErrorKind;

  fn is_missing_collection(&self) -> bool {
    self.kind() == StoreErrorKind::MissingCollection
  }

  fn is_already_exists(&self) -> bool { self.kind() == StoreErrorKind::AlreadyExists }
}

/// Base trait of every storage abstraction.
///
/// All methods of the extending traits return `Send` futures so they can be
/// used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Backend: Send + Sync {
  type Error: StoreError;
}

// ─── Event store ─────────────────────────────────────────────────────────────

/// Append-only collection of [`EngagementEvent`]s. There is no update or
/// delete path.
pub trait EventStore: Backend {
  /// Append one event. The collection is created on first append.
  fn append_event(
    &self,
    event: EngagementEvent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Sum of event values per kind across all time.
  fn kind_totals(&self) -> impl Future<Output = Result<KindTotals, Self::Error>> + Send + '_;

  /// Every event with `created_at >= since`, in no particular order.
  fn events_since(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<EngagementEvent>, Self::Error>> + Send + '_;

  /// Number of stored events.
  fn count_events(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

// ─── Rating store ────────────────────────────────────────────────────────────

/// Current-state ratings, at most one per `(subject, identity)` pair.
pub trait RatingStore: Backend {
  /// Create one supporting index. Fails with
  /// [`StoreErrorKind::AlreadyExists`] if it is already there.
  fn create_index(
    &self,
    index: RatingIndex,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert or overwrite the rating for `(subject_id, identity_id)`.
  /// `created_at` is only set on insert; `updated_at` on every call.
  fn upsert_rating(
    &self,
    input: NewRating,
  ) -> impl Future<Output = Result<Rating, Self::Error>> + Send + '_;

  /// The current rating of one identity for one subject.
  fn get_rating<'a>(
    &'a self,
    subject_id: &'a SubjectId,
    identity_id: &'a IdentityId,
  ) -> impl Future<Output = Result<Option<Rating>, Self::Error>> + Send + 'a;

  /// Count and sum of the current ratings of a subject.
  fn rating_stats<'a>(
    &'a self,
    subject_id: &'a SubjectId,
  ) -> impl Future<Output = Result<RatingStats, Self::Error>> + Send + 'a;

  /// Sum of every current rating value, across all subjects.
  fn total_rating_stars(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

// ─── Collaborators ───────────────────────────────────────────────────────────

/// Read-only access to the subject catalog.
pub trait SubjectCatalog: Backend {
  fn subject_exists<'a>(
    &'a self,
    subject_id: &'a SubjectId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn count_subjects(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Batched title lookup. Unknown ids are absent from the map.
  fn titles<'a>(
    &'a self,
    ids: &'a [SubjectId],
  ) -> impl Future<Output = Result<HashMap<SubjectId, String>, Self::Error>> + Send + 'a;
}

/// Read-only access to identities and the session layer.
pub trait IdentityDirectory: Backend {
  fn count_identities(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Number of `(identity, subject)` memberships across all identities'
  /// favorite lists.
  fn count_favorite_memberships(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Resolve a session credential to an identity. Unknown credentials
  /// resolve to `None`.
  fn resolve_credential<'a>(
    &'a self,
    credential: &'a str,
  ) -> impl Future<Output = Result<Option<IdentityId>, Self::Error>> + Send + 'a;
}

/// Read-only access to the comment store.
pub trait CommentSource: Backend {
  /// Number of comments that have not been deleted.
  fn count_comments(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Every non-rejected comment with `created_at >= since`.
  fn comments_since(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<CommentStamp>, Self::Error>> + Send + '_;
}

/// Everything the engagement engine needs from one backend.
pub trait EngagementBackend:
  EventStore + RatingStore + SubjectCatalog + IdentityDirectory + CommentSource
{
}

impl<T> EngagementBackend for T where
  T: EventStore + RatingStore + SubjectCatalog + IdentityDirectory + CommentSource
{
}
