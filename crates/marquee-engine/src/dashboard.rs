//! Read path: the dashboard summary.
//!
//! Every call re-scans the windowed event set; there is no rollup table and
//! no cache. The sections are read with separate queries and may reflect
//! slightly different snapshots under concurrent writes.

use chrono::{DateTime, Local, TimeZone};
use marquee_core::{
  dashboard::{DashboardSummary, Totals},
  store::{
    CommentSource, EngagementBackend, EventStore, IdentityDirectory, RatingStore,
    SubjectCatalog,
  },
  timeline::DashboardQuery,
};

use crate::{
  EngagementService, Result, buckets::Timeline, comments,
  error::StoreResultExt as _, ranking,
};

impl<S: EngagementBackend> EngagementService<S> {
  /// Totals, timeline and hot list, bucketed in the host's local time.
  pub async fn dashboard(&self, query: DashboardQuery) -> Result<DashboardSummary> {
    self.dashboard_at(query, Local::now()).await
  }

  /// As [`Self::dashboard`], with buckets ending at `now` and anchored in
  /// `now`'s time zone.
  pub async fn dashboard_at<Tz>(
    &self,
    query: DashboardQuery,
    now: DateTime<Tz>,
  ) -> Result<DashboardSummary>
  where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Send + Sync,
  {
    let tz = now.timezone();
    let mut timeline = Timeline::new(query.granularity(), query.limit(), &now);
    let since = timeline.start();

    let summary = self.totals().await?;

    // No list-based fallback here: only the all-time totals fall back to
    // the identity and rating stores.
    let events = self.store.events_since(since).await.or_empty()?;
    for e in &events {
      if let Some(slot) = timeline.slot_mut(&e.created_at, &tz) {
        slot.record(&e.payload);
      }
    }

    let window_comments = self.store.comments_since(since).await.or_empty()?;
    comments::merge_into_timeline(&mut timeline, &window_comments, &tz);

    let comment_counts = comments::counts_by_subject(&window_comments);
    let mut hot_subjects = ranking::top(
      ranking::accumulate(&events, &comment_counts),
      ranking::HOT_SUBJECT_LIMIT,
    );
    let ids: Vec<_> = hot_subjects.iter().map(|h| h.subject_id.clone()).collect();
    let mut titles = self.store.titles(&ids).await.internal()?;
    ranking::attach_titles(&mut hot_subjects, &mut titles);

    tracing::debug!(
      granularity = ?query.granularity(),
      limit = query.limit(),
      events = events.len(),
      comments = window_comments.len(),
      "computed dashboard"
    );

    Ok(DashboardSummary {
      summary,
      timeline: timeline.into_entries(),
      hot_subjects,
      granularity: query.granularity(),
    })
  }

  /// All-time totals. Favorites and rating stars fall back to the
  /// current-state stores when the event stream has none, so a total never
  /// reads lower than what those stores show.
  async fn totals(&self) -> Result<Totals> {
    let store = self.store.as_ref();

    let kinds = store.kind_totals().await.or_empty()?;

    let total_likes = if kinds.likes == 0 {
      store.count_favorite_memberships().await.or_empty()?
    } else {
      kinds.likes
    };

    let total_rating_stars = if kinds.rating_stars == 0 {
      store.total_rating_stars().await.or_empty()?
    } else {
      kinds.rating_stars
    };

    Ok(Totals {
      total_subjects: store.count_subjects().await.internal()?,
      total_identities: store.count_identities().await.internal()?,
      total_comments: store.count_comments().await.or_empty()?,
      total_views: kinds.views,
      total_likes,
      total_rating_stars,
    })
  }
}
