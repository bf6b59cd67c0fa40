//! Write path: event ingestion and rating submission.

use chrono::Utc;
use marquee_core::{
  event::{EngagementEvent, EventKind, EventPayload, RatingValue},
  identity::IdentityId,
  rating::{NewRating, RatingSummary},
  store::{EngagementBackend, EventStore, RatingStore, SubjectCatalog},
  subject::SubjectId,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
  EngagementService, Error, Result, best_effort, error::StoreResultExt as _,
};

/// Raw input of [`EngagementService::record_event`], as sent by clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEvent {
  pub subject_id: String,
  pub event_type: String,
  /// Only meaningful for `rating` events.
  #[serde(default)]
  pub value:      Option<Value>,
  /// Viewing context; defaults to `"movie"`.
  #[serde(default)]
  pub mode:       Option<String>,
}

impl<S: EngagementBackend> EngagementService<S> {
  /// Validate, normalise and append one engagement event.
  ///
  /// Anonymous callers may record any kind. Every call appends a new event;
  /// repeated views are all counted.
  pub async fn record_event(
    &self,
    input: RecordEvent,
    identity: Option<IdentityId>,
  ) -> Result<()> {
    let subject_id = SubjectId::parse(&input.subject_id)?;
    let kind = EventKind::parse(&input.event_type)?;
    let payload = EventPayload::from_raw(kind, input.value.as_ref())?;

    self.require_subject(&subject_id).await?;

    let event =
      EngagementEvent::new(subject_id, identity, payload, input.mode, Utc::now());
    tracing::debug!(
      subject_id = %event.subject_id,
      kind = %event.kind(),
      anonymous = event.identity_id.is_none(),
      "recording engagement event"
    );
    self.store.append_event(event).await.internal()
  }

  /// Upsert the caller's rating of a subject and return the recomputed
  /// summary.
  ///
  /// The rating is also mirrored into the event stream for trend lines.
  /// That mirror is best-effort: if it fails the rating still counts.
  pub async fn submit_rating(
    &self,
    subject_id: &str,
    raw_rating: Option<&Value>,
    identity: Option<IdentityId>,
  ) -> Result<RatingSummary> {
    let identity = identity.ok_or(Error::Unauthorized)?;
    let subject_id = SubjectId::parse(subject_id)?;
    let rating = RatingValue::strict(raw_rating)?;

    self.require_subject(&subject_id).await?;
    self.bootstrap().await?;

    let now = Utc::now();
    self
      .store
      .upsert_rating(NewRating {
        subject_id:  subject_id.clone(),
        identity_id: identity.clone(),
        rating,
        at:          now,
      })
      .await
      .internal()?;

    let mirror = EngagementEvent::new(
      subject_id.clone(),
      Some(identity.clone()),
      EventPayload::Rating(rating),
      None,
      now,
    );
    best_effort::run("rating event mirror", self.store.append_event(mirror)).await;

    self.summarize(&subject_id, Some(&identity)).await
  }

  pub(crate) async fn require_subject(&self, subject_id: &SubjectId) -> Result<()> {
    if self.store.subject_exists(subject_id).await.internal()? {
      Ok(())
    } else {
      Err(Error::NotFound(format!("subject {subject_id} not found")))
    }
  }
}
