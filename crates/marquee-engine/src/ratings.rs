//! Read path: current-state rating summaries.

use marquee_core::{
  identity::IdentityId,
  rating::RatingSummary,
  store::{EngagementBackend, RatingStore},
  subject::SubjectId,
};

use crate::{EngagementService, Result, error::StoreResultExt as _};

impl<S: EngagementBackend> EngagementService<S> {
  /// Average, count and the caller's own rating for a subject.
  pub async fn rating_summary(
    &self,
    subject_id: &str,
    identity: Option<&IdentityId>,
  ) -> Result<RatingSummary> {
    let subject_id = SubjectId::parse(subject_id)?;
    self.require_subject(&subject_id).await?;
    self.bootstrap().await?;
    self.summarize(&subject_id, identity).await
  }

  /// Ratings are read from the rating store, never from rating events.
  pub(crate) async fn summarize(
    &self,
    subject_id: &SubjectId,
    identity: Option<&IdentityId>,
  ) -> Result<RatingSummary> {
    let stats = self.store.rating_stats(subject_id).await.or_empty()?;

    let user_rating = match identity {
      Some(identity_id) => self
        .store
        .get_rating(subject_id, identity_id)
        .await
        .or_empty()?
        .map(|r| r.rating),
      None => None,
    };

    Ok(RatingSummary {
      subject_id: subject_id.clone(),
      average_rating: stats.average(),
      rating_count: stats.count,
      user_rating,
    })
  }
}
