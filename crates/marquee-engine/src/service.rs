//! [`EngagementService`], the entry point of the engine.

use std::sync::Arc;

use marquee_core::{
  rating::RatingIndex,
  identity::IdentityId,
  store::{EngagementBackend, IdentityDirectory, RatingStore, StoreError},
};
use tokio::sync::OnceCell;

use crate::{Error, Result, error::StoreResultExt as _};

/// Write and read paths over one backend.
///
/// Holds the only process-wide state of the engine: whether the rating
/// indexes have been ensured.
pub struct EngagementService<S> {
  pub(crate) store: Arc<S>,
  indexes:          OnceCell<()>,
}

impl<S: EngagementBackend> EngagementService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store, indexes: OnceCell::new() } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Ensure the rating indexes exist. Runs at most once successfully per
  /// service; a failed attempt leaves the cell empty so the next caller
  /// tries again. Concurrent callers wait on the same attempt.
  pub async fn bootstrap(&self) -> Result<()> {
    self
      .indexes
      .get_or_try_init(|| ensure_rating_indexes(self.store.as_ref()))
      .await?;
    Ok(())
  }

  /// Resolve a bearer credential to the identity it was issued to. Unknown
  /// credentials resolve to `None`; callers treat that as anonymous.
  pub async fn identify(&self, credential: &str) -> Result<Option<IdentityId>> {
    if credential.is_empty() {
      return Ok(None);
    }
    self.store.resolve_credential(credential).await.or_empty()
  }
}

/// Create every rating index, tolerating ones that already exist (another
/// process, or an earlier run, got there first).
async fn ensure_rating_indexes<S: RatingStore>(store: &S) -> Result<()> {
  for index in RatingIndex::ALL {
    match store.create_index(index).await {
      Ok(()) => tracing::info!(?index, "created rating index"),
      Err(e) if e.is_already_exists() => {
        tracing::debug!(?index, "rating index already exists");
      }
      Err(e) => return Err(Error::internal(e)),
    }
  }
  Ok(())
}
