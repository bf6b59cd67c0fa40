//! Handlers for `/subjects/{id}/rating`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subjects/{id}/rating` | `userRating` is `null` when anonymous |
//! | `POST` | `/subjects/{id}/rating` | Body: `{"rating":4}`; 401 when anonymous |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use marquee_core::{rating::RatingSummary, store::EngagementBackend};
use serde::Deserialize;
use serde_json::Value;

use crate::{ApiState, Caller, error::ApiError};

// ─── Get ─────────────────────────────────────────────────────────────────────

/// `GET /subjects/{id}/rating`
pub async fn get_one<S>(
  State(service): State<ApiState<S>>,
  Path(id): Path<String>,
  Caller(identity): Caller,
) -> Result<Json<RatingSummary>, ApiError>
where
  S: EngagementBackend + 'static,
{
  let summary = service.rating_summary(&id, identity.as_ref()).await?;
  Ok(Json(summary))
}

// ─── Submit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SubmitBody {
  #[serde(default)]
  pub rating: Option<Value>,
}

/// `POST /subjects/{id}/rating`, body: `{"rating":4}`
pub async fn submit<S>(
  State(service): State<ApiState<S>>,
  Path(id): Path<String>,
  Caller(identity): Caller,
  body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<Json<RatingSummary>, ApiError>
where
  S: EngagementBackend + 'static,
{
  // An undecodable body is a missing rating; the engine reports that after
  // checking identity.
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let summary = service
    .submit_rating(&id, body.rating.as_ref(), identity)
    .await?;
  Ok(Json(summary))
}
