//! Handler for `POST /events`.
//!
//! Body: `{"subjectId":"…","eventType":"view|favorite|rating","value":4,"mode":"movie"}`.
//! Anonymous callers may record any kind.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use marquee_core::store::EngagementBackend;
use marquee_engine::RecordEvent;
use serde_json::json;

use crate::{ApiState, Caller, error::ApiError};

/// `POST /events` → `201 {"ok":true}`
pub async fn create<S>(
  State(service): State<ApiState<S>>,
  Caller(identity): Caller,
  body: Result<Json<RecordEvent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EngagementBackend + 'static,
{
  let Json(input) = body?;
  service.record_event(input, identity).await?;
  Ok((StatusCode::CREATED, Json(json!({ "ok": true }))))
}
