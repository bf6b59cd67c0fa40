//! Handler for `GET /dashboard[?granularity=day|month&limit=N]`.
//!
//! Parameters are lenient: anything unrecognised falls back to the defaults.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use marquee_core::{
  dashboard::DashboardSummary, store::EngagementBackend, timeline::DashboardQuery,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
  pub granularity: Option<String>,
  pub limit:       Option<String>,
}

/// `GET /dashboard`
pub async fn handler<S>(
  State(service): State<ApiState<S>>,
  params: Result<Query<DashboardParams>, QueryRejection>,
) -> Result<Json<DashboardSummary>, ApiError>
where
  S: EngagementBackend + 'static,
{
  let params = params.map(|Query(p)| p).unwrap_or_default();
  let query =
    DashboardQuery::from_params(params.granularity.as_deref(), params.limit.as_deref());
  Ok(Json(service.dashboard(query).await?))
}
