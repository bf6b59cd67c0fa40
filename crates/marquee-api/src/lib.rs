//! JSON REST API for Marquee.
//!
//! Exposes an axum [`Router`] backed by an [`EngagementService`] over any
//! [`EngagementBackend`]. TLS and transport concerns are the caller's
//! responsibility; identity comes from bearer tokens (see [`caller`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", marquee_api::api_router(service.clone()))
//! ```

pub mod caller;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod ratings;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post},
};
use marquee_core::store::EngagementBackend;
use marquee_engine::EngagementService;
use serde_json::{Value, json};

pub use caller::Caller;
pub use error::ApiError;

/// Handler state: the engine, shared across requests.
pub type ApiState<S> = Arc<EngagementService<S>>;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: ApiState<S>) -> Router<()>
where
  S: EngagementBackend + 'static,
{
  Router::new()
    // Write path
    .route("/events", post(events::create::<S>))
    // Ratings
    .route(
      "/subjects/{id}/rating",
      get(ratings::get_one::<S>).post(ratings::submit::<S>),
    )
    // Read path
    .route("/dashboard", get(dashboard::handler::<S>))
    .route("/health", get(health))
    .with_state(service)
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

#[cfg(test)]
mod tests;
