//! The engagement analytics engine.
//!
//! Write path: [`EngagementService::record_event`] and
//! [`EngagementService::submit_rating`]. Read path:
//! [`EngagementService::rating_summary`] and
//! [`EngagementService::dashboard`]. Everything is computed from the stores
//! on each call; nothing is cached.

pub mod best_effort;
pub mod buckets;
pub mod comments;
pub mod error;
pub mod ranking;

mod dashboard;
mod ingest;
mod ratings;
mod service;

pub use error::{Error, Result};
pub use ingest::RecordEvent;
pub use service::EngagementService;
