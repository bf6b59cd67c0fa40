//! Secondary writes that must never fail the primary operation.
//!
//! A best-effort write runs after its primary write has succeeded. If it
//! fails, the failure is logged and swallowed; nothing is retried or rolled
//! back.

use std::{fmt::Display, future::Future};

/// Await `write`, logging and discarding its error. Returns `None` when the
/// write failed.
pub async fn run<T, E, F>(operation: &'static str, write: F) -> Option<T>
where
  F: Future<Output = Result<T, E>>,
  E: Display,
{
  match write.await {
    Ok(v) => Some(v),
    Err(e) => {
      tracing::warn!(operation, error = %e, "best-effort write failed; continuing");
      None
    }
  }
}
