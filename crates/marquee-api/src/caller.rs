//! Bearer-token identity extractor.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use marquee_core::{identity::IdentityId, store::EngagementBackend};

use crate::{ApiState, error::ApiError};

/// The identity behind a request, or `None` for anonymous callers.
///
/// A missing header, a non-bearer scheme and an unknown token all resolve to
/// anonymous; only a storage failure rejects the request.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<IdentityId>);

/// The token of an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

impl<S> FromRequestParts<ApiState<S>> for Caller
where
  S: EngagementBackend + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(token) = bearer_token(&parts.headers) else {
      return Ok(Caller(None));
    };
    Ok(Caller(state.identify(token).await?))
  }
}
