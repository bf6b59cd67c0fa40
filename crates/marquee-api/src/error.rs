//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use marquee_engine::Error as EngineError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Engine(#[from] EngineError),

  /// The request body could not be decoded.
  #[error("bad request: {0}")]
  BadRequest(String),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Engine(e) => match e {
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  fn code(&self) -> &'static str {
    match self {
      ApiError::BadRequest(_) => "invalid_input",
      ApiError::Engine(e) => e.code(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Engine(EngineError::Internal(source)) => {
        tracing::error!(error = %source, "request failed");
        "internal error".to_owned()
      }
      ApiError::Engine(EngineError::InvalidInput(m) | EngineError::NotFound(m)) => m.clone(),
      other => other.to_string(),
    };
    let body = json!({ "error": { "code": self.code(), "message": message } });
    (status, Json(body)).into_response()
  }
}
