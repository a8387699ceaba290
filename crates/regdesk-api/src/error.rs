//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// A request body axum refused to extract; keeps axum's status, e.g.
  /// 415 for a missing JSON content type.
  #[error("rejected request: {message}")]
  Rejected { status: StatusCode, message: String },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Convert a backend error by way of the domain error.
  pub fn from_store<E: Into<regdesk_core::Error>>(e: E) -> Self { Self::from(e.into()) }
}

impl From<regdesk_core::Error> for ApiError {
  fn from(e: regdesk_core::Error) -> Self {
    use regdesk_core::Error as E;
    match e {
      E::NotFound(_) => Self::NotFound(e.to_string()),
      E::UnrecognizedPayloadShape(_)
      | E::InvalidFieldsForType { .. }
      | E::Validation { .. } => Self::BadRequest(e.to_string()),
      E::DuplicateRecord { .. } => Self::Conflict(e.to_string()),
      E::KindMismatch { .. } | E::PasswordHash(_) | E::Persistence(_) => {
        Self::Store(Box::new(e))
      }
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Rejected {
      status:  rejection.status(),
      message: rejection.body_text(),
    }
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Rejected { status, message } => (*status, message.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
