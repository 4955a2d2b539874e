//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use capstone_core::{ErrorCode, error::Classify};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  /// A store failure, already classified.
  #[error("{message}")]
  Store { code: ErrorCode, message: String },
}

impl ApiError {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Classify,
  {
    let code = err.code();
    if code == ErrorCode::Internal {
      tracing::error!(error = %err, "store failure");
    }
    ApiError::Store { code, message: err.to_string() }
  }

  pub fn code(&self) -> ErrorCode {
    match self {
      ApiError::NotFound(_) => ErrorCode::NotFound,
      ApiError::Store { code, .. } => *code,
    }
  }
}

/// The HTTP status a failure class is reported with.
pub fn status_for(code: ErrorCode) -> StatusCode {
  match code {
    ErrorCode::NotFound => StatusCode::NOT_FOUND,
    ErrorCode::InvalidTransition
    | ErrorCode::AlreadyRegistered
    | ErrorCode::SlotFull
    | ErrorCode::TopicFull
    | ErrorCode::LecturerSlotFull
    | ErrorCode::RegistrationNotPending => StatusCode::CONFLICT,
    ErrorCode::PreviouslyRejected
    | ErrorCode::OneActiveRegistrationPerCategory
    | ErrorCode::InvalidCapacity => StatusCode::UNPROCESSABLE_ENTITY,
    ErrorCode::StorageTimeout => StatusCode::SERVICE_UNAVAILABLE,
    ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let code = self.code();
    let body = json!({ "error": self.to_string(), "code": code });
    (status_for(code), Json(body)).into_response()
  }
}
