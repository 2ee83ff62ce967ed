//! Error type and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use jobhunt_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by a handler.
#[derive(Debug, Error)]
pub enum Error {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<CoreError> for Error {
  fn from(err: CoreError) -> Self {
    match err {
      CoreError::UserNotFound(_)
      | CoreError::CompanyNotFound(_)
      | CoreError::JobNotFound(_)
      | CoreError::ContactNotFound(_)
      | CoreError::ToDoNotFound(_)
      | CoreError::SalaryNotFound { .. } => Error::NotFound(err.to_string()),
      CoreError::UnknownCode { .. } => Error::BadRequest(err.to_string()),
      CoreError::EmailTaken(_) => Error::Conflict(err.to_string()),
      CoreError::Store(inner) => Error::Store(inner),
    }
  }
}

/// Adapter for `map_err` on any backend's error type.
pub fn store_err<E: Into<CoreError>>(err: E) -> Error {
  let err: CoreError = err.into();
  Error::from(err)
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::Conflict(_) => StatusCode::CONFLICT,
      Error::PasswordHash(_) | Error::Store(_) => {
        tracing::error!(error = %self, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use jobhunt_core::ids::JobId;

  use super::*;

  #[test]
  fn domain_errors_map_to_statuses() {
    let cases = [
      (CoreError::JobNotFound(JobId(1)), StatusCode::NOT_FOUND),
      (CoreError::UnknownCode { table: "job", code: 0 }, StatusCode::BAD_REQUEST),
      (CoreError::EmailTaken("a@b.c".into()), StatusCode::CONFLICT),
    ];
    for (err, status) in cases {
      assert_eq!(Error::from(err).into_response().status(), status);
    }
  }
}
