//! Typed failures surfaced by the pokemon service.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
  /// A locally created pokemon already uses this name
  #[error("Pokemon with name {name} already exists")]
  Duplicate { name: String },

  /// The upstream reports no pokemon with this id
  #[error("Pokemon with id {id} not found")]
  NotFound { id: u64 },

  /// Request data failed validation; one message per violated rule
  #[error("{}", .0.join(", "))]
  Invalid(Vec<String>),

  /// Transport failure, unexpected status, or undecodable upstream data
  #[error("upstream unavailable: {0}")]
  Upstream(String),
}

impl ServiceError {
  pub fn upstream(context: &str, err: impl std::fmt::Display) -> Self {
    Self::Upstream(format!("{}: {}", context, err))
  }

  /// HTTP status class for the surrounding transport layer.
  pub fn status_code(&self) -> u16 {
    match self {
      Self::Duplicate { .. } | Self::Invalid(_) => 400,
      Self::NotFound { .. } => 404,
      Self::Upstream(_) => 502,
    }
  }

  pub fn error_label(&self) -> &'static str {
    match self {
      Self::Duplicate { .. } | Self::Invalid(_) => "Bad Request",
      Self::NotFound { .. } => "Not Found",
      Self::Upstream(_) => "Bad Gateway",
    }
  }
}

/// Serializable error payload: `{"message", "error", "statusCode"}`.
///
/// Validation failures carry the list of messages; everything else a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
  pub message: Value,
  pub error: &'static str,
  pub status_code: u16,
}

impl From<&ServiceError> for ErrorBody {
  fn from(err: &ServiceError) -> Self {
    let message = match err {
      ServiceError::Invalid(errors) => Value::from(errors.clone()),
      other => Value::from(other.to_string()),
    };

    Self {
      message,
      error: err.error_label(),
      status_code: err.status_code(),
    }
  }
}
