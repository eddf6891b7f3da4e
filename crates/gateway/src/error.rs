//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roster_database::{StoreError, UniqueField};
use thiserror::Error;
use tracing::error;

use crate::envelope::{Envelope, ErrorBody};
use crate::target::TargetError;

/// The user operation a request performs; selects the client-facing wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    ReadAll,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::ReadAll => "read_all",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    fn ambiguous_message(&self) -> &'static str {
        match self {
            Operation::Update => "You must/can only specify a user to update.",
            Operation::Delete => "You must/can only specify a user to delete.",
            Operation::Create | Operation::ReadAll | Operation::Read => {
                "You must/can only specify a user to retrieve."
            }
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Operation::Create | Operation::Update => "User operation failed",
            Operation::ReadAll => "Failed to retrieve users.",
            Operation::Read => "Failed to retrieve user.",
            Operation::Delete => "Failed to delete user.",
        }
    }
}

/// Gateway error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request body not valid: {0}")]
    InvalidBody(String),

    #[error("query string not valid: {0}")]
    InvalidQuery(String),

    #[error("username and email are required")]
    MissingRequiredFields,

    #[error("user id is not a non-negative integer")]
    InvalidIdentifier,

    #[error("{} needs exactly one of user id or username", .0.as_str())]
    AmbiguousTarget(Operation),

    #[error("user not found")]
    NotFound,

    #[error("{0} has been taken")]
    UniqueViolation(UniqueField),

    #[error("store failure during {}: {detail}", .operation.as_str())]
    Store { operation: Operation, detail: String },

    #[error("response encoding failed during {}: {detail}", .operation.as_str())]
    Encoding { operation: Operation, detail: String },
}

impl ApiError {
    pub fn from_store(operation: Operation, error: StoreError) -> Self {
        match error {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::UniqueViolation { field } => ApiError::UniqueViolation(field),
            StoreError::Backend(detail) => ApiError::Store { operation, detail },
        }
    }

    pub fn from_target(operation: Operation, error: TargetError) -> Self {
        match error {
            TargetError::InvalidIdentifier => ApiError::InvalidIdentifier,
            TargetError::AmbiguousOrMissingTarget => ApiError::AmbiguousTarget(operation),
        }
    }

    pub fn encoding(operation: Operation, error: serde_json::Error) -> Self {
        ApiError::Encoding {
            operation,
            detail: error.to_string(),
        }
    }

    /// NotFound stays a 400; only server-side failures are 500s.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Store { .. } | ApiError::Encoding { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidBody(_) => "Request body not valid.",
            ApiError::InvalidQuery(_) => "Query string not valid.",
            ApiError::MissingRequiredFields => "You must specify both a username and an email.",
            ApiError::InvalidIdentifier => "UserID must be a positive integer.",
            ApiError::AmbiguousTarget(operation) => operation.ambiguous_message(),
            ApiError::NotFound => "User does not exist",
            ApiError::UniqueViolation(UniqueField::Username) => "Username has been taken!",
            ApiError::UniqueViolation(UniqueField::Email) => "Email has been taken!",
            ApiError::Store { operation, .. } | ApiError::Encoding { operation, .. } => {
                operation.failure_message()
            }
        }
    }

    /// Store detail stays server side; the client only sees the code.
    pub fn error_body(&self) -> ErrorBody {
        match self {
            ApiError::InvalidBody(detail) | ApiError::InvalidQuery(detail) => {
                ErrorBody::new("validation_error").with_detail(detail)
            }
            ApiError::MissingRequiredFields => ErrorBody::new("validation_error"),
            ApiError::InvalidIdentifier => ErrorBody::new("invalid_identifier"),
            ApiError::AmbiguousTarget(_) => ErrorBody::new("ambiguous_target"),
            ApiError::NotFound => ErrorBody::new("not_found"),
            ApiError::UniqueViolation(field) => {
                ErrorBody::new("unique_violation").with_field(field.as_str())
            }
            ApiError::Store { .. } => ErrorBody::new("store_error"),
            ApiError::Encoding { .. } => ErrorBody::new("encoding_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store { operation, detail } => {
                error!(operation = operation.as_str(), detail = %detail, "user store failure");
            }
            ApiError::Encoding { operation, detail } => {
                error!(operation = operation.as_str(), detail = %detail, "response encoding failure");
            }
            _ => {}
        }

        let status = self.status_code();
        let envelope = Envelope::error(self.message(), self.error_body());

        (status, Json(envelope)).into_response()
    }
}

/// Result type for gateway operations
pub type ApiResult<T> = Result<T, ApiError>;
