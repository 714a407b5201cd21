//! Request-terminal errors and their JSON rendering.
//!
//! Every failure leaves the handler as an [`AppError`] and is rendered as
//! `{code, message, status}`; validation failures add an `errors` array.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::users::validation::FieldError;

/// Column guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

impl UniqueField {
    pub fn conflict_message(self) -> &'static str {
        match self {
            UniqueField::Email => "Email is already in use",
            UniqueField::Username => "Username is already in use",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failure")]
    Validation(Vec<FieldError>),

    #[error("{}", .0.conflict_message())]
    Conflict(UniqueField),

    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Conflicts keep the generic `BAD_REQUEST` code that clients already match on.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) | AppError::BadRequest(_) => {
                "BAD_REQUEST"
            }
            AppError::NotFound => "E_ROW_NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal(e) = &self {
            error!(error = ?e, "internal error");
        }
        let message = self.to_string();
        let code = self.code();
        let errors = match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        };
        let body = ErrorBody {
            code,
            message,
            status: status.as_u16(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}
