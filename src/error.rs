use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use uuid::Uuid;

use crate::models::portfolio::Status;

/// Failures raised by a portfolio/comment store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Portfolio {0} not found")]
    NotFound(Uuid),

    /// The record changed between read and write.
    #[error("Portfolio {0} was modified concurrently")]
    Conflict(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Errors reported by the review core to its callers.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Portfolio {0} not found")]
    NotFound(Uuid),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Cannot {action} a portfolio that is {from}")]
    InvalidTransition { action: &'static str, from: Status },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Portfolio {0} was modified concurrently, reload and retry")]
    Conflict(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ReviewError {
    /// Stable machine-readable name used in API error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ReviewError::NotFound(_) => "not_found",
            ReviewError::Unauthorized(_) => "unauthorized",
            ReviewError::InvalidTransition { .. } => "invalid_transition",
            ReviewError::Validation(_) => "validation_error",
            ReviewError::Conflict(_) => "conflict",
            ReviewError::Storage(_) => "storage",
        }
    }
}

impl From<StoreError> for ReviewError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ReviewError::NotFound(id),
            StoreError::Conflict(id) => ReviewError::Conflict(id),
            StoreError::Database(db) => ReviewError::Storage(db.to_string()),
        }
    }
}

impl ResponseError for ReviewError {
    fn status_code(&self) -> StatusCode {
        match self {
            ReviewError::NotFound(_) => StatusCode::NOT_FOUND,
            ReviewError::Unauthorized(_) => StatusCode::FORBIDDEN,
            ReviewError::InvalidTransition { .. } => StatusCode::CONFLICT,
            ReviewError::Validation(_) => StatusCode::BAD_REQUEST,
            ReviewError::Conflict(_) => StatusCode::CONFLICT,
            ReviewError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }))
    }
}
