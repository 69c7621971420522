use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::services::assistant_service::AssistantError;
use crate::services::itinerary_generation_service::GenerationError;
use crate::services::model_client::ModelError;
use crate::services::prompt_builder::PlanError;

/// Every failure a handler can return. The status mapping lives in
/// `status_code` and is the only place routes get their error codes from.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    DateFormat(String),

    #[error("{0}")]
    Range(String),

    #[error("Invalid {0} ID")]
    InvalidId(&'static str),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Model service authentication failed")]
    UpstreamAuth(String),

    #[error("Model service unavailable")]
    UpstreamUnavailable(String),

    #[error("Model service timed out")]
    UpstreamTimeout(String),

    #[error("Model output could not be parsed")]
    Schema(String),

    #[error("Storage failure")]
    Store(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn missing_field(field: &str) -> Self {
        ApiError::Validation(format!("{} is required", field))
    }

    /// Diagnostic detail for 5xx bodies.
    fn details(&self) -> Option<&str> {
        match self {
            ApiError::UpstreamAuth(details)
            | ApiError::UpstreamUnavailable(details)
            | ApiError::UpstreamTimeout(details)
            | ApiError::Schema(details)
            | ApiError::Store(details)
            | ApiError::Internal(details) => Some(details),
            _ => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DateFormat(_)
            | ApiError::Range(_)
            | ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UpstreamAuth(_)
            | ApiError::UpstreamUnavailable(_)
            | ApiError::UpstreamTimeout(_)
            | ApiError::Schema(_)
            | ApiError::Store(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self.details() {
            Some(details) => {
                error!("{}: {}", self, details);
                HttpResponse::build(status).json(json!({
                    "error": self.to_string(),
                    "details": details,
                }))
            }
            None => HttpResponse::build(status).json(json!({ "error": self.to_string() })),
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Validation(_) => ApiError::Validation(err.to_string()),
            PlanError::DateFormat(_) => ApiError::DateFormat(err.to_string()),
            PlanError::Range(_) => ApiError::Range(err.to_string()),
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UpstreamAuth(_) => ApiError::UpstreamAuth(err.to_string()),
            ModelError::UpstreamUnavailable(_) | ModelError::InvalidResponse(_) => {
                ApiError::UpstreamUnavailable(err.to_string())
            }
            ModelError::UpstreamTimeout(_) => ApiError::UpstreamTimeout(err.to_string()),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Plan(e) => e.into(),
            GenerationError::Model(e) => e.into(),
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::EmptyMessage => ApiError::Validation(err.to_string()),
            AssistantError::Model(e) => e.into(),
            AssistantError::Unparseable(details) => ApiError::Schema(details),
        }
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // Callers that know the resource name map InvalidId themselves.
            StoreError::InvalidId(_) => ApiError::InvalidId("record"),
            StoreError::Duplicate(_) => ApiError::Conflict(err.to_string()),
            StoreError::Serialization(_) | StoreError::Backend(_) => ApiError::Store(err.to_string()),
        }
    }
}
