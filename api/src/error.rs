//! Unified error types for the IBBS API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic and persistence errors
//! - `AiError`: AI completion API client errors
//! - `DirectoryError`: Microsoft Graph directory client errors
//! - `KnowledgeBaseError`: MongoDB knowledge base errors
//! - `AppError`: Application layer errors (wraps the others for HTTP responses)

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::handlers::envelope::ApiResponse;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// AI completion API errors
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("AI features are not configured")]
    Disabled,

    #[error("Unexpected model response: {0}")]
    InvalidResponse(String),
}

/// Microsoft Graph directory errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Token acquisition failed: {0}")]
    Token(String),

    #[error("User directory is not configured")]
    Disabled,
}

/// MongoDB knowledge base errors
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(#[from] KnowledgeBaseError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and the message placed in the envelope's `Data` field
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Domain(DomainError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Domain(DomainError::AlreadyExists(msg)) => {
                (StatusCode::CONFLICT, msg.clone())
            }
            AppError::Domain(DomainError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Domain(DomainError::Forbidden(msg)) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Ai(e) => {
                tracing::error!("AI error: {}", e);
                match e {
                    AiError::Disabled => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
                    AiError::RateLimited => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "AI service is rate limited".to_string(),
                    ),
                    AiError::InvalidResponse(_) => (
                        StatusCode::BAD_GATEWAY,
                        "AI service returned an unexpected response".to_string(),
                    ),
                    _ => (StatusCode::BAD_GATEWAY, "AI service error".to_string()),
                }
            }
            AppError::Directory(e) => {
                tracing::error!("Directory error: {}", e);
                match e {
                    DirectoryError::Disabled => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
                    _ => (StatusCode::BAD_GATEWAY, "Directory service error".to_string()),
                }
            }
            AppError::KnowledgeBase(e) => {
                tracing::error!("Knowledge base error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

// Extractor rejections are client input errors; the body text names the field
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        ApiResponse::failure(status, message).into_response()
    }
}
