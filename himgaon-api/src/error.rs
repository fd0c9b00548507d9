use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use himgaon_catalog::ProductError;
use himgaon_order::OrderError;
use serde_json::json;

const RETRY_LATER: &str = "The store is busy right now, please try again in a moment";

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    UnavailableError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnavailableError(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, RETRY_LATER.to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(_) | OrderError::EmptyCart => {
                AppError::ValidationError(err.to_string())
            }
            OrderError::ProductUnavailable(_)
            | OrderError::InsufficientStock { .. }
            | OrderError::InvalidTransition { .. } => AppError::ConflictError(err.to_string()),
            OrderError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            OrderError::IdentifierCollision(_) | OrderError::Transient(_) => {
                AppError::UnavailableError(err.to_string())
            }
            OrderError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            ProductError::Invalid(msg) => AppError::ValidationError(msg),
            ProductError::Transient(msg) => AppError::UnavailableError(msg),
            ProductError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}
