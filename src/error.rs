use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PaymentGateway(String),

    #[error("Payment verification failed. Please contact support with your order details.")]
    SignatureMismatch,

    #[error("Internal Server Error")]
    OrmError(#[from] sea_orm::DbErr),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::SignatureMismatch => StatusCode::BAD_REQUEST,
            AppError::OrmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let AppError::OrmError(err) = &self {
            tracing::error!(error = %err, "database error");
        }

        // Display impls above never leak internals to the client.
        let body = ApiResponse::<()>::error(self.to_string());
        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
