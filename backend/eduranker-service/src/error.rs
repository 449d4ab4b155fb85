use crate::services::items::ItemSourceError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Item source error: {0}")]
    ItemSource(#[from] ItemSourceError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    pub status: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ItemSource(ItemSourceError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ItemSource(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::Validation(_) => "validation_error",
            AppError::ItemSource(_) => "item_source_error",
        };

        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error,
            message: self.to_string(),
            status: status.as_u16(),
        })
    }
}
