use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::routes::{FAILURE_BODY, standard_response};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed operand: {0}")]
    MalformedOperand(String),
    #[error("Index out of range: {0}")]
    OutOfRange(String),
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("GPIO error: {0}")]
    Gpio(String),
}

impl AppError {
    pub fn is_command_error(&self) -> bool {
        matches!(
            self,
            AppError::MalformedOperand(_) | AppError::OutOfRange(_) | AppError::InvalidDuration(_)
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MalformedOperand(_)
            | AppError::OutOfRange(_)
            | AppError::InvalidDuration(_) => StatusCode::OK,
            AppError::Config(_) | AppError::Gpio(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // every command failure collapses to the same body token
        if self.is_command_error() {
            return standard_response().body(FAILURE_BODY);
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
