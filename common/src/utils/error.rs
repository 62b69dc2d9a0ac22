use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::database::failure::StoreError;

pub const TABLE_NOT_INITIALIZED: &str =
    "Appraisals table does not exist. Please initialize the database first.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Appraisals table is not initialized")]
    NotInitialized(StoreError),

    #[error("Database connection failed: {0}")]
    Unhealthy(StoreError),

    #[error("Input validation failed: {field}")]
    Validation { field: String, message: String },

    #[error("Origin not allowed: {0}")]
    OriginRejected(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    const DB_ERROR: &'static str = "DB_ERROR";
    const DB_NOT_INITIALIZED: &'static str = "DB_NOT_INITIALIZED";
    const DB_UNAVAILABLE: &'static str = "DB_UNAVAILABLE";
    const VALIDATION_ERROR: &'static str = "VALIDATION_ERROR";
    const CORS_REJECTED: &'static str = "CORS_REJECTED";
    const CONFIG_ERROR: &'static str = "CONFIG_ERROR";
    const IO_ERROR: &'static str = "IO_ERROR";
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code) = match &self {
            Self::Database(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.clone(), Self::DB_ERROR)
            }
            Self::Store(e) => {
                e.log("Store error");
                (StatusCode::INTERNAL_SERVER_ERROR, e.message.clone(), Self::DB_ERROR)
            }
            Self::NotInitialized(e) => {
                e.log("Appraisals table missing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    TABLE_NOT_INITIALIZED.into(),
                    Self::DB_NOT_INITIALIZED,
                )
            }
            Self::Unhealthy(e) => {
                e.log("Health check failed");
                let body = json!({
                    "error": "Database connection failed",
                    "details": e.message,
                    "error_code": Self::DB_UNAVAILABLE,
                    "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16()
                });
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
            Self::Validation { message, .. } => (
                StatusCode::BAD_REQUEST,
                message.clone(),
                Self::VALIDATION_ERROR,
            ),
            Self::OriginRejected(origin) => {
                tracing::warn!(origin = %origin, "Rejected cross-origin request");
                (
                    StatusCode::FORBIDDEN,
                    "Not allowed by CORS".into(),
                    Self::CORS_REJECTED,
                )
            }
            Self::Config(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".into(),
                    Self::CONFIG_ERROR,
                )
            }
            Self::Io(e) => {
                tracing::error!("IO error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), Self::IO_ERROR)
            }
        };

        let body = json!({
            "error": message,
            "error_code": code,
            "status": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
