use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde_json::{json, Value};

use crate::parser::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to reach provider: {0}")]
    FetchError(String),

    #[error("Provider returned {status}")]
    ProviderError {
        status: StatusCode,
        details: Value,
    },

    #[error("Error parsing model output: {source}")]
    ParseError {
        #[source]
        source: ParseError,
        raw: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing GEMINI_API_KEY on server")]
    MissingApiKey,

    #[error("Unknown continent: {0}")]
    UnknownContinent(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ProviderError { status, .. } => *status,
            AppError::UnknownContinent(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::FetchError(_)
            | AppError::ParseError { .. }
            | AppError::ConfigError(_)
            | AppError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            AppError::FetchError(msg) => json!({
                "error": "Server exception",
                "message": msg,
            }),
            AppError::ProviderError { details, .. } => json!({
                "error": "Gemini error",
                "details": details,
            }),
            AppError::ParseError { source, raw } => {
                let details = match source {
                    ParseError::InvalidRecords(violations) => json!(violations),
                    other => json!(other.to_string()),
                };
                json!({
                    "error": "Gemini returned non-JSON",
                    "details": details,
                    "raw": raw,
                })
            }
            AppError::ConfigError(msg) => json!({ "error": msg }),
            AppError::MissingApiKey => json!({ "error": "Missing GEMINI_API_KEY on server" }),
            AppError::UnknownContinent(value) => json!({
                "error": "Unknown continent",
                "details": value,
            }),
            AppError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
