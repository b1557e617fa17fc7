// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::{PermissionCodeError, TokenError};
use crate::database::DatabaseError;

pub const MISSING_TOKEN_MESSAGE: &str = "Missing or invalid token";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    PermissionDenied { permission: String },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::ValidationError { message, .. } => message.clone(),
            ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::PermissionDenied { permission } => format!("Missing permission: {}", permission),
            ApiError::InternalServerError(msg) => msg.clone(),
            ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::PermissionDenied { .. } => "PERMISSION_DENIED",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            // Identity failures keep the `{error, message}` shape clients already branch on
            ApiError::Unauthorized(message) => {
                json!({
                    "error": "Unauthorized",
                    "message": message
                })
            }
            ApiError::PermissionDenied { permission } => {
                json!({
                    "ok": false,
                    "code": self.error_code(),
                    "message": self.message(),
                    "details": { "missingPerm": permission }
                })
            }
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "ok": false,
                    "code": self.error_code(),
                    "message": message
                });

                if let Some(field_errors) = field_errors {
                    response["details"] = json!({ "fieldErrors": field_errors });
                }

                response
            }
            _ => {
                json!({
                    "ok": false,
                    "code": self.error_code(),
                    "message": self.message()
                })
            }
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn permission_denied(permission: impl Into<String>) -> Self {
        ApiError::PermissionDenied {
            permission: permission.into(),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingSecret | TokenError::Encoding(_) => {
                tracing::error!("Token codec misconfigured: {}", err);
                ApiError::internal_server_error("Authentication is not configured")
            }
            _ => ApiError::unauthorized(INVALID_TOKEN_MESSAGE),
        }
    }
}

impl From<PermissionCodeError> for ApiError {
    fn from(err: PermissionCodeError) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert("permissionCode".to_string(), err.to_string());
        ApiError::validation_error("Invalid permission code", Some(field_errors))
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unavailable() {
            tracing::error!("Permission store unavailable: {}", err);
            return ApiError::service_unavailable("Permission store temporarily unavailable");
        }
        // Don't expose internal SQL errors to clients
        tracing::error!("Permission store error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
