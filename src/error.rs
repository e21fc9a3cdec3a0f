//! Error types for the LocalLibrary server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::form::FormErrors;

/// Login page anonymous visitors are sent to
pub const LOGIN_URL: &str = "/accounts/login";

/// Application error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchData = 4,
    BadValue = 5,
    Duplicate = 6,
    SessionFailure = 7,
    LoginRequired = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Anonymous visitor on a login-only view; carries the path and query to come back to
    #[error("Login required to access {0}")]
    LoginRequired(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A submitted form failed validation and must be redisplayed
    #[error("Invalid form submission")]
    InvalidForm {
        form: serde_json::Value,
        errors: FormErrors,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build an `InvalidForm` error echoing the submitted form back
    pub fn invalid_form<F: Serialize>(form: &F, errors: FormErrors) -> Self {
        AppError::InvalidForm {
            form: serde_json::to_value(form).unwrap_or(serde_json::Value::Null),
            errors,
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Session(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Submitted form, present on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub form: Option<serde_json::Value>,
    /// Field name to error messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FormErrors>,
}

fn database_error_status(e: &sqlx::Error) -> Option<(StatusCode, ErrorCode, String)> {
    let db = e.as_database_error()?;
    if db.is_foreign_key_violation() {
        Some((
            StatusCode::CONFLICT,
            ErrorCode::Duplicate,
            "Object is still referenced by other records".to_string(),
        ))
    } else if db.is_unique_violation() {
        Some((
            StatusCode::CONFLICT,
            ErrorCode::Duplicate,
            "An object with this value already exists".to_string(),
        ))
    } else {
        None
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut form = None;
        let mut errors = None;

        let (status, code, message) = match self {
            AppError::LoginRequired(next) => {
                let target = format!("{}?next={}", LOGIN_URL, urlencoding::encode(&next));
                return Redirect::to(&target).into_response();
            }
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg)
            }
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg),
            AppError::InvalidForm {
                form: submitted,
                errors: field_errors,
            } => {
                form = Some(submitted);
                errors = Some(field_errors);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorCode::BadValue,
                    "Please correct the errors below".to_string(),
                )
            }
            AppError::Database(e) => match database_error_status(&e) {
                Some(mapped) => mapped,
                None => {
                    tracing::error!("Database error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::DbFailure,
                        "Database error".to_string(),
                    )
                }
            },
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Duplicate, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg),
            AppError::Session(msg) => {
                tracing::error!("Session store error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::SessionFailure,
                    "Session unavailable".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            form,
            errors,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn login_required_redirects_to_login_page() {
        let response = AppError::LoginRequired("/mybooks".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/accounts/login?next=%2Fmybooks")
        );
    }

    #[test]
    fn login_redirect_keeps_the_encoded_query() {
        let response = AppError::LoginRequired("/mybooks?page=2".to_string()).into_response();
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/accounts/login?next=%2Fmybooks%3Fpage%3D2")
        );
    }

    #[test]
    fn bad_request_carries_the_error_body() {
        let response = AppError::BadRequest("Expected a JSON object".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn authorization_maps_to_forbidden() {
        let response = AppError::Authorization("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn invalid_form_maps_to_unprocessable() {
        let mut errors = FormErrors::new();
        errors.insert("name".to_string(), vec!["This field is required.".to_string()]);
        let response =
            AppError::invalid_form(&serde_json::json!({ "name": "" }), errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("Book 9".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
