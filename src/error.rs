// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use sqlx::error::ErrorKind;
use std::collections::HashMap;
use validator::ValidationErrors;

use crate::auth::{PasswordError, TokenError, Unauthorized};
use crate::database::{DatabaseError, UpdateError};
use crate::filter::FilterError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Client-safe message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

/// One message per field, keyed by the JSON (camelCase) field name.
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .map(|e| e.message.as_ref().map_or_else(|| e.code.to_string(), |m| m.to_string()))
                    .unwrap_or_default();
                (camel_case(&field), message)
            })
            .collect();
        ApiError::validation_error("Validation failed", Some(field_errors))
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<UpdateError> for ApiError {
    fn from(err: UpdateError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<Unauthorized> for ApiError {
    fn from(err: Unauthorized) -> Self {
        ApiError::unauthorized(err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed | TokenError::Expired | TokenError::Tampered => {
                ApiError::from(Unauthorized)
            }
            TokenError::TokenGeneration(_) | TokenError::InvalidSecret => {
                tracing::error!("Token error: {}", err);
                ApiError::internal_server_error("Failed to issue token")
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Duplicate(msg) => ApiError::bad_request(msg),
            DatabaseError::InvalidCredentials => {
                ApiError::unauthorized(DatabaseError::InvalidCredentials.to_string())
            }
            DatabaseError::InvalidData(msg) => ApiError::bad_request(msg),
            DatabaseError::InvalidUpdate(e) => e.into(),
            DatabaseError::InvalidFilter(e) => e.into(),
            DatabaseError::Password(e) => e.into(),
            DatabaseError::Sqlx(e) => e.into(),
        }
    }
}

/// SQLSTATE codes for values the column types reject.
const BAD_VALUE_CODES: &[&str] = &["22P02", "42804", "22003", "22001"];

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let bad_value = db_err
                    .code()
                    .is_some_and(|code| BAD_VALUE_CODES.iter().any(|c| *c == code));
                match db_err.kind() {
                    ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation => ApiError::bad_request(format!("Invalid data: {}", db_err.message())),
                    _ if bad_value => ApiError::bad_request(format!("Invalid data: {}", db_err.message())),
                    _ => {
                        // Log the real error but return generic message
                        tracing::error!("Database error: {}", db_err);
                        ApiError::internal_server_error("Database error occurred")
                    }
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                tracing::error!("Database unavailable: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            _ => {
                tracing::error!("SQLx error: {}", err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::validation_error(e.body_text(), None),
            JsonRejection::JsonSyntaxError(e) => ApiError::invalid_json(e.body_text()),
            other => ApiError::bad_request(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_errors_are_bad_requests() {
        let err = ApiError::from(DatabaseError::from(FilterError::NegativeBound("minSalary".into())));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "minSalary must be >= 0");
    }

    #[test]
    fn duplicates_are_bad_requests() {
        let err = ApiError::from(DatabaseError::Duplicate("Duplicate company: c1".into()));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_json()["message"], "Duplicate company: c1");
    }

    #[test]
    fn not_found_keeps_message() {
        let err = ApiError::from(DatabaseError::NotFound("No job: 0".into()));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "No job: 0");
    }

    #[test]
    fn bad_login_is_unauthorized() {
        let err = ApiError::from(DatabaseError::InvalidCredentials);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Invalid username/password");
    }

    #[test]
    fn token_failures_look_alike() {
        for token_err in [TokenError::Malformed, TokenError::Expired, TokenError::Tampered] {
            let err = ApiError::from(token_err);
            assert_eq!(err.status_code(), 401);
            assert_eq!(err.message(), "Unauthorized");
        }
    }

    #[test]
    fn field_errors_in_body() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "email",
            validator::ValidationError::new("email").with_message("must be an email address".into()),
        );
        errors.add("first_name", validator::ValidationError::new("length"));
        let body = ApiError::from(errors).to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["email"], "must be an email address");
        assert_eq!(body["field_errors"]["firstName"], "length");
    }

    #[test]
    fn pool_timeout_is_unavailable() {
        assert_eq!(ApiError::from(sqlx::Error::PoolTimedOut).status_code(), 503);
    }
}
