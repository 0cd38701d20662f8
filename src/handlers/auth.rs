// handlers/auth.rs - POST /auth/token and POST /auth/register

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/**
 * POST /auth/token - Exchange credentials for a JWT
 *
 * Expected Input:
 * ```json
 * { "username": "string", "password": "string" }
 * ```
 *
 * Unknown usernames and wrong passwords both answer 401
 * "Invalid username/password".
 */
pub async fn token_post(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(request) = payload?;
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation_error("username and password are required", None));
    }

    let user = user_service::authenticate(&state.pool, &state.hasher, &request.username, &request.password).await?;
    let token = state.tokens.issue(&user.username, user.is_admin)?;
    tracing::info!("Issued token for {}", user.username);

    Ok(ApiResponse::success(TokenResponse { token }))
}

/**
 * POST /auth/register - Create a regular (non-admin) account and log it in
 *
 * Expected Input:
 * ```json
 * {
 *   "username": "string",   // 1-25 chars
 *   "password": "string",   // 5-20 chars
 *   "firstName": "string",
 *   "lastName": "string",
 *   "email": "string"
 * }
 * ```
 */
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(new_user) = payload?;
    if new_user.is_admin {
        let mut errors = ValidationErrors::new();
        errors.add(
            "is_admin",
            ValidationError::new("not_allowed").with_message("cannot be set on registration".into()),
        );
        return Err(errors.into());
    }
    new_user.validate()?;

    let user = user_service::register(&state.pool, &state.hasher, &new_user).await?;
    let token = state.tokens.issue(&user.username, user.is_admin)?;
    tracing::info!("Registered user {}", user.username);

    Ok(ApiResponse::created(TokenResponse { token }))
}
