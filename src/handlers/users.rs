// handlers/users.rs - /users handlers
//
// Collection routes are admin-only; per-user routes allow the user named in
// the path or an admin.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::database::models::NewUser;
use crate::database::UpdateSpec;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service;
use crate::state::AppState;

/**
 * POST /users - Admin creates an account (possibly another admin)
 *
 * Unlike /auth/register this accepts `isAdmin`, and returns both the new
 * user and a token for it.
 */
pub async fn user_create(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(new_user) = payload?;
    new_user.validate()?;

    let user = user_service::register(&state.pool, &state.hasher, &new_user).await?;
    let token = state.tokens.issue(&user.username, user.is_admin)?;
    tracing::info!("Admin created user {} (admin: {})", user.username, user.is_admin);

    Ok(ApiResponse::created(json!({ "user": user, "token": token })))
}

pub async fn user_list(State(state): State<AppState>) -> ApiResult<Value> {
    let users = user_service::find_all(&state.pool).await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// GET /users/:username - user with the ids of jobs applied to
pub async fn user_get(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Value> {
    let user = user_service::get(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// PATCH /users/:username - any of firstName, lastName, email, password
pub async fn user_update(
    State(state): State<AppState>,
    Path(username): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    let changes = UpdateSpec::from_json(body)?;

    let user = user_service::update(&state.pool, &state.hasher, &username, &changes).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

pub async fn user_delete(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Value> {
    user_service::remove(&state.pool, &username).await?;
    tracing::info!("Deleted user {}", username);
    Ok(ApiResponse::success(json!({ "deleted": username })))
}

/// POST /users/:username/jobs/:id
pub async fn user_apply(
    State(state): State<AppState>,
    path: Result<Path<(String, i32)>, PathRejection>,
) -> ApiResult<Value> {
    let Path((username, job_id)) = path?;
    user_service::apply_to_job(&state.pool, &username, job_id).await?;
    tracing::info!("{} applied to job {}", username, job_id);
    Ok(ApiResponse::success(json!({ "applied": job_id })))
}
