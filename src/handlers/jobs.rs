// handlers/jobs.rs - /jobs handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::database::models::job::JOB_FILTERS;
use crate::database::models::NewJob;
use crate::database::UpdateSpec;
use crate::filter::FilterSpec;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::job_service;
use crate::state::AppState;

/// GET /jobs?title=&minSalary=&hasEquity=
pub async fn job_list(State(state): State<AppState>, Query(params): Query<Vec<(String, String)>>) -> ApiResult<Value> {
    let filters = FilterSpec::parse(JOB_FILTERS, &params)?;
    let jobs = job_service::find_all(&state.pool, &filters).await?;
    Ok(ApiResponse::success(json!({ "jobs": jobs })))
}

/// GET /jobs/:id - job with its company
pub async fn job_get(State(state): State<AppState>, id: Result<Path<i32>, PathRejection>) -> ApiResult<Value> {
    let Path(id) = id?;
    let job = job_service::get(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

pub async fn job_create(State(state): State<AppState>, payload: Result<Json<NewJob>, JsonRejection>) -> ApiResult<Value> {
    let Json(new_job) = payload?;
    new_job.validate()?;

    let job = job_service::create(&state.pool, &new_job).await?;
    tracing::info!("Created job {} for {}", job.id, job.company_handle);
    Ok(ApiResponse::created(json!({ "job": job })))
}

/// PATCH /jobs/:id - any of title, salary, equity
pub async fn job_update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Path(id) = id?;
    let Json(body) = payload?;
    let changes = UpdateSpec::from_json(body)?;

    let job = job_service::update(&state.pool, id, &changes).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

pub async fn job_delete(State(state): State<AppState>, id: Result<Path<i32>, PathRejection>) -> ApiResult<Value> {
    let Path(id) = id?;
    job_service::remove(&state.pool, id).await?;
    tracing::info!("Deleted job {}", id);
    Ok(ApiResponse::success(json!({ "deleted": id })))
}
