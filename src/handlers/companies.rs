// handlers/companies.rs - /companies handlers
//
// Reads are public; writes sit behind `ensure_admin`.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::database::models::company::COMPANY_FILTERS;
use crate::database::models::NewCompany;
use crate::database::UpdateSpec;
use crate::filter::FilterSpec;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::company_service;
use crate::state::AppState;

/// GET /companies?nameLike=&minEmployees=&maxEmployees=
pub async fn company_list(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Value> {
    let filters = FilterSpec::parse(COMPANY_FILTERS, &params)?;
    let companies = company_service::find_all(&state.pool, &filters).await?;
    Ok(ApiResponse::success(json!({ "companies": companies })))
}

/// GET /companies/:handle - company with its jobs
pub async fn company_get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    let company = company_service::get(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

pub async fn company_create(
    State(state): State<AppState>,
    payload: Result<Json<NewCompany>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(new_company) = payload?;
    new_company.validate()?;

    let company = company_service::create(&state.pool, &new_company).await?;
    tracing::info!("Created company {}", company.handle);
    Ok(ApiResponse::created(json!({ "company": company })))
}

/// PATCH /companies/:handle - any of name, description, numEmployees, logoUrl
pub async fn company_update(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = payload?;
    let changes = UpdateSpec::from_json(body)?;

    let company = company_service::update(&state.pool, &handle, &changes).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

pub async fn company_delete(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    company_service::remove(&state.pool, &handle).await?;
    tracing::info!("Deleted company {}", handle);
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}
