pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::middleware::{authenticate_jwt, ensure_admin, ensure_self_or_admin};
use crate::state::AppState;

/// Builds the full router. Every request first passes `authenticate_jwt`;
/// per-route access checks are route layers.
pub fn app(state: AppState) -> Router {
    let config = config::config();

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        .fallback(not_found);

    router = router.layer(from_fn_with_state(state.clone(), authenticate_jwt));
    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/token", post(auth::token_post))
        .route("/auth/register", post(auth::register_post))
}

fn company_routes() -> Router<AppState> {
    use handlers::companies;

    let admin = Router::new()
        .route("/companies", post(companies::company_create))
        .route(
            "/companies/:handle",
            axum::routing::patch(companies::company_update).delete(companies::company_delete),
        )
        .route_layer(from_fn(ensure_admin));

    Router::new()
        .route("/companies", get(companies::company_list))
        .route("/companies/:handle", get(companies::company_get))
        .merge(admin)
}

fn job_routes() -> Router<AppState> {
    use handlers::jobs;

    let admin = Router::new()
        .route("/jobs", post(jobs::job_create))
        .route("/jobs/:id", axum::routing::patch(jobs::job_update).delete(jobs::job_delete))
        .route_layer(from_fn(ensure_admin));

    Router::new()
        .route("/jobs", get(jobs::job_list))
        .route("/jobs/:id", get(jobs::job_get))
        .merge(admin)
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    let admin = Router::new()
        .route("/users", get(users::user_list).post(users::user_create))
        .route_layer(from_fn(ensure_admin));

    let self_or_admin = Router::new()
        .route(
            "/users/:username",
            get(users::user_get).patch(users::user_update).delete(users::user_delete),
        )
        .route("/users/:username/jobs/:id", post(users::user_apply))
        .route_layer(from_fn(ensure_self_or_admin));

    admin.merge(self_or_admin)
}
