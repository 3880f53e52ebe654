// ABOUTME: HTTP API layer for OKRDesk providing REST endpoints and routing
// ABOUTME: Integration layer that wires every domain package behind /api

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::{AllowHeaders, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub mod auth;
pub mod auth_handlers;
pub mod departments_handlers;
pub mod error;
pub mod extract;
pub mod kpis_handlers;
pub mod objectives_handlers;
pub mod pagination;
pub mod reports_handlers;
pub mod response;
pub mod state;
pub mod tasks_handlers;
pub mod users_handlers;

pub use error::{ApiResult, AppError};
pub use response::ApiResponse;
pub use state::DbState;

/// Creates the authentication router
pub fn create_auth_router() -> Router<DbState> {
    Router::new()
        .route("/login", post(auth_handlers::login))
        .route("/logout", post(auth_handlers::logout))
        .route("/me", get(auth_handlers::me))
}

/// Creates the users API router
pub fn create_users_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(users_handlers::list_users).post(users_handlers::create_user),
        )
        .route(
            "/{id}",
            get(users_handlers::get_user)
                .put(users_handlers::update_user)
                .delete(users_handlers::delete_user),
        )
}

/// Creates the departments API router
pub fn create_departments_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(departments_handlers::list_departments)
                .post(departments_handlers::create_department),
        )
        .route(
            "/{id}",
            get(departments_handlers::get_department)
                .put(departments_handlers::update_department)
                .delete(departments_handlers::delete_department),
        )
}

/// Creates the objectives API router, including key results and the approval workflow
pub fn create_objectives_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(objectives_handlers::list_objectives).post(objectives_handlers::create_objective),
        )
        .route(
            "/{id}",
            get(objectives_handlers::get_objective)
                .put(objectives_handlers::update_objective)
                .delete(objectives_handlers::delete_objective),
        )
        .route("/{id}/submit", post(objectives_handlers::submit_objective))
        .route("/{id}/approve", post(objectives_handlers::approve_objective))
        .route("/{id}/reject", post(objectives_handlers::reject_objective))
        .route("/{id}/status", put(objectives_handlers::update_objective_status))
        .route("/{id}/key-results", post(objectives_handlers::add_key_result))
        .route(
            "/{id}/key-results/{key_result_id}",
            put(objectives_handlers::update_key_result)
                .delete(objectives_handlers::remove_key_result),
        )
}

/// Creates the tasks API router
pub fn create_tasks_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(tasks_handlers::list_tasks).post(tasks_handlers::create_task),
        )
        .route(
            "/{task_id}",
            get(tasks_handlers::get_task)
                .put(tasks_handlers::update_task)
                .delete(tasks_handlers::delete_task),
        )
}

/// Creates the KPIs API router
pub fn create_kpis_router() -> Router<DbState> {
    Router::new()
        .route("/", get(kpis_handlers::list_kpis).post(kpis_handlers::create_kpi))
        .route(
            "/{id}",
            get(kpis_handlers::get_kpi)
                .put(kpis_handlers::update_kpi)
                .delete(kpis_handlers::delete_kpi),
        )
}

/// Creates the reports API router
pub fn create_reports_router() -> Router<DbState> {
    Router::new().route("/summary", get(reports_handlers::summary))
}

async fn health(State(db): State<DbState>) -> impl IntoResponse {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&db.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            "unavailable"
        }
    };

    Json(ApiResponse::success(serde_json::json!({
        "status": "ok",
        "service": "okrdesk",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    })))
}

async fn not_found() -> AppError {
    AppError::NotFound("Route".to_string())
}

fn cors_layer(cors_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    match HeaderValue::from_str(cors_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!("Ignoring invalid CORS origin '{}'", cors_origin);
            layer
        }
    }
}

/// Full application router with every API route under `/api`
pub fn create_router(state: DbState, cors_origin: &str) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", create_auth_router())
        .nest("/users", create_users_router())
        .nest("/departments", create_departments_router())
        .nest("/objectives", create_objectives_router())
        .nest("/tasks", create_tasks_router())
        .nest("/kpis", create_kpis_router())
        .nest("/reports", create_reports_router());

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .with_state(state)
}
