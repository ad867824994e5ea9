//! Routers de la API
//!
//! Cada recurso expone `create_*_router()`; aquí se montan bajo `/api` con la
//! autenticación, el rate limiting y las capas HTTP comunes.

pub mod audit_log_routes;
pub mod auth_routes;
pub mod compliance_routes;
pub mod emission_test_routes;
pub mod office_routes;
pub mod test_schedule_routes;
pub mod user_routes;
pub mod vehicle_routes;

use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::database::ping;
use crate::middleware::{
    admin_only_middleware, auth_middleware, cors_layer, metrics, metrics_middleware, rate_limit_middleware,
};
use crate::services::notification_service::report_error;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Registrar un error terminal en el notificador y devolverlo
pub(crate) fn reported(state: &AppState, title: &str, error: AppError) -> AppError {
    report_error(state.notifier.as_ref(), title, &error);
    error
}

/// Respuesta de descarga CSV
pub(crate) fn csv_response(filename: &str, body: String) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8"));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

/// Router completo de la aplicación
pub fn create_app_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .nest("/users", user_routes::create_user_router())
        .nest("/audit-logs", audit_log_routes::create_audit_log_router())
        .route_layer(from_fn(admin_only_middleware));

    let api = Router::new()
        .nest("/offices", office_routes::create_office_router())
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/emission-tests", emission_test_routes::create_emission_test_router())
        .nest("/emission-test-schedules", test_schedule_routes::create_test_schedule_router())
        .nest("/compliance", compliance_routes::create_compliance_router())
        .route("/auth/me", get(auth_routes::me))
        .merge(admin_routes)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
        // login queda fuera de auth_middleware
        .merge(auth_routes::create_auth_router())
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .nest("/api", api)
        .route_layer(from_fn(metrics_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs)))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
    }))
}

/// Listo para recibir tráfico solo si la base de datos responde
async fn readiness_check(State(state): State<AppState>) -> Response {
    match ping(&state.pool).await {
        Ok(()) => Json(json!({ "status": "ready", "database": "ok" })).into_response(),
        Err(e) => {
            tracing::warn!("⚠️ Readiness check falló: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "database": "unreachable" })),
            )
                .into_response()
        }
    }
}

async fn metrics_endpoint() -> Result<Response, AppError> {
    let body = metrics::render()?;
    let mut response = body.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    Ok(response)
}
