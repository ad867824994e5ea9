use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::reported;
use crate::controllers::audit_log_controller::AuditLogController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::models::audit_log::{AuditLog, AuditLogFilters};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_audit_log_router() -> Router<AppState> {
    Router::new().route("/", get(list_audit_logs))
}

async fn list_audit_logs(
    State(state): State<AppState>,
    Query(filters): Query<AuditLogFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<AuditLog>>>, AppError> {
    let controller = AuditLogController::new(state.pool.clone());
    let response = controller
        .list(filters)
        .await
        .map_err(|e| reported(&state, "Failed to load audit logs", e))?;
    Ok(Json(ApiResponse::success(response)))
}
