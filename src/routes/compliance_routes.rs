use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::{csv_response, reported};
use crate::controllers::compliance_controller::ComplianceController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::models::chart::ChartDataset;
use crate::models::compliance::{
    ComplianceQuery, ComplianceSummary, OfficeCompliance, OfficeComplianceDetail, PeriodQuery,
};
use crate::services::notification_service::report_info;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_compliance_router() -> Router<AppState> {
    Router::new()
        .route("/", get(compliance_report))
        .route("/summary", get(compliance_summary))
        .route("/charts", get(compliance_charts))
        .route("/export.csv", get(export_compliance))
        .route("/offices/:id", get(office_compliance_detail))
}

async fn compliance_report(
    State(state): State<AppState>,
    Query(query): Query<ComplianceQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<OfficeCompliance>>>, AppError> {
    let controller = ComplianceController::new(state.compliance.clone());
    let response = controller
        .report(query)
        .await
        .map_err(|e| reported(&state, "Failed to load compliance report", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn compliance_summary(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<ComplianceSummary>>, AppError> {
    let controller = ComplianceController::new(state.compliance.clone());
    let response = controller
        .summary(query)
        .await
        .map_err(|e| reported(&state, "Failed to load compliance summary", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn compliance_charts(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<Vec<ChartDataset>>>, AppError> {
    let controller = ComplianceController::new(state.compliance.clone());
    let response = controller
        .charts(query)
        .await
        .map_err(|e| reported(&state, "Failed to load compliance charts", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn office_compliance_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<OfficeComplianceDetail>>, AppError> {
    let controller = ComplianceController::new(state.compliance.clone());
    let response = controller
        .office_detail(id, query)
        .await
        .map_err(|e| reported(&state, "Failed to load office compliance", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn export_compliance(
    State(state): State<AppState>,
    Query(query): Query<ComplianceQuery>,
) -> Result<Response, AppError> {
    let controller = ComplianceController::new(state.compliance.clone());
    let (filename, body) = controller
        .export_csv(query)
        .await
        .map_err(|e| reported(&state, "Failed to export compliance report", e))?;
    report_info(
        state.notifier.as_ref(),
        "Compliance report exported",
        format!("{} ({} bytes)", filename, body.len()),
    );
    Ok(csv_response(&filename, body))
}
