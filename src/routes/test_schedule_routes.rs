use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use super::{csv_response, reported};
use crate::controllers::test_schedule_controller::TestScheduleController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::test_schedule::{
    CreateTestScheduleRequest, TestSchedule, TestScheduleFilters, UpdateTestScheduleRequest,
};
use crate::services::notification_service::report_info;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_test_schedule_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/export.csv", get(export_schedules))
        .route("/:id", get(get_schedule).put(update_schedule).delete(delete_schedule))
}

async fn create_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateTestScheduleRequest>,
) -> Result<Json<ApiResponse<TestSchedule>>, AppError> {
    user.require_record_manager()?;
    let controller = TestScheduleController::new(state.pool.clone());
    let response = controller
        .create(&user, request)
        .await
        .map_err(|e| reported(&state, "Failed to create test schedule", e))?;
    Ok(Json(response))
}

async fn list_schedules(
    State(state): State<AppState>,
    Query(filters): Query<TestScheduleFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<TestSchedule>>>, AppError> {
    let controller = TestScheduleController::new(state.pool.clone());
    let response = controller
        .list(filters)
        .await
        .map_err(|e| reported(&state, "Failed to load test schedules", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn export_schedules(
    State(state): State<AppState>,
    Query(filters): Query<TestScheduleFilters>,
) -> Result<Response, AppError> {
    let controller = TestScheduleController::new(state.pool.clone());
    let filename = match (filters.year, filters.quarter) {
        (Some(year), Some(quarter)) => format!("test-schedules-{}-q{}.csv", year, quarter),
        (Some(year), None) => format!("test-schedules-{}.csv", year),
        _ => "test-schedules.csv".to_string(),
    };
    let body = controller
        .export_csv(filters)
        .await
        .map_err(|e| reported(&state, "Failed to export test schedules", e))?;
    report_info(
        state.notifier.as_ref(),
        "Test schedules exported",
        format!("{} ({} bytes)", filename, body.len()),
    );
    Ok(csv_response(&filename, body))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TestSchedule>>, AppError> {
    let controller = TestScheduleController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTestScheduleRequest>,
) -> Result<Json<ApiResponse<TestSchedule>>, AppError> {
    user.require_record_manager()?;
    let controller = TestScheduleController::new(state.pool.clone());
    let response = controller
        .update(&user, id, request)
        .await
        .map_err(|e| reported(&state, "Failed to update test schedule", e))?;
    Ok(Json(response))
}

async fn delete_schedule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_record_manager()?;
    let controller = TestScheduleController::new(state.pool.clone());
    let response = controller
        .delete(&user, id)
        .await
        .map_err(|e| reported(&state, "Failed to delete test schedule", e))?;
    Ok(Json(response))
}
