use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use super::reported;
use crate::controllers::emission_test_controller::EmissionTestController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::emission_test::{
    CreateEmissionTestRequest, EmissionTest, EmissionTestFilters, EmissionTestWithVehicle, LatestTestQuery,
    LatestVehicleTest, UpdateEmissionTestRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_emission_test_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tests).post(create_test))
        .route("/latest", get(latest_tests))
        .route("/:id", get(get_test).put(update_test).delete(delete_test))
}

async fn create_test(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateEmissionTestRequest>,
) -> Result<Json<ApiResponse<EmissionTest>>, AppError> {
    user.require_record_manager()?;
    let controller = EmissionTestController::new(state.pool.clone());
    let response = controller
        .create(&user, request)
        .await
        .map_err(|e| reported(&state, "Failed to record emission test", e))?;
    Ok(Json(response))
}

async fn list_tests(
    State(state): State<AppState>,
    Query(filters): Query<EmissionTestFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<EmissionTestWithVehicle>>>, AppError> {
    let controller = EmissionTestController::new(state.pool.clone());
    let response = controller
        .list(filters)
        .await
        .map_err(|e| reported(&state, "Failed to load emission tests", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn latest_tests(
    State(state): State<AppState>,
    Query(query): Query<LatestTestQuery>,
) -> Result<Json<ApiResponse<Vec<LatestVehicleTest>>>, AppError> {
    let controller = EmissionTestController::new(state.pool.clone());
    let response = controller
        .latest(query)
        .await
        .map_err(|e| reported(&state, "Failed to load latest emission tests", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmissionTest>>, AppError> {
    let controller = EmissionTestController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_test(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEmissionTestRequest>,
) -> Result<Json<ApiResponse<EmissionTest>>, AppError> {
    user.require_record_manager()?;
    let controller = EmissionTestController::new(state.pool.clone());
    let response = controller
        .update(&user, id, request)
        .await
        .map_err(|e| reported(&state, "Failed to update emission test", e))?;
    Ok(Json(response))
}

async fn delete_test(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_record_manager()?;
    let controller = EmissionTestController::new(state.pool.clone());
    let response = controller
        .delete(&user, id)
        .await
        .map_err(|e| reported(&state, "Failed to delete emission test", e))?;
    Ok(Json(response))
}
