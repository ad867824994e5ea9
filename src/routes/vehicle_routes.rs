use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use super::reported;
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::emission_test::EmissionTest;
use crate::models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters, VehicleWithOffice};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/:id", get(get_vehicle).put(update_vehicle).delete(delete_vehicle))
        .route("/:id/emission-tests", get(list_vehicle_tests))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleWithOffice>>, AppError> {
    user.require_record_manager()?;
    let controller = VehicleController::new(state.pool.clone());
    let response = controller
        .create(&user, request)
        .await
        .map_err(|e| reported(&state, "Failed to register vehicle", e))?;
    Ok(Json(response))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<VehicleWithOffice>>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller
        .list(filters)
        .await
        .map_err(|e| reported(&state, "Failed to load vehicles", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VehicleWithOffice>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleWithOffice>>, AppError> {
    user.require_record_manager()?;
    let controller = VehicleController::new(state.pool.clone());
    let response = controller
        .update(&user, id, request)
        .await
        .map_err(|e| reported(&state, "Failed to update vehicle", e))?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_record_manager()?;
    let controller = VehicleController::new(state.pool.clone());
    let response = controller
        .delete(&user, id)
        .await
        .map_err(|e| reported(&state, "Failed to delete vehicle", e))?;
    Ok(Json(response))
}

async fn list_vehicle_tests(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<EmissionTest>>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.emission_tests(id).await?;
    Ok(Json(ApiResponse::success(response)))
}
