use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use super::reported;
use crate::controllers::office_controller::OfficeController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::office::{CreateOfficeRequest, Office, OfficeFilters, UpdateOfficeRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_office_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_offices).post(create_office))
        .route("/:id", get(get_office).put(update_office).delete(delete_office))
}

async fn create_office(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateOfficeRequest>,
) -> Result<Json<ApiResponse<Office>>, AppError> {
    user.require_admin()?;
    let controller = OfficeController::new(state.pool.clone());
    let response = controller
        .create(&user, request)
        .await
        .map_err(|e| reported(&state, "Failed to create office", e))?;
    Ok(Json(response))
}

async fn list_offices(
    State(state): State<AppState>,
    Query(filters): Query<OfficeFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<Office>>>, AppError> {
    let controller = OfficeController::new(state.pool.clone());
    let response = controller
        .list(filters)
        .await
        .map_err(|e| reported(&state, "Failed to load offices", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_office(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Office>>, AppError> {
    let controller = OfficeController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_office(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOfficeRequest>,
) -> Result<Json<ApiResponse<Office>>, AppError> {
    user.require_admin()?;
    let controller = OfficeController::new(state.pool.clone());
    let response = controller
        .update(&user, id, request)
        .await
        .map_err(|e| reported(&state, "Failed to update office", e))?;
    Ok(Json(response))
}

async fn delete_office(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    user.require_admin()?;
    let controller = OfficeController::new(state.pool.clone());
    let response = controller
        .delete(&user, id)
        .await
        .map_err(|e| reported(&state, "Failed to delete office", e))?;
    Ok(Json(response))
}
