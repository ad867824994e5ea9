use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use super::reported;
use crate::controllers::user_controller::UserController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{CreateUserRequest, UpdateUserRequest, UserFilters, UserResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de gestión de usuarios; el router de la app les aplica `admin_only_middleware`
pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone());
    let response = controller
        .create(&user, request)
        .await
        .map_err(|e| reported(&state, "Failed to create user", e))?;
    Ok(Json(response))
}

async fn list_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilters>,
) -> Result<Json<ApiResponse<PaginatedResponse<UserResponse>>>, AppError> {
    let controller = UserController::new(state.pool.clone());
    let response = controller
        .list(filters)
        .await
        .map_err(|e| reported(&state, "Failed to load users", e))?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let controller = UserController::new(state.pool.clone());
    let response = controller
        .update(&user, id, request)
        .await
        .map_err(|e| reported(&state, "Failed to update user", e))?;
    Ok(Json(response))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = UserController::new(state.pool.clone());
    let response = controller
        .delete(&user, id)
        .await
        .map_err(|e| reported(&state, "Failed to delete user", e))?;
    Ok(Json(response))
}
