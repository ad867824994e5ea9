use serde_json::json;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::dto::common_dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::audit_log::{AuditAction, AuditEntity};
use crate::models::user::UserResponse;
use crate::repositories::UserRepository;
use crate::services::audit_service::AuditService;
use crate::services::auth_service::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AuthController {
    service: AuthService,
    users: UserRepository,
    audit: AuditService,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: AuthService::new(state.pool.clone(), state.jwt.clone()),
            users: UserRepository::new(state.pool.clone()),
            audit: AuditService::new(state.pool.clone()),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<ApiResponse<LoginResponse>, AppError> {
        request.validate()?;

        let (user, response) = self.service.login(&request).await?;
        let actor = AuthenticatedUser {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        };
        self.audit
            .record(
                Some(&actor),
                AuditAction::Login,
                AuditEntity::User,
                Some(user.id),
                Some(json!({ "role": user.role })),
            )
            .await;

        Ok(ApiResponse::success_with_message(response, "Login successful"))
    }

    /// Usuario actual; un token de un usuario eliminado o inactivo ya no sirve aquí
    pub async fn me(&self, actor: &AuthenticatedUser) -> Result<UserResponse, AppError> {
        let user = self
            .users
            .find_by_id(actor.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado o inactivo".to_string()))?;

        Ok(user.into())
    }
}
