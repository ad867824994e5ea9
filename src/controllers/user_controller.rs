use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, PaginatedResponse, Pagination};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::audit_log::{AuditAction, AuditEntity};
use crate::models::user::{CreateUserRequest, UpdateUserRequest, UserFilters, UserResponse};
use crate::repositories::user_repository::UserChanges;
use crate::repositories::UserRepository;
use crate::services::audit_service::AuditService;
use crate::services::auth_service::hash_password;
use crate::utils::errors::{conflict_error, forbidden_error, AppError};

pub struct UserController {
    repository: UserRepository,
    audit: AuditService,
}

impl UserController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            audit: AuditService::new(pool),
        }
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CreateUserRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        request.validate()?;

        if self.repository.email_exists(&request.email).await? {
            return Err(conflict_error("User", "email", request.email.trim()));
        }

        let password_hash = hash_password(request.password).await?;
        let user = self
            .repository
            .create(&request.email, &request.full_name, &password_hash, request.role)
            .await?;

        self.audit
            .record(
                Some(actor),
                AuditAction::Create,
                AuditEntity::User,
                Some(user.id),
                Some(json!({ "email": user.email, "role": user.role })),
            )
            .await;

        log::info!("👤 Usuario creado: {} ({})", user.email, user.role);
        Ok(ApiResponse::success_with_message(user.into(), "User created successfully"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn list(&self, filters: UserFilters) -> Result<PaginatedResponse<UserResponse>, AppError> {
        let pagination = Pagination::new(filters.page, filters.per_page);
        let (users, total) = futures::try_join!(
            self.repository.list(&filters, pagination.limit(), pagination.offset()),
            self.repository.count(&filters),
        )?;

        let items = users.into_iter().map(UserResponse::from).collect();
        Ok(PaginatedResponse::new(items, total, pagination))
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        request.validate()?;

        if let Some(email) = request.email.as_deref() {
            if let Some(existing) = self.repository.find_by_email(email).await? {
                if existing.id != id {
                    return Err(conflict_error("User", "email", email.trim()));
                }
            }
        }

        let password_hash = match request.password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };
        let password_changed = password_hash.is_some();

        let user = self
            .repository
            .update(
                id,
                UserChanges {
                    email: request.email,
                    full_name: request.full_name,
                    password_hash,
                    role: request.role,
                    is_active: request.is_active,
                },
            )
            .await?;

        self.audit
            .record(
                Some(actor),
                AuditAction::Update,
                AuditEntity::User,
                Some(user.id),
                Some(json!({
                    "role": user.role,
                    "is_active": user.is_active,
                    "password_changed": password_changed,
                })),
            )
            .await;

        Ok(ApiResponse::success_with_message(user.into(), "User updated successfully"))
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        if actor.user_id == id {
            return Err(forbidden_error("delete user", "you cannot delete your own account"));
        }

        self.repository.delete(id).await?;
        self.audit
            .record(Some(actor), AuditAction::Delete, AuditEntity::User, Some(id), None)
            .await;

        Ok(ApiResponse::message("User deleted successfully"))
    }
}
