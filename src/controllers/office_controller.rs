use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, PaginatedResponse, Pagination};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::audit_log::{AuditAction, AuditEntity};
use crate::models::office::{CreateOfficeRequest, Office, OfficeFilters, UpdateOfficeRequest};
use crate::repositories::OfficeRepository;
use crate::services::audit_service::AuditService;
use crate::utils::errors::{conflict_error, AppError};

pub struct OfficeController {
    repository: OfficeRepository,
    audit: AuditService,
}

impl OfficeController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: OfficeRepository::new(pool.clone()),
            audit: AuditService::new(pool),
        }
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CreateOfficeRequest,
    ) -> Result<ApiResponse<Office>, AppError> {
        request.validate()?;

        let name = request.name.trim();
        if self.repository.name_exists(name, None).await? {
            return Err(conflict_error("Office", "name", name));
        }

        let office = self.repository.create(request).await?;
        self.audit
            .record(
                Some(actor),
                AuditAction::Create,
                AuditEntity::Office,
                Some(office.id),
                Some(json!({ "name": office.name })),
            )
            .await;

        log::info!("🏢 Oficina creada: {}", office.name);
        Ok(ApiResponse::success_with_message(office, "Office created successfully"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Office, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Office not found".to_string()))
    }

    pub async fn list(&self, filters: OfficeFilters) -> Result<PaginatedResponse<Office>, AppError> {
        let pagination = Pagination::new(filters.page, filters.per_page);
        let (offices, total) = futures::try_join!(
            self.repository.list(&filters, pagination.limit(), pagination.offset()),
            self.repository.count(&filters),
        )?;

        Ok(PaginatedResponse::new(offices, total, pagination))
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdateOfficeRequest,
    ) -> Result<ApiResponse<Office>, AppError> {
        request.validate()?;

        if let Some(name) = request.name.as_deref().map(str::trim) {
            if self.repository.name_exists(name, Some(id)).await? {
                return Err(conflict_error("Office", "name", name));
            }
        }

        let office = self.repository.update(id, request).await?;
        self.audit
            .record(
                Some(actor),
                AuditAction::Update,
                AuditEntity::Office,
                Some(office.id),
                Some(json!({ "name": office.name })),
            )
            .await;

        Ok(ApiResponse::success_with_message(office, "Office updated successfully"))
    }

    /// Una oficina con vehículos no se puede eliminar
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.repository.delete(id).await?;
        self.audit
            .record(Some(actor), AuditAction::Delete, AuditEntity::Office, Some(id), None)
            .await;

        Ok(ApiResponse::message("Office deleted successfully"))
    }
}
