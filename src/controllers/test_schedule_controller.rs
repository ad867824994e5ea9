use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, PaginatedResponse, Pagination};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::audit_log::{AuditAction, AuditEntity};
use crate::models::test_schedule::{
    CreateTestScheduleRequest, TestSchedule, TestScheduleFilters, UpdateTestScheduleRequest,
};
use crate::repositories::TestScheduleRepository;
use crate::services::audit_service::AuditService;
use crate::services::csv_export::export_schedules_csv;
use crate::utils::errors::AppError;
use crate::utils::validation::validate_quarter;

pub struct TestScheduleController {
    repository: TestScheduleRepository,
    audit: AuditService,
}

impl TestScheduleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: TestScheduleRepository::new(pool.clone()),
            audit: AuditService::new(pool),
        }
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CreateTestScheduleRequest,
    ) -> Result<ApiResponse<TestSchedule>, AppError> {
        request.validate()?;

        let schedule = self.repository.create(request).await?;
        self.audit
            .record(
                Some(actor),
                AuditAction::Create,
                AuditEntity::TestSchedule,
                Some(schedule.id),
                Some(json!({ "year": schedule.year, "quarter": schedule.quarter })),
            )
            .await;

        Ok(ApiResponse::success_with_message(schedule, "Test schedule created successfully"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TestSchedule, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test schedule not found".to_string()))
    }

    pub async fn list(&self, filters: TestScheduleFilters) -> Result<PaginatedResponse<TestSchedule>, AppError> {
        if let Some(quarter) = filters.quarter {
            validate_quarter(quarter)?;
        }
        let pagination = Pagination::new(filters.page, filters.per_page);
        let (schedules, total) = futures::try_join!(
            self.repository.list(&filters, Some(pagination.limit()), pagination.offset()),
            self.repository.count(&filters),
        )?;

        Ok(PaginatedResponse::new(schedules, total, pagination))
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdateTestScheduleRequest,
    ) -> Result<ApiResponse<TestSchedule>, AppError> {
        request.validate()?;

        let schedule = self.repository.update(id, request).await?;
        self.audit
            .record(
                Some(actor),
                AuditAction::Update,
                AuditEntity::TestSchedule,
                Some(schedule.id),
                Some(json!({ "year": schedule.year, "quarter": schedule.quarter })),
            )
            .await;

        Ok(ApiResponse::success_with_message(schedule, "Test schedule updated successfully"))
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.repository.delete(id).await?;
        self.audit
            .record(Some(actor), AuditAction::Delete, AuditEntity::TestSchedule, Some(id), None)
            .await;

        Ok(ApiResponse::message("Test schedule deleted successfully"))
    }

    /// CSV con todos los calendarios que cumplen los filtros (sin paginar)
    pub async fn export_csv(&self, filters: TestScheduleFilters) -> Result<String, AppError> {
        if let Some(quarter) = filters.quarter {
            validate_quarter(quarter)?;
        }
        let schedules = self.repository.list(&filters, None, 0).await?;
        log::info!("📄 Exportando {} calendarios a CSV", schedules.len());
        export_schedules_csv(&schedules)
    }
}
