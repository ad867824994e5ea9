use sqlx::PgPool;

use crate::dto::common_dto::{PaginatedResponse, Pagination};
use crate::models::audit_log::{AuditLog, AuditLogFilters};
use crate::repositories::AuditLogRepository;
use crate::utils::errors::AppError;

pub struct AuditLogController {
    repository: AuditLogRepository,
}

impl AuditLogController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: AuditLogRepository::new(pool),
        }
    }

    pub async fn list(&self, filters: AuditLogFilters) -> Result<PaginatedResponse<AuditLog>, AppError> {
        let pagination = Pagination::new(filters.page, filters.per_page);
        let (logs, total) = futures::try_join!(
            self.repository.list(&filters, pagination.limit(), pagination.offset()),
            self.repository.count(&filters),
        )?;

        Ok(PaginatedResponse::new(logs, total, pagination))
    }
}
