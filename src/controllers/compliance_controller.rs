use uuid::Uuid;

use crate::dto::common_dto::PaginatedResponse;
use crate::models::chart::ChartDataset;
use crate::models::compliance::{
    ComplianceQuery, ComplianceSummary, OfficeCompliance, OfficeComplianceDetail, PeriodQuery,
};
use crate::services::compliance_service::ComplianceService;
use crate::services::csv_export::export_compliance_csv;
use crate::utils::errors::AppError;

pub struct ComplianceController {
    service: ComplianceService,
}

impl ComplianceController {
    pub fn new(service: ComplianceService) -> Self {
        Self { service }
    }

    pub async fn report(&self, query: ComplianceQuery) -> Result<PaginatedResponse<OfficeCompliance>, AppError> {
        self.service.report(&query).await
    }

    pub async fn summary(&self, query: PeriodQuery) -> Result<ComplianceSummary, AppError> {
        let period = ComplianceService::resolve_period(query.year, query.quarter)?;
        self.service.summary(period, query.search.as_deref()).await
    }

    pub async fn charts(&self, query: PeriodQuery) -> Result<Vec<ChartDataset>, AppError> {
        let period = ComplianceService::resolve_period(query.year, query.quarter)?;
        self.service.charts(period).await
    }

    pub async fn office_detail(&self, office_id: Uuid, query: PeriodQuery) -> Result<OfficeComplianceDetail, AppError> {
        let period = ComplianceService::resolve_period(query.year, query.quarter)?;
        self.service
            .office_detail(office_id, period, query.search.as_deref())
            .await
    }

    /// Nombre de archivo y contenido del CSV
    pub async fn export_csv(&self, query: ComplianceQuery) -> Result<(String, String), AppError> {
        let (period, records) = self.service.export_rows(&query).await?;
        let filename = match period.quarter {
            Some(quarter) => format!("compliance-{}-q{}.csv", period.year, quarter),
            None => format!("compliance-{}.csv", period.year),
        };
        Ok((filename, export_compliance_csv(period, &records)?))
    }
}
