//! Servicio de compliance
//!
//! Carga oficinas, vehículos y pruebas desde la fuente de datos (en paralelo)
//! y delega el cálculo en `compliance_aggregator`.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::dto::common_dto::{PaginatedResponse, Pagination};
use crate::middleware::metrics::observe_compliance_report;
use crate::models::chart::ChartDataset;
use crate::models::compliance::{
    CompliancePeriod, ComplianceQuery, ComplianceSummary, ComplianceTestFilters, OfficeCompliance,
    OfficeComplianceDetail,
};
use crate::models::emission_test::EmissionTest;
use crate::models::office::Office;
use crate::models::vehicle::VehicleWithOffice;
use crate::services::compliance_aggregator as aggregator;
use crate::services::compliance_source::ComplianceDataSource;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{validate_quarter, validate_report_year};

type Snapshot = (Vec<Office>, Vec<VehicleWithOffice>, Vec<EmissionTest>);

#[derive(Clone)]
pub struct ComplianceService {
    source: Arc<dyn ComplianceDataSource>,
    threshold: i64,
}

impl ComplianceService {
    pub fn new(source: Arc<dyn ComplianceDataSource>, threshold: i64) -> Self {
        Self { source, threshold }
    }

    /// Resolver el periodo pedido; sin año se usa el año en curso
    pub fn resolve_period(year: Option<i32>, quarter: Option<i32>) -> AppResult<CompliancePeriod> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        validate_report_year(year)?;
        if let Some(quarter) = quarter {
            validate_quarter(quarter)?;
        }
        Ok(CompliancePeriod::new(year, quarter))
    }

    async fn load(&self, filters: ComplianceTestFilters) -> AppResult<Snapshot> {
        futures::try_join!(
            self.source.list_offices(),
            self.source.list_vehicles(filters.office_id),
            self.source.list_emission_tests(&filters),
        )
    }

    /// Registros de todas las oficinas con vehículos, ordenados por nombre
    pub async fn office_compliance(&self, period: CompliancePeriod) -> AppResult<Vec<OfficeCompliance>> {
        let (offices, vehicles, tests) = self
            .load(ComplianceTestFilters {
                period,
                office_id: None,
            })
            .await?;

        Ok(aggregator::aggregate_office_compliance(
            &offices,
            &vehicles,
            &tests,
            &period,
            self.threshold,
        ))
    }

    /// Listado filtrado, ordenado y paginado
    pub async fn report(&self, query: &ComplianceQuery) -> AppResult<PaginatedResponse<OfficeCompliance>> {
        let started = Instant::now();
        let period = Self::resolve_period(query.year, query.quarter)?;

        let records = self.office_compliance(period).await?;
        let mut records = aggregator::filter_by_office_name(records, query.search.as_deref());
        aggregator::sort_records(
            &mut records,
            query.sort_by.unwrap_or_default(),
            query.sort_order.unwrap_or_default(),
        );

        let pagination = Pagination::new(query.page, query.per_page);
        let total = records.len() as i64;
        let page = PaginatedResponse::new(pagination.slice(&records), total, pagination);

        observe_compliance_report("report", started);
        log::info!(
            "📊 Compliance {}{}: {} oficinas",
            period.year,
            period.quarter.map(|q| format!(" Q{}", q)).unwrap_or_default(),
            total
        );
        Ok(page)
    }

    pub async fn summary(&self, period: CompliancePeriod, search: Option<&str>) -> AppResult<ComplianceSummary> {
        let started = Instant::now();
        let records = self.office_compliance(period).await?;
        let records = aggregator::filter_by_office_name(records, search);
        observe_compliance_report("summary", started);
        Ok(aggregator::summarize(&records, period))
    }

    /// Gráficas del dashboard; la línea trimestral necesita el año completo
    pub async fn charts(&self, period: CompliancePeriod) -> AppResult<Vec<ChartDataset>> {
        let started = Instant::now();
        let (offices, vehicles, tests) = self
            .load(ComplianceTestFilters {
                period: CompliancePeriod::new(period.year, None),
                office_id: None,
            })
            .await?;

        observe_compliance_report("charts", started);
        Ok(aggregator::build_chart_datasets(
            &offices,
            &vehicles,
            &tests,
            period,
            self.threshold,
        ))
    }

    pub async fn office_detail(
        &self,
        office_id: Uuid,
        period: CompliancePeriod,
        search: Option<&str>,
    ) -> AppResult<OfficeComplianceDetail> {
        let started = Instant::now();
        let (offices, vehicles, tests) = self
            .load(ComplianceTestFilters {
                period,
                office_id: Some(office_id),
            })
            .await?;

        let office = offices
            .iter()
            .find(|o| o.id == office_id)
            .ok_or_else(|| AppError::NotFound("Office not found".to_string()))?;

        observe_compliance_report("office_detail", started);
        Ok(aggregator::build_office_detail(
            office,
            &vehicles,
            &tests,
            period,
            self.threshold,
            search.unwrap_or(""),
        ))
    }

    /// Filas para exportar: mismo orden y filtro que el listado, sin paginar
    pub async fn export_rows(&self, query: &ComplianceQuery) -> AppResult<(CompliancePeriod, Vec<OfficeCompliance>)> {
        let started = Instant::now();
        let period = Self::resolve_period(query.year, query.quarter)?;
        let records = self.office_compliance(period).await?;
        let mut records = aggregator::filter_by_office_name(records, query.search.as_deref());
        aggregator::sort_records(
            &mut records,
            query.sort_by.unwrap_or_default(),
            query.sort_order.unwrap_or_default(),
        );
        observe_compliance_report("export", started);
        Ok((period, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_period() {
        let period = ComplianceService::resolve_period(Some(2025), Some(2)).unwrap();
        assert_eq!(period, CompliancePeriod::new(2025, Some(2)));

        let current = ComplianceService::resolve_period(None, None).unwrap();
        assert_eq!(current.year, Utc::now().year());
        assert_eq!(current.quarter, None);

        assert!(ComplianceService::resolve_period(Some(2025), Some(5)).is_err());
        assert!(ComplianceService::resolve_period(Some(1999), None).is_err());
    }
}
