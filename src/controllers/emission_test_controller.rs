use chrono::{Datelike, NaiveDate};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, PaginatedResponse, Pagination};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::audit_log::{AuditAction, AuditEntity};
use crate::models::emission_test::{
    CreateEmissionTestRequest, EmissionTest, EmissionTestFilters, EmissionTestWithVehicle, LatestTestQuery,
    LatestVehicleTest, UpdateEmissionTestRequest,
};
use crate::repositories::emission_test_repository::EmissionTestRecord;
use crate::repositories::{EmissionTestRepository, VehicleRepository};
use crate::services::audit_service::AuditService;
use crate::utils::errors::{bad_request_error, validation_error, AppError};
use crate::utils::validation::{quarter_of, validate_quarter, validate_report_year};

/// Armar el registro a guardar: trimestre y año salen de la fecha y, si se
/// envían, deben coincidir con ella.
pub fn build_record(
    vehicle_id: Uuid,
    test_date: NaiveDate,
    quarter: Option<i32>,
    year: Option<i32>,
    result: bool,
) -> Result<EmissionTestRecord, AppError> {
    let derived_quarter = quarter_of(test_date);
    let derived_year = test_date.year();

    if quarter.is_some_and(|q| q != derived_quarter) {
        return Err(validation_error("quarter", "quarter does not match test_date"));
    }
    if year.is_some_and(|y| y != derived_year) {
        return Err(validation_error("year", "year does not match test_date"));
    }
    validate_report_year(derived_year)?;

    Ok(EmissionTestRecord {
        vehicle_id,
        test_date,
        quarter: derived_quarter,
        year: derived_year,
        result,
    })
}

pub struct EmissionTestController {
    repository: EmissionTestRepository,
    vehicles: VehicleRepository,
    audit: AuditService,
}

impl EmissionTestController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: EmissionTestRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            audit: AuditService::new(pool),
        }
    }

    async fn ensure_vehicle_exists(&self, vehicle_id: Uuid) -> Result<(), AppError> {
        if self.vehicles.find_by_id(vehicle_id).await?.is_none() {
            return Err(bad_request_error("The selected vehicle does not exist"));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CreateEmissionTestRequest,
    ) -> Result<ApiResponse<EmissionTest>, AppError> {
        request.validate()?;
        let record = build_record(
            request.vehicle_id,
            request.test_date,
            request.quarter,
            request.year,
            request.result,
        )?;
        self.ensure_vehicle_exists(record.vehicle_id).await?;

        let test = self.repository.create(record, Some(actor.user_id)).await?;
        self.audit
            .record(
                Some(actor),
                AuditAction::Create,
                AuditEntity::EmissionTest,
                Some(test.id),
                Some(json!({
                    "vehicle_id": test.vehicle_id,
                    "test_date": test.test_date,
                    "result": test.result,
                })),
            )
            .await;

        log::info!(
            "🧪 Prueba registrada para vehículo {} ({} Q{}): {}",
            test.vehicle_id,
            test.year,
            test.quarter,
            if test.result { "PASSED" } else { "FAILED" }
        );
        Ok(ApiResponse::success_with_message(test, "Emission test recorded successfully"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<EmissionTest, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Emission test not found".to_string()))
    }

    pub async fn list(
        &self,
        filters: EmissionTestFilters,
    ) -> Result<PaginatedResponse<EmissionTestWithVehicle>, AppError> {
        if let Some(quarter) = filters.quarter {
            validate_quarter(quarter)?;
        }
        let pagination = Pagination::new(filters.page, filters.per_page);
        let (tests, total) = futures::try_join!(
            self.repository.list(&filters, pagination.limit(), pagination.offset()),
            self.repository.count(&filters),
        )?;

        Ok(PaginatedResponse::new(tests, total, pagination))
    }

    pub async fn latest(&self, query: LatestTestQuery) -> Result<Vec<LatestVehicleTest>, AppError> {
        validate_report_year(query.year)?;
        if let Some(quarter) = query.quarter {
            validate_quarter(quarter)?;
        }
        self.repository.latest_for_vehicles(&query).await
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdateEmissionTestRequest,
    ) -> Result<ApiResponse<EmissionTest>, AppError> {
        request.validate()?;
        let current = self.get_by_id(id).await?;

        let test_date = request.test_date.unwrap_or(current.test_date);
        // Si cambia la fecha, trimestre y año se recalculan a partir de ella
        let record = build_record(
            request.vehicle_id.unwrap_or(current.vehicle_id),
            test_date,
            request.quarter,
            request.year,
            request.result.unwrap_or(current.result),
        )?;
        if record.vehicle_id != current.vehicle_id {
            self.ensure_vehicle_exists(record.vehicle_id).await?;
        }

        let test = self.repository.update(id, record).await?;
        self.audit
            .record(
                Some(actor),
                AuditAction::Update,
                AuditEntity::EmissionTest,
                Some(test.id),
                Some(json!({ "test_date": test.test_date, "result": test.result })),
            )
            .await;

        Ok(ApiResponse::success_with_message(test, "Emission test updated successfully"))
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.repository.delete(id).await?;
        self.audit
            .record(Some(actor), AuditAction::Delete, AuditEntity::EmissionTest, Some(id), None)
            .await;

        Ok(ApiResponse::message("Emission test deleted successfully"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_build_record_derives_period() {
        let record = build_record(Uuid::new_v4(), date(2025, 8, 15), None, None, true).unwrap();
        assert_eq!((record.quarter, record.year), (3, 2025));
    }

    #[test]
    fn test_build_record_accepts_matching_period() {
        assert!(build_record(Uuid::new_v4(), date(2025, 3, 31), Some(1), Some(2025), false).is_ok());
    }

    #[test]
    fn test_build_record_rejects_mismatch() {
        let err = build_record(Uuid::new_v4(), date(2025, 4, 1), Some(1), None, true).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = build_record(Uuid::new_v4(), date(2025, 4, 1), None, Some(2024), true).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
