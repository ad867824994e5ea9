use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, PaginatedResponse, Pagination};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::audit_log::{AuditAction, AuditEntity};
use crate::models::emission_test::EmissionTest;
use crate::models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest, VehicleFilters, VehicleWithOffice};
use crate::repositories::{EmissionTestRepository, OfficeRepository, VehicleRepository};
use crate::services::audit_service::AuditService;
use crate::utils::errors::{bad_request_error, validation_error, AppError};
use crate::utils::validation::{normalize_identifier, validate_year_acquired};

pub struct VehicleController {
    repository: VehicleRepository,
    offices: OfficeRepository,
    tests: EmissionTestRepository,
    audit: AuditService,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool.clone()),
            offices: OfficeRepository::new(pool.clone()),
            tests: EmissionTestRepository::new(pool.clone()),
            audit: AuditService::new(pool),
        }
    }

    async fn ensure_office_exists(&self, office_id: Uuid) -> Result<(), AppError> {
        if self.offices.find_by_id(office_id).await?.is_none() {
            return Err(bad_request_error("The selected office does not exist"));
        }
        Ok(())
    }

    async fn ensure_identifiers_free(
        &self,
        plate_number: &Option<String>,
        chassis_number: &Option<String>,
        registration_number: &Option<String>,
        exclude_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        let plate = normalize_identifier(plate_number.clone());
        let chassis = normalize_identifier(chassis_number.clone());
        let registration = normalize_identifier(registration_number.clone());
        if plate.is_none() && chassis.is_none() && registration.is_none() {
            return Ok(());
        }

        if self
            .repository
            .identifier_exists(plate.as_deref(), chassis.as_deref(), registration.as_deref(), exclude_id)
            .await?
        {
            return Err(AppError::Conflict(
                "Another vehicle already uses this plate, chassis or registration number".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<VehicleWithOffice>, AppError> {
        request.validate()?;
        if !request.has_identifier() {
            return Err(validation_error(
                "plate_number",
                "At least one of plate_number, chassis_number or registration_number is required",
            ));
        }
        if let Some(year) = request.year_acquired {
            validate_year_acquired(year)?;
        }

        self.ensure_office_exists(request.office_id).await?;
        self.ensure_identifiers_free(
            &request.plate_number,
            &request.chassis_number,
            &request.registration_number,
            None,
        )
        .await?;

        let vehicle = self.repository.create(request).await?;
        self.audit
            .record(
                Some(actor),
                AuditAction::Create,
                AuditEntity::Vehicle,
                Some(vehicle.id),
                Some(json!({ "identifier": vehicle.display_identifier(), "office_id": vehicle.office_id })),
            )
            .await;

        log::info!("🚗 Vehículo registrado: {}", vehicle.display_identifier());
        let created = self.get_by_id(vehicle.id).await?;
        Ok(ApiResponse::success_with_message(created, "Vehicle created successfully"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<VehicleWithOffice, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
    }

    pub async fn list(&self, filters: VehicleFilters) -> Result<PaginatedResponse<VehicleWithOffice>, AppError> {
        let pagination = Pagination::new(filters.page, filters.per_page);
        let (vehicles, total) = futures::try_join!(
            self.repository.list(&filters, pagination.limit(), pagination.offset()),
            self.repository.count(&filters),
        )?;

        Ok(PaginatedResponse::new(vehicles, total, pagination))
    }

    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<VehicleWithOffice>, AppError> {
        request.validate()?;
        if let Some(year) = request.year_acquired {
            validate_year_acquired(year)?;
        }
        if let Some(office_id) = request.office_id {
            self.ensure_office_exists(office_id).await?;
        }
        self.ensure_identifiers_free(
            &request.plate_number,
            &request.chassis_number,
            &request.registration_number,
            Some(id),
        )
        .await?;

        let vehicle = self.repository.update(id, request).await?;
        self.audit
            .record(
                Some(actor),
                AuditAction::Update,
                AuditEntity::Vehicle,
                Some(vehicle.id),
                Some(json!({ "identifier": vehicle.display_identifier() })),
            )
            .await;

        let updated = self.get_by_id(vehicle.id).await?;
        Ok(ApiResponse::success_with_message(updated, "Vehicle updated successfully"))
    }

    /// Eliminar un vehículo junto con su historial de pruebas
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.repository.delete(id).await?;
        self.audit
            .record(Some(actor), AuditAction::Delete, AuditEntity::Vehicle, Some(id), None)
            .await;

        Ok(ApiResponse::message("Vehicle deleted successfully"))
    }

    pub async fn emission_tests(&self, id: Uuid) -> Result<Vec<EmissionTest>, AppError> {
        self.get_by_id(id).await?;
        self.tests.list_for_vehicle(id).await
    }
}
