//! Fuentes de datos del reporte de compliance
//!
//! El agregador no sabe de dónde vienen oficinas, vehículos y pruebas. En
//! producción se leen de PostgreSQL; en tests se usa la fuente en memoria.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::compliance::ComplianceTestFilters;
use crate::models::emission_test::EmissionTest;
use crate::models::office::Office;
use crate::models::vehicle::VehicleWithOffice;
use crate::repositories::{EmissionTestRepository, OfficeRepository, VehicleRepository};
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait ComplianceDataSource: Send + Sync {
    async fn list_offices(&self) -> AppResult<Vec<Office>>;

    /// Vehículos, opcionalmente de una sola oficina
    async fn list_vehicles(&self, office_id: Option<Uuid>) -> AppResult<Vec<VehicleWithOffice>>;

    /// Pruebas del periodo, opcionalmente de una sola oficina
    async fn list_emission_tests(&self, filters: &ComplianceTestFilters) -> AppResult<Vec<EmissionTest>>;
}

/// Fuente respaldada por los repositorios de PostgreSQL
pub struct PgComplianceSource {
    offices: OfficeRepository,
    vehicles: VehicleRepository,
    tests: EmissionTestRepository,
}

impl PgComplianceSource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            offices: OfficeRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            tests: EmissionTestRepository::new(pool),
        }
    }
}

#[async_trait]
impl ComplianceDataSource for PgComplianceSource {
    async fn list_offices(&self) -> AppResult<Vec<Office>> {
        self.offices.list_all().await
    }

    async fn list_vehicles(&self, office_id: Option<Uuid>) -> AppResult<Vec<VehicleWithOffice>> {
        self.vehicles.list_all(office_id).await
    }

    async fn list_emission_tests(&self, filters: &ComplianceTestFilters) -> AppResult<Vec<EmissionTest>> {
        self.tests.list_for_period(filters).await
    }
}

#[derive(Debug, Default)]
struct InMemoryData {
    offices: Vec<Office>,
    vehicles: Vec<VehicleWithOffice>,
    tests: Vec<EmissionTest>,
}

/// Fuente en memoria, útil para tests y demos sin base de datos
#[derive(Debug, Clone, Default)]
pub struct InMemoryComplianceSource {
    data: Arc<RwLock<InMemoryData>>,
}

impl InMemoryComplianceSource {
    pub fn new(offices: Vec<Office>, vehicles: Vec<VehicleWithOffice>, tests: Vec<EmissionTest>) -> Self {
        Self {
            data: Arc::new(RwLock::new(InMemoryData {
                offices,
                vehicles,
                tests,
            })),
        }
    }

    pub fn add_test(&self, test: EmissionTest) -> AppResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| AppError::Internal("Compliance data lock poisoned".to_string()))?;
        data.tests.push(test);
        Ok(())
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, InMemoryData>> {
        self.data
            .read()
            .map_err(|_| AppError::Internal("Compliance data lock poisoned".to_string()))
    }
}

#[async_trait]
impl ComplianceDataSource for InMemoryComplianceSource {
    async fn list_offices(&self) -> AppResult<Vec<Office>> {
        let mut offices = self.read()?.offices.clone();
        offices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(offices)
    }

    async fn list_vehicles(&self, office_id: Option<Uuid>) -> AppResult<Vec<VehicleWithOffice>> {
        Ok(self
            .read()?
            .vehicles
            .iter()
            .filter(|v| office_id.map_or(true, |id| v.vehicle.office_id == id))
            .cloned()
            .collect())
    }

    async fn list_emission_tests(&self, filters: &ComplianceTestFilters) -> AppResult<Vec<EmissionTest>> {
        let data = self.read()?;
        let in_office = |vehicle_id: Uuid| match filters.office_id {
            None => true,
            Some(office_id) => data
                .vehicles
                .iter()
                .any(|v| v.vehicle.id == vehicle_id && v.vehicle.office_id == office_id),
        };

        Ok(data
            .tests
            .iter()
            .filter(|t| filters.period.contains(t) && in_office(t.vehicle_id))
            .cloned()
            .collect())
    }
}
