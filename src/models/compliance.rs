//! Modelos de Compliance
//!
//! Registros derivados del reporte de compliance por oficina. Nada de esto se
//! persiste: se recalcula en cada consulta a partir de vehículos y pruebas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::emission_test::EmissionTest;
use super::vehicle::VehicleWithOffice;

/// Texto mostrado cuando una oficina no tiene vehículos probados
pub const NO_DATA: &str = "No Data";

/// Periodo de reporte: un año y opcionalmente un trimestre
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompliancePeriod {
    pub year: i32,
    pub quarter: Option<i32>,
}

impl CompliancePeriod {
    pub fn new(year: i32, quarter: Option<i32>) -> Self {
        Self { year, quarter }
    }

    /// Indica si una prueba cae dentro del periodo
    pub fn contains(&self, test: &EmissionTest) -> bool {
        test.year == self.year && self.quarter.map_or(true, |q| test.quarter == q)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    NoData,
}

/// Registro de compliance de una oficina para un periodo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfficeCompliance {
    pub office_id: Uuid,
    pub office_name: String,
    pub total_vehicles: i64,
    pub tested_vehicles: i64,
    pub compliant_vehicles: i64,
    /// Porcentaje entero; `None` cuando no hay vehículos probados
    pub compliance_rate: Option<i64>,
    pub compliance_display: String,
    pub status: ComplianceStatus,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceSortKey {
    #[default]
    Name,
    TotalVehicles,
    TestedVehicles,
    CompliantVehicles,
    ComplianceRate,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query del listado de compliance
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplianceQuery {
    pub year: Option<i32>,
    pub quarter: Option<i32>,
    pub search: Option<String>,
    pub sort_by: Option<ComplianceSortKey>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Query de resumen, gráficas y detalle de oficina
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub quarter: Option<i32>,
    pub search: Option<String>,
}

/// Resumen para el dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceSummary {
    pub period: CompliancePeriod,
    pub total_offices: i64,
    pub offices_with_data: i64,
    pub compliant_offices: i64,
    pub total_vehicles: i64,
    pub tested_vehicles: i64,
    pub compliant_vehicles: i64,
    /// Σcompliant / Σtested sobre todos los vehículos
    pub overall_compliance_rate: Option<i64>,
    /// Oficinas compliant / oficinas con datos
    pub office_compliance_rate: Option<i64>,
}

/// Historial de pruebas de un vehículo en el periodo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleTestHistory {
    #[serde(flatten)]
    pub vehicle: VehicleWithOffice,
    pub latest_result: Option<bool>,
    pub tests: Vec<EmissionTest>,
}

/// Vista de detalle de una oficina
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeComplianceDetail {
    pub period: CompliancePeriod,
    pub compliance: OfficeCompliance,
    pub vehicles: Vec<VehicleTestHistory>,
}

/// Filtros que el agregador pide a la fuente de datos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplianceTestFilters {
    pub period: CompliancePeriod,
    pub office_id: Option<Uuid>,
}
