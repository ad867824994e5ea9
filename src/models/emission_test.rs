//! Modelo de EmissionTest
//!
//! Cada prueba se crea una vez por evento de prueba y forma un historial
//! inmutable por vehículo (sin versionado).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// EmissionTest principal - mapea exactamente a la tabla emission_tests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct EmissionTest {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub test_date: NaiveDate,
    pub quarter: i32,
    pub year: i32,
    pub result: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Prueba con los datos del vehículo y la oficina para listados
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmissionTestWithVehicle {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub test: EmissionTest,
    pub plate_number: Option<String>,
    pub driver_name: String,
    pub office_id: Uuid,
    pub office_name: String,
}

/// Última prueba de un vehículo en el periodo (JOIN LATERAL)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LatestVehicleTest {
    pub vehicle_id: Uuid,
    pub plate_number: Option<String>,
    pub office_id: Uuid,
    pub test_id: Uuid,
    pub test_date: NaiveDate,
    pub result: bool,
}

/// Request para registrar una prueba.
///
/// Si `quarter` o `year` se omiten se derivan de `test_date`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmissionTestRequest {
    pub vehicle_id: Uuid,
    pub test_date: NaiveDate,

    #[validate(range(min = 1, max = 4))]
    pub quarter: Option<i32>,

    #[validate(range(min = 2000, max = 2100))]
    pub year: Option<i32>,

    pub result: bool,
}

/// Request para actualizar una prueba existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmissionTestRequest {
    pub vehicle_id: Option<Uuid>,
    pub test_date: Option<NaiveDate>,

    #[validate(range(min = 1, max = 4))]
    pub quarter: Option<i32>,

    #[validate(range(min = 2000, max = 2100))]
    pub year: Option<i32>,

    pub result: Option<bool>,
}

/// Filtros para búsqueda de pruebas
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmissionTestFilters {
    pub year: Option<i32>,
    pub quarter: Option<i32>,
    pub vehicle_id: Option<Uuid>,
    pub office_id: Option<Uuid>,
    pub office_name: Option<String>,
    pub result: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Filtros para consultar la última prueba por vehículo
#[derive(Debug, Clone, Deserialize)]
pub struct LatestTestQuery {
    pub year: i32,
    pub quarter: Option<i32>,
    pub office_id: Option<Uuid>,
}
