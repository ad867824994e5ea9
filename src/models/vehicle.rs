//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_not_empty, validate_plate_number};

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate_number: Option<String>,
    pub chassis_number: Option<String>,
    pub registration_number: Option<String>,
    pub driver_name: String,
    pub office_id: Uuid,
    pub vehicle_type: String,
    pub engine_type: String,
    pub wheels: i32,
    pub year_acquired: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Identificador a mostrar: placa, luego chasis, luego registro
    pub fn display_identifier(&self) -> &str {
        self.plate_number
            .as_deref()
            .or(self.chassis_number.as_deref())
            .or(self.registration_number.as_deref())
            .unwrap_or("")
    }
}

/// Vehicle junto con el nombre de su oficina (JOIN con offices)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct VehicleWithOffice {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub office_name: String,
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(custom = "validate_plate_number")]
    pub plate_number: Option<String>,

    #[validate(length(min = 5, max = 50))]
    pub chassis_number: Option<String>,

    #[validate(length(min = 5, max = 50))]
    pub registration_number: Option<String>,

    #[validate(length(min = 2, max = 150), custom = "validate_not_empty")]
    pub driver_name: String,

    pub office_id: Uuid,

    #[validate(length(min = 2, max = 50))]
    pub vehicle_type: String,

    #[validate(length(min = 2, max = 50))]
    pub engine_type: String,

    #[validate(range(min = 2, max = 18))]
    pub wheels: i32,

    pub year_acquired: Option<i32>,
}

impl CreateVehicleRequest {
    /// Al menos uno de placa, chasis o registro es obligatorio
    pub fn has_identifier(&self) -> bool {
        [&self.plate_number, &self.chassis_number, &self.registration_number]
            .iter()
            .any(|id| id.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false))
    }
}

/// Request para actualizar un vehículo existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(custom = "validate_plate_number")]
    pub plate_number: Option<String>,

    #[validate(length(min = 5, max = 50))]
    pub chassis_number: Option<String>,

    #[validate(length(min = 5, max = 50))]
    pub registration_number: Option<String>,

    #[validate(length(min = 2, max = 150), custom = "validate_not_empty")]
    pub driver_name: Option<String>,

    pub office_id: Option<Uuid>,

    #[validate(length(min = 2, max = 50))]
    pub vehicle_type: Option<String>,

    #[validate(length(min = 2, max = 50))]
    pub engine_type: Option<String>,

    #[validate(range(min = 2, max = 18))]
    pub wheels: Option<i32>,

    pub year_acquired: Option<i32>,
}

/// Filtros para búsqueda de vehículos
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFilters {
    pub office_id: Option<Uuid>,
    pub vehicle_type: Option<String>,
    pub engine_type: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateVehicleRequest {
        CreateVehicleRequest {
            plate_number: None,
            chassis_number: None,
            registration_number: None,
            driver_name: "Juan Dela Cruz".to_string(),
            office_id: Uuid::new_v4(),
            vehicle_type: "Sedan".to_string(),
            engine_type: "Gasoline".to_string(),
            wheels: 4,
            year_acquired: Some(2019),
        }
    }

    #[test]
    fn test_has_identifier() {
        let mut req = request();
        assert!(!req.has_identifier());

        req.chassis_number = Some("   ".to_string());
        assert!(!req.has_identifier());

        req.registration_number = Some("REG-2019-001".to_string());
        assert!(req.has_identifier());
    }

    #[test]
    fn test_create_request_validation() {
        let mut req = request();
        req.plate_number = Some("ABC 1234".to_string());
        assert!(req.validate().is_ok());

        req.wheels = 1;
        assert!(req.validate().is_err());
    }
}
