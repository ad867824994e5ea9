//! Modelo de Office
//!
//! Una oficina es el departamento administrativo dueño de una flota de vehículos.
//! Los campos de compliance no se guardan aquí: se calculan en cada consulta.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_not_empty, validate_phone};

/// Office principal - mapea exactamente a la tabla offices
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Office {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request para crear una nueva oficina
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOfficeRequest {
    #[validate(length(min = 2, max = 150), custom = "validate_not_empty")]
    pub name: String,

    #[validate(length(max = 500))]
    pub address: Option<String>,

    #[validate(custom = "validate_phone")]
    pub contact_number: Option<String>,
}

/// Request para actualizar una oficina existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOfficeRequest {
    #[validate(length(min = 2, max = 150), custom = "validate_not_empty")]
    pub name: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,

    #[validate(custom = "validate_phone")]
    pub contact_number: Option<String>,
}

/// Filtros para búsqueda de oficinas
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfficeFilters {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
