//! Modelo de TestSchedule
//!
//! Agrupa administrativamente las pruebas de un trimestre: personal asignado,
//! lugar y fecha de realización. No participa en el cálculo de compliance.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_not_empty;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TestSchedule {
    pub id: Uuid,
    pub year: i32,
    pub quarter: i32,
    pub assigned_personnel: String,
    pub location: String,
    pub conducted_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestScheduleRequest {
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,

    #[validate(range(min = 1, max = 4))]
    pub quarter: i32,

    #[validate(length(min = 2, max = 255), custom = "validate_not_empty")]
    pub assigned_personnel: String,

    #[validate(length(min = 2, max = 255), custom = "validate_not_empty")]
    pub location: String,

    pub conducted_on: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTestScheduleRequest {
    #[validate(range(min = 2000, max = 2100))]
    pub year: Option<i32>,

    #[validate(range(min = 1, max = 4))]
    pub quarter: Option<i32>,

    #[validate(length(min = 2, max = 255), custom = "validate_not_empty")]
    pub assigned_personnel: Option<String>,

    #[validate(length(min = 2, max = 255), custom = "validate_not_empty")]
    pub location: Option<String>,

    pub conducted_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestScheduleFilters {
    pub year: Option<i32>,
    pub quarter: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
