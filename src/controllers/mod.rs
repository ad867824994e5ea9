//! Controllers
//!
//! Cada controller agrupa las operaciones de un recurso: valida la request,
//! llama a los repositorios o servicios y registra la auditoría.

pub mod audit_log_controller;
pub mod auth_controller;
pub mod compliance_controller;
pub mod emission_test_controller;
pub mod office_controller;
pub mod test_schedule_controller;
pub mod user_controller;
pub mod vehicle_controller;
