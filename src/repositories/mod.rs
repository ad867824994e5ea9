pub mod audit_log_repository;
pub mod emission_test_repository;
pub mod office_repository;
pub mod test_schedule_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use audit_log_repository::AuditLogRepository;
pub use emission_test_repository::EmissionTestRepository;
pub use office_repository::OfficeRepository;
pub use test_schedule_repository::TestScheduleRepository;
pub use user_repository::UserRepository;
pub use vehicle_repository::VehicleRepository;

/// Patrón `%texto%` para ILIKE con los comodines del usuario escapados.
/// Devuelve `None` si la búsqueda está vacía.
pub(crate) fn contains_pattern(search: Option<&str>) -> Option<String> {
    let term = search?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}
