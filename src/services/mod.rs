//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: el cálculo de
//! compliance, autenticación, auditoría, exportación CSV y notificaciones.

pub mod audit_service;
pub mod auth_service;
pub mod compliance_aggregator;
pub mod compliance_service;
pub mod compliance_source;
pub mod csv_export;
pub mod notification_service;
pub mod vehicle_search;

pub use compliance_service::ComplianceService;
pub use compliance_source::{ComplianceDataSource, InMemoryComplianceSource, PgComplianceSource};
pub use notification_service::{LogNotificationService, MemoryNotificationService, NotificationService};
