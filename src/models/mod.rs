//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL, más los registros derivados del reporte de compliance.

pub mod audit_log;
pub mod chart;
pub mod compliance;
pub mod emission_test;
pub mod office;
pub mod test_schedule;
pub mod user;
pub mod vehicle;
