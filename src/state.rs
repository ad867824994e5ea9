//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::services::compliance_service::ComplianceService;
use crate::services::compliance_source::{ComplianceDataSource, PgComplianceSource};
use crate::services::notification_service::{LogNotificationService, NotificationService};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<EnvironmentConfig>,
    pub jwt: JwtConfig,
    pub compliance: ComplianceService,
    pub notifier: Arc<dyn NotificationService>,
    pub rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let source: Arc<dyn ComplianceDataSource> = Arc::new(PgComplianceSource::new(pool.clone()));
        Self {
            jwt: JwtConfig::from(&config),
            compliance: ComplianceService::new(source, config.compliance_threshold),
            notifier: Arc::new(LogNotificationService),
            rate_limit: RateLimitState::from_config(&config),
            config: Arc::new(config),
            pool,
        }
    }

    /// Reemplazar la fuente de datos del reporte de compliance
    pub fn with_compliance_source(mut self, source: Arc<dyn ComplianceDataSource>) -> Self {
        self.compliance = ComplianceService::new(source, self.config.compliance_threshold);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationService>) -> Self {
        self.notifier = notifier;
        self
    }
}
