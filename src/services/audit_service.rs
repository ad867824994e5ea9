//! Bitácora de auditoría
//!
//! Registrar una entrada nunca hace fallar la petición del usuario: si la
//! inserción falla se escribe al log y se continúa.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::auth::AuthenticatedUser;
use crate::models::audit_log::{AuditAction, AuditEntity, NewAuditLog};
use crate::repositories::AuditLogRepository;

#[derive(Clone)]
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        actor: Option<&AuthenticatedUser>,
        action: AuditAction,
        entity: AuditEntity,
        entity_id: Option<Uuid>,
        details: Option<Value>,
    ) {
        let entry = NewAuditLog {
            user_id: actor.map(|a| a.user_id),
            user_email: actor.map(|a| a.email.clone()),
            action,
            entity,
            entity_id,
            details,
        };

        if let Err(e) = AuditLogRepository::new(self.pool.clone()).insert(entry).await {
            log::error!(
                "❌ No se pudo registrar auditoría {} {}: {}",
                action.as_str(),
                entity.as_str(),
                e
            );
        }
    }
}
