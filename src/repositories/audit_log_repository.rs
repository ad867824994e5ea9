use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::audit_log::{AuditLog, AuditLogFilters, NewAuditLog};
use crate::utils::errors::AppError;

pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: NewAuditLog) -> Result<AuditLog, AppError> {
        let log = sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_logs (id, user_id, user_email, action, entity_type, entity_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.user_email)
        .bind(entry.action.as_str())
        .bind(entry.entity.as_str())
        .bind(entry.entity_id)
        .bind(entry.details)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    pub async fn list(&self, filters: &AuditLogFilters, limit: i64, offset: i64) -> Result<Vec<AuditLog>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM audit_logs WHERE 1=1");
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let logs = qb.build_query_as::<AuditLog>().fetch_all(&self.pool).await?;
        Ok(logs)
    }

    pub async fn count(&self, filters: &AuditLogFilters) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_logs WHERE 1=1");
        push_filters(&mut qb, filters);

        let (total,) = qb.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;
        Ok(total)
    }
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filters: &AuditLogFilters) {
    if let Some(entity_type) = filters.entity_type.as_deref().filter(|e| !e.is_empty()) {
        qb.push(" AND entity_type = ").push_bind(entity_type.to_string());
    }
    if let Some(action) = filters.action.as_deref().filter(|a| !a.is_empty()) {
        qb.push(" AND action = ").push_bind(action.to_string());
    }
    if let Some(user_id) = filters.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
}
