use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::contains_pattern;
use crate::models::office::{CreateOfficeRequest, Office, OfficeFilters, UpdateOfficeRequest};
use crate::utils::errors::{map_db_error, AppError};

pub struct OfficeRepository {
    pool: PgPool,
}

impl OfficeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateOfficeRequest) -> Result<Office, AppError> {
        let now = Utc::now();
        let office = sqlx::query_as::<_, Office>(
            r#"
            INSERT INTO offices (id, name, address, contact_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.name.trim())
        .bind(request.address)
        .bind(request.contact_number)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Office"))?;

        Ok(office)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Office>, AppError> {
        let office = sqlx::query_as::<_, Office>("SELECT * FROM offices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(office)
    }

    pub async fn name_exists(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM offices WHERE LOWER(name) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name.trim())
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    /// Todas las oficinas ordenadas por nombre
    pub async fn list_all(&self) -> Result<Vec<Office>, AppError> {
        let offices = sqlx::query_as::<_, Office>("SELECT * FROM offices ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(offices)
    }

    pub async fn list(&self, filters: &OfficeFilters, limit: i64, offset: i64) -> Result<Vec<Office>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM offices WHERE 1=1");
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY name ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let offices = qb.build_query_as::<Office>().fetch_all(&self.pool).await?;
        Ok(offices)
    }

    pub async fn count(&self, filters: &OfficeFilters) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM offices WHERE 1=1");
        push_filters(&mut qb, filters);

        let (total,) = qb.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn update(&self, id: Uuid, request: UpdateOfficeRequest) -> Result<Office, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Office not found".to_string()))?;

        let office = sqlx::query_as::<_, Office>(
            r#"
            UPDATE offices
            SET name = $2, address = $3, contact_number = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.name.map(|n| n.trim().to_string()).unwrap_or(current.name))
        .bind(request.address.or(current.address))
        .bind(request.contact_number.or(current.contact_number))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Office"))?;

        Ok(office)
    }

    /// Eliminar una oficina. Falla con `BadRequest` si todavía tiene vehículos.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM offices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Office"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Office not found".to_string()));
        }

        Ok(())
    }
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filters: &OfficeFilters) {
    if let Some(pattern) = contains_pattern(filters.search.as_deref()) {
        qb.push(" AND name ILIKE ").push_bind(pattern);
    }
}
