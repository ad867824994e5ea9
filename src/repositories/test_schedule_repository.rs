use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::test_schedule::{
    CreateTestScheduleRequest, TestSchedule, TestScheduleFilters, UpdateTestScheduleRequest,
};
use crate::utils::errors::{map_db_error, AppError};

pub struct TestScheduleRepository {
    pool: PgPool,
}

impl TestScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateTestScheduleRequest) -> Result<TestSchedule, AppError> {
        let schedule = sqlx::query_as::<_, TestSchedule>(
            r#"
            INSERT INTO emission_test_schedules (
                id, year, quarter, assigned_personnel, location, conducted_on, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.year)
        .bind(request.quarter)
        .bind(request.assigned_personnel.trim().to_string())
        .bind(request.location.trim().to_string())
        .bind(request.conducted_on)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Test schedule"))?;

        Ok(schedule)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TestSchedule>, AppError> {
        let schedule = sqlx::query_as::<_, TestSchedule>("SELECT * FROM emission_test_schedules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(schedule)
    }

    /// Listar calendarios; `limit = None` devuelve todos (exportación CSV)
    pub async fn list(
        &self,
        filters: &TestScheduleFilters,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<TestSchedule>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM emission_test_schedules WHERE 1=1");
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY year DESC, quarter DESC, conducted_on DESC");
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(offset);
        }

        let schedules = qb.build_query_as::<TestSchedule>().fetch_all(&self.pool).await?;
        Ok(schedules)
    }

    pub async fn count(&self, filters: &TestScheduleFilters) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM emission_test_schedules WHERE 1=1");
        push_filters(&mut qb, filters);

        let (total,) = qb.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn update(&self, id: Uuid, request: UpdateTestScheduleRequest) -> Result<TestSchedule, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test schedule not found".to_string()))?;

        let schedule = sqlx::query_as::<_, TestSchedule>(
            r#"
            UPDATE emission_test_schedules
            SET year = $2, quarter = $3, assigned_personnel = $4, location = $5, conducted_on = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.year.unwrap_or(current.year))
        .bind(request.quarter.unwrap_or(current.quarter))
        .bind(
            request
                .assigned_personnel
                .map(|p| p.trim().to_string())
                .unwrap_or(current.assigned_personnel),
        )
        .bind(request.location.map(|l| l.trim().to_string()).unwrap_or(current.location))
        .bind(request.conducted_on.unwrap_or(current.conducted_on))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Test schedule"))?;

        Ok(schedule)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM emission_test_schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Test schedule not found".to_string()));
        }

        Ok(())
    }
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filters: &TestScheduleFilters) {
    if let Some(year) = filters.year {
        qb.push(" AND year = ").push_bind(year);
    }
    if let Some(quarter) = filters.quarter {
        qb.push(" AND quarter = ").push_bind(quarter);
    }
}
