use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::emission_test::{
    EmissionTest, EmissionTestFilters, EmissionTestWithVehicle, LatestTestQuery, LatestVehicleTest,
};
use crate::models::compliance::ComplianceTestFilters;
use crate::utils::errors::{map_db_error, AppError};

const SELECT_WITH_VEHICLE: &str = r#"
    SELECT t.*, v.plate_number, v.driver_name, v.office_id, o.name AS office_name
    FROM emission_tests t
    JOIN vehicles v ON v.id = t.vehicle_id
    JOIN offices o ON o.id = v.office_id
    WHERE 1=1
"#;

/// Campos de una prueba listos para insertar o actualizar
#[derive(Debug, Clone)]
pub struct EmissionTestRecord {
    pub vehicle_id: Uuid,
    pub test_date: NaiveDate,
    pub quarter: i32,
    pub year: i32,
    pub result: bool,
}

pub struct EmissionTestRepository {
    pool: PgPool,
}

impl EmissionTestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, record: EmissionTestRecord, created_by: Option<Uuid>) -> Result<EmissionTest, AppError> {
        let now = Utc::now();
        let test = sqlx::query_as::<_, EmissionTest>(
            r#"
            INSERT INTO emission_tests (id, vehicle_id, test_date, quarter, year, result, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(record.vehicle_id)
        .bind(record.test_date)
        .bind(record.quarter)
        .bind(record.year)
        .bind(record.result)
        .bind(created_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Emission test"))?;

        Ok(test)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EmissionTest>, AppError> {
        let test = sqlx::query_as::<_, EmissionTest>("SELECT * FROM emission_tests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(test)
    }

    pub async fn list(
        &self,
        filters: &EmissionTestFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EmissionTestWithVehicle>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_WITH_VEHICLE);
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY t.test_date DESC, t.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let tests = qb
            .build_query_as::<EmissionTestWithVehicle>()
            .fetch_all(&self.pool)
            .await?;
        Ok(tests)
    }

    pub async fn count(&self, filters: &EmissionTestFilters) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT COUNT(*)
            FROM emission_tests t
            JOIN vehicles v ON v.id = t.vehicle_id
            JOIN offices o ON o.id = v.office_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut qb, filters);

        let (total,) = qb.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    /// Historial completo de un vehículo, del más reciente al más antiguo
    pub async fn list_for_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<EmissionTest>, AppError> {
        let tests = sqlx::query_as::<_, EmissionTest>(
            "SELECT * FROM emission_tests WHERE vehicle_id = $1 ORDER BY test_date DESC, created_at DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tests)
    }

    /// Pruebas del periodo, opcionalmente limitadas a una oficina
    pub async fn list_for_period(&self, filters: &ComplianceTestFilters) -> Result<Vec<EmissionTest>, AppError> {
        let tests = sqlx::query_as::<_, EmissionTest>(
            r#"
            SELECT t.*
            FROM emission_tests t
            JOIN vehicles v ON v.id = t.vehicle_id
            WHERE t.year = $1
            AND ($2::int IS NULL OR t.quarter = $2)
            AND ($3::uuid IS NULL OR v.office_id = $3)
            ORDER BY t.test_date DESC, t.created_at DESC
            "#,
        )
        .bind(filters.period.year)
        .bind(filters.period.quarter)
        .bind(filters.office_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tests)
    }

    /// Última prueba de cada vehículo en el periodo
    pub async fn latest_for_vehicles(&self, query: &LatestTestQuery) -> Result<Vec<LatestVehicleTest>, AppError> {
        let latest = sqlx::query_as::<_, LatestVehicleTest>(
            r#"
            SELECT v.id AS vehicle_id, v.plate_number, v.office_id,
                   lt.id AS test_id, lt.test_date, lt.result
            FROM vehicles v
            JOIN LATERAL (
                SELECT et.id, et.test_date, et.result
                FROM emission_tests et
                WHERE et.vehicle_id = v.id
                AND et.year = $1
                AND ($2::int IS NULL OR et.quarter = $2)
                ORDER BY et.test_date DESC, et.created_at DESC, et.id DESC
                LIMIT 1
            ) lt ON TRUE
            WHERE ($3::uuid IS NULL OR v.office_id = $3)
            ORDER BY v.plate_number ASC NULLS LAST
            "#,
        )
        .bind(query.year)
        .bind(query.quarter)
        .bind(query.office_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(latest)
    }

    pub async fn update(&self, id: Uuid, record: EmissionTestRecord) -> Result<EmissionTest, AppError> {
        let test = sqlx::query_as::<_, EmissionTest>(
            r#"
            UPDATE emission_tests
            SET vehicle_id = $2, test_date = $3, quarter = $4, year = $5, result = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(record.vehicle_id)
        .bind(record.test_date)
        .bind(record.quarter)
        .bind(record.year)
        .bind(record.result)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Emission test"))?
        .ok_or_else(|| AppError::NotFound("Emission test not found".to_string()))?;

        Ok(test)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM emission_tests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Emission test not found".to_string()));
        }

        Ok(())
    }
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filters: &EmissionTestFilters) {
    if let Some(year) = filters.year {
        qb.push(" AND t.year = ").push_bind(year);
    }
    if let Some(quarter) = filters.quarter {
        qb.push(" AND t.quarter = ").push_bind(quarter);
    }
    if let Some(vehicle_id) = filters.vehicle_id {
        qb.push(" AND t.vehicle_id = ").push_bind(vehicle_id);
    }
    if let Some(office_id) = filters.office_id {
        qb.push(" AND v.office_id = ").push_bind(office_id);
    }
    if let Some(office_name) = filters.office_name.as_deref().filter(|n| !n.trim().is_empty()) {
        qb.push(" AND o.name = ").push_bind(office_name.trim().to_string());
    }
    if let Some(result) = filters.result {
        qb.push(" AND t.result = ").push_bind(result);
    }
}
