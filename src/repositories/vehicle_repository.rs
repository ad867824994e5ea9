use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::contains_pattern;
use crate::models::vehicle::{CreateVehicleRequest, UpdateVehicleRequest, Vehicle, VehicleFilters, VehicleWithOffice};
use crate::utils::errors::{map_db_error, AppError};
use crate::utils::validation::normalize_identifier;

const SELECT_WITH_OFFICE: &str = r#"
    SELECT v.*, o.name AS office_name
    FROM vehicles v
    JOIN offices o ON o.id = v.office_id
    WHERE 1=1
"#;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> Result<Vehicle, AppError> {
        let now = Utc::now();
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, plate_number, chassis_number, registration_number, driver_name,
                office_id, vehicle_type, engine_type, wheels, year_acquired, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(normalize_identifier(request.plate_number))
        .bind(normalize_identifier(request.chassis_number))
        .bind(normalize_identifier(request.registration_number))
        .bind(request.driver_name.trim().to_string())
        .bind(request.office_id)
        .bind(request.vehicle_type)
        .bind(request.engine_type)
        .bind(request.wheels)
        .bind(request.year_acquired)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Vehicle"))?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VehicleWithOffice>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_WITH_OFFICE);
        qb.push(" AND v.id = ").push_bind(id);

        let vehicle = qb
            .build_query_as::<VehicleWithOffice>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    /// Verificar si algún otro vehículo ya usa la placa, chasis o registro
    pub async fn identifier_exists(
        &self,
        plate_number: Option<&str>,
        chassis_number: Option<&str>,
        registration_number: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM vehicles
                WHERE ($4::uuid IS NULL OR id <> $4)
                AND (
                    ($1::text IS NOT NULL AND plate_number = $1)
                    OR ($2::text IS NOT NULL AND chassis_number = $2)
                    OR ($3::text IS NOT NULL AND registration_number = $3)
                )
            )
            "#,
        )
        .bind(plate_number)
        .bind(chassis_number)
        .bind(registration_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn list(
        &self,
        filters: &VehicleFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VehicleWithOffice>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_WITH_OFFICE);
        push_filters(&mut qb, filters);
        qb.push(" ORDER BY v.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let vehicles = qb.build_query_as::<VehicleWithOffice>().fetch_all(&self.pool).await?;
        Ok(vehicles)
    }

    pub async fn count(&self, filters: &VehicleFilters) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM vehicles v JOIN offices o ON o.id = v.office_id WHERE 1=1",
        );
        push_filters(&mut qb, filters);

        let (total,) = qb.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    /// Todos los vehículos, opcionalmente de una sola oficina, sin paginar
    pub async fn list_all(&self, office_id: Option<Uuid>) -> Result<Vec<VehicleWithOffice>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_WITH_OFFICE);
        if let Some(office_id) = office_id {
            qb.push(" AND v.office_id = ").push_bind(office_id);
        }
        qb.push(" ORDER BY o.name ASC, v.plate_number ASC NULLS LAST");

        let vehicles = qb.build_query_as::<VehicleWithOffice>().fetch_all(&self.pool).await?;
        Ok(vehicles)
    }

    pub async fn update(&self, id: Uuid, request: UpdateVehicleRequest) -> Result<Vehicle, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?
            .vehicle;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET plate_number = $2, chassis_number = $3, registration_number = $4, driver_name = $5,
                office_id = $6, vehicle_type = $7, engine_type = $8, wheels = $9, year_acquired = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(normalize_identifier(request.plate_number).or(current.plate_number))
        .bind(normalize_identifier(request.chassis_number).or(current.chassis_number))
        .bind(normalize_identifier(request.registration_number).or(current.registration_number))
        .bind(
            request
                .driver_name
                .map(|n| n.trim().to_string())
                .unwrap_or(current.driver_name),
        )
        .bind(request.office_id.unwrap_or(current.office_id))
        .bind(request.vehicle_type.unwrap_or(current.vehicle_type))
        .bind(request.engine_type.unwrap_or(current.engine_type))
        .bind(request.wheels.unwrap_or(current.wheels))
        .bind(request.year_acquired.or(current.year_acquired))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Vehicle"))?;

        Ok(vehicle)
    }

    /// Eliminar un vehículo; sus pruebas se eliminan en cascada
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        }

        Ok(())
    }
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filters: &VehicleFilters) {
    if let Some(office_id) = filters.office_id {
        qb.push(" AND v.office_id = ").push_bind(office_id);
    }
    if let Some(vehicle_type) = filters.vehicle_type.as_deref().filter(|t| !t.trim().is_empty()) {
        qb.push(" AND v.vehicle_type ILIKE ").push_bind(vehicle_type.trim().to_string());
    }
    if let Some(engine_type) = filters.engine_type.as_deref().filter(|t| !t.trim().is_empty()) {
        qb.push(" AND v.engine_type ILIKE ").push_bind(engine_type.trim().to_string());
    }
    if let Some(pattern) = contains_pattern(filters.search.as_deref()) {
        qb.push(" AND (v.plate_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.chassis_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.registration_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.driver_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.vehicle_type ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.engine_type ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.year_acquired::text ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR o.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
