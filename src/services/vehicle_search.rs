//! Búsqueda de vehículos en memoria
//!
//! Misma semántica que el ILIKE del repositorio: subcadena sin distinguir
//! mayúsculas sobre placa, chasis, registro, conductor, tipo, motor, año de
//! adquisición y oficina.

use crate::models::vehicle::VehicleWithOffice;

/// Indica si el vehículo coincide con un término ya en minúsculas
pub fn matches(vehicle: &VehicleWithOffice, needle: &str) -> bool {
    let v = &vehicle.vehicle;
    let year_acquired = v.year_acquired.map(|y| y.to_string());
    let matched = [
        v.plate_number.as_deref(),
        v.chassis_number.as_deref(),
        v.registration_number.as_deref(),
        Some(v.driver_name.as_str()),
        Some(v.vehicle_type.as_str()),
        Some(v.engine_type.as_str()),
        year_acquired.as_deref(),
        Some(vehicle.office_name.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle));
    matched
}

/// Filtra vehículos por término de búsqueda; un término vacío devuelve todos
pub fn filter_vehicles<'a>(vehicles: &'a [VehicleWithOffice], query: &str) -> Vec<&'a VehicleWithOffice> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return vehicles.iter().collect();
    }
    vehicles.iter().filter(|v| matches(v, &needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::Vehicle;
    use chrono::Utc;
    use uuid::Uuid;

    fn vehicle(plate: Option<&str>, chassis: Option<&str>, driver: &str, office: &str) -> VehicleWithOffice {
        let now = Utc::now();
        VehicleWithOffice {
            vehicle: Vehicle {
                id: Uuid::new_v4(),
                plate_number: plate.map(str::to_string),
                chassis_number: chassis.map(str::to_string),
                registration_number: None,
                driver_name: driver.to_string(),
                office_id: Uuid::new_v4(),
                vehicle_type: "Pickup".to_string(),
                engine_type: "Diesel".to_string(),
                wheels: 4,
                year_acquired: None,
                created_at: now,
                updated_at: now,
            },
            office_name: office.to_string(),
        }
    }

    #[test]
    fn test_filter_vehicles() {
        let fleet = vec![
            vehicle(Some("ABC 1234"), None, "Maria Santos", "City Health Office"),
            vehicle(None, Some("CHS-99881"), "Pedro Reyes", "Engineering"),
        ];

        assert_eq!(filter_vehicles(&fleet, "").len(), 2);
        assert_eq!(filter_vehicles(&fleet, "abc").len(), 1);
        assert_eq!(filter_vehicles(&fleet, "chs-99").len(), 1);
        assert_eq!(filter_vehicles(&fleet, "SANTOS").len(), 1);
        assert_eq!(filter_vehicles(&fleet, "health").len(), 1);
        assert!(filter_vehicles(&fleet, "zzz").is_empty());
    }

    #[test]
    fn test_filter_by_type_engine_and_year() {
        let mut sedan = vehicle(Some("XYZ 9876"), None, "Ana Cruz", "Treasury");
        sedan.vehicle.vehicle_type = "Sedan".to_string();
        sedan.vehicle.engine_type = "Gasoline".to_string();
        sedan.vehicle.year_acquired = Some(2021);

        let mut pickup = vehicle(Some("ABC 1234"), None, "Maria Santos", "Engineering");
        pickup.vehicle.year_acquired = Some(2019);

        let fleet = vec![sedan, pickup];

        assert_eq!(filter_vehicles(&fleet, "pickup").len(), 1);
        assert_eq!(filter_vehicles(&fleet, "DIESEL").len(), 1);
        assert_eq!(filter_vehicles(&fleet, "2019")[0].vehicle.driver_name, "Maria Santos");
        assert_eq!(filter_vehicles(&fleet, "gasoline")[0].vehicle.driver_name, "Ana Cruz");
        assert_eq!(filter_vehicles(&fleet, "20").len(), 2);
    }
}
