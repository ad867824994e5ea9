//! Agregación de compliance por oficina
//!
//! Funciones puras: reciben oficinas, vehículos y pruebas ya cargados y
//! producen un registro por oficina. No tocan la base de datos.
//!
//! Un vehículo cuenta como probado si tiene al menos una prueba en el periodo
//! y como compliant si su prueba más reciente del periodo pasó. La tasa se
//! calcula sobre vehículos probados, nunca sobre el total.

use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use crate::models::chart::{BarPoint, ChartDataset, LinePoint, PieSlice};
use crate::models::compliance::{
    CompliancePeriod, ComplianceSortKey, ComplianceStatus, ComplianceSummary, OfficeCompliance,
    OfficeComplianceDetail, SortOrder, VehicleTestHistory, NO_DATA,
};
use crate::models::emission_test::EmissionTest;
use crate::models::office::Office;
use crate::models::vehicle::VehicleWithOffice;
use crate::services::vehicle_search::filter_vehicles;

/// Porcentaje entero redondeado hacia arriba en .5; `None` si no hay probados
pub fn compliance_rate(compliant: i64, tested: i64) -> Option<i64> {
    if tested <= 0 {
        return None;
    }
    Some((compliant * 200 + tested) / (tested * 2))
}

pub fn classify(rate: Option<i64>, threshold: i64) -> ComplianceStatus {
    match rate {
        None => ComplianceStatus::NoData,
        Some(rate) if rate >= threshold => ComplianceStatus::Compliant,
        Some(_) => ComplianceStatus::NonCompliant,
    }
}

pub fn display_rate(rate: Option<i64>) -> String {
    match rate {
        Some(rate) => format!("{}%", rate),
        None => NO_DATA.to_string(),
    }
}

/// Prueba más reciente de cada vehículo dentro del periodo.
///
/// Más reciente = mayor `test_date`; empates por `created_at` y luego por id
/// para que el resultado no dependa del orden de entrada.
pub fn latest_tests_by_vehicle<'a>(
    tests: &'a [EmissionTest],
    period: &CompliancePeriod,
) -> HashMap<Uuid, &'a EmissionTest> {
    let mut latest: HashMap<Uuid, &EmissionTest> = HashMap::new();
    for test in tests.iter().filter(|t| period.contains(t)) {
        latest
            .entry(test.vehicle_id)
            .and_modify(|current| {
                if recency(test) > recency(current) {
                    *current = test;
                }
            })
            .or_insert(test);
    }
    latest
}

fn recency(test: &EmissionTest) -> (chrono::NaiveDate, chrono::DateTime<chrono::Utc>, Uuid) {
    (test.test_date, test.created_at, test.id)
}

/// Registro de una oficina a partir de su flota y las últimas pruebas
fn office_record(
    office_id: Uuid,
    office_name: &str,
    fleet: &[&VehicleWithOffice],
    latest: &HashMap<Uuid, &EmissionTest>,
    threshold: i64,
) -> OfficeCompliance {
    let total_vehicles = fleet.len() as i64;
    let mut tested_vehicles = 0;
    let mut compliant_vehicles = 0;

    for vehicle in fleet {
        if let Some(test) = latest.get(&vehicle.vehicle.id) {
            tested_vehicles += 1;
            if test.result {
                compliant_vehicles += 1;
            }
        }
    }

    let rate = compliance_rate(compliant_vehicles, tested_vehicles);
    OfficeCompliance {
        office_id,
        office_name: office_name.to_string(),
        total_vehicles,
        tested_vehicles,
        compliant_vehicles,
        compliance_rate: rate,
        compliance_display: display_rate(rate),
        status: classify(rate, threshold),
    }
}

fn group_by_office(vehicles: &[VehicleWithOffice]) -> HashMap<Uuid, Vec<&VehicleWithOffice>> {
    let mut fleets: HashMap<Uuid, Vec<&VehicleWithOffice>> = HashMap::new();
    for vehicle in vehicles {
        fleets.entry(vehicle.vehicle.office_id).or_default().push(vehicle);
    }
    fleets
}

/// Un registro de compliance por oficina con al menos un vehículo.
///
/// Las oficinas sin vehículos se omiten. Las pruebas fuera del periodo o de
/// vehículos desconocidos se ignoran. El resultado va ordenado por nombre.
pub fn aggregate_office_compliance(
    offices: &[Office],
    vehicles: &[VehicleWithOffice],
    tests: &[EmissionTest],
    period: &CompliancePeriod,
    threshold: i64,
) -> Vec<OfficeCompliance> {
    let latest = latest_tests_by_vehicle(tests, period);
    let fleets = group_by_office(vehicles);

    let mut records: Vec<OfficeCompliance> = offices
        .iter()
        .filter_map(|office| {
            let fleet = fleets.get(&office.id).filter(|fleet| !fleet.is_empty())?;
            Some(office_record(office.id, &office.name, fleet, &latest, threshold))
        })
        .collect();

    sort_records(&mut records, ComplianceSortKey::Name, SortOrder::Asc);
    records
}

/// Filtrar por nombre de oficina (subcadena, sin distinguir mayúsculas)
pub fn filter_by_office_name(records: Vec<OfficeCompliance>, search: Option<&str>) -> Vec<OfficeCompliance> {
    let needle = match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(needle) => needle.to_lowercase(),
        None => return records,
    };
    records
        .into_iter()
        .filter(|r| r.office_name.to_lowercase().contains(&needle))
        .collect()
}

fn by_name(a: &OfficeCompliance, b: &OfficeCompliance) -> Ordering {
    a.office_name
        .to_lowercase()
        .cmp(&b.office_name.to_lowercase())
        .then_with(|| a.office_id.cmp(&b.office_id))
}

/// Ordenar registros. Con la clave de tasa, las oficinas sin datos quedan
/// al final en ambas direcciones. Los empates se resuelven por nombre.
pub fn sort_records(records: &mut [OfficeCompliance], key: ComplianceSortKey, order: SortOrder) {
    let directed = |ordering: Ordering| match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };

    records.sort_by(|a, b| {
        let primary = match key {
            ComplianceSortKey::Name => directed(by_name(a, b)),
            ComplianceSortKey::TotalVehicles => directed(a.total_vehicles.cmp(&b.total_vehicles)),
            ComplianceSortKey::TestedVehicles => directed(a.tested_vehicles.cmp(&b.tested_vehicles)),
            ComplianceSortKey::CompliantVehicles => directed(a.compliant_vehicles.cmp(&b.compliant_vehicles)),
            ComplianceSortKey::ComplianceRate => match (a.compliance_rate, b.compliance_rate) {
                (Some(x), Some(y)) => directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| by_name(a, b))
    });
}

/// Resumen del dashboard a partir de los registros por oficina
pub fn summarize(records: &[OfficeCompliance], period: CompliancePeriod) -> ComplianceSummary {
    let total_vehicles = records.iter().map(|r| r.total_vehicles).sum();
    let tested_vehicles = records.iter().map(|r| r.tested_vehicles).sum();
    let compliant_vehicles = records.iter().map(|r| r.compliant_vehicles).sum();
    let offices_with_data = records.iter().filter(|r| r.compliance_rate.is_some()).count() as i64;
    let compliant_offices = records
        .iter()
        .filter(|r| r.status == ComplianceStatus::Compliant)
        .count() as i64;

    ComplianceSummary {
        period,
        total_offices: records.len() as i64,
        offices_with_data,
        compliant_offices,
        total_vehicles,
        tested_vehicles,
        compliant_vehicles,
        overall_compliance_rate: compliance_rate(compliant_vehicles, tested_vehicles),
        office_compliance_rate: compliance_rate(compliant_offices, offices_with_data),
    }
}

/// Vista de detalle de una oficina: su registro y el historial de cada vehículo.
///
/// A diferencia del listado, una oficina sin vehículos sí produce un detalle
/// (con `No Data`). `search` filtra los vehículos mostrados, no el registro.
pub fn build_office_detail(
    office: &Office,
    vehicles: &[VehicleWithOffice],
    tests: &[EmissionTest],
    period: CompliancePeriod,
    threshold: i64,
    search: &str,
) -> OfficeComplianceDetail {
    let fleet: Vec<&VehicleWithOffice> = vehicles
        .iter()
        .filter(|v| v.vehicle.office_id == office.id)
        .collect();
    let latest = latest_tests_by_vehicle(tests, &period);
    let compliance = office_record(office.id, &office.name, &fleet, &latest, threshold);

    let mut histories: HashMap<Uuid, Vec<EmissionTest>> = HashMap::new();
    for test in tests.iter().filter(|t| period.contains(t)) {
        histories.entry(test.vehicle_id).or_default().push(test.clone());
    }

    let own_vehicles: Vec<VehicleWithOffice> = fleet.into_iter().cloned().collect();
    let vehicles = filter_vehicles(&own_vehicles, search)
        .into_iter()
        .map(|vehicle| {
            let mut tests = histories.remove(&vehicle.vehicle.id).unwrap_or_default();
            tests.sort_by(|a, b| recency(b).cmp(&recency(a)));
            VehicleTestHistory {
                latest_result: tests.first().map(|t| t.result),
                vehicle: vehicle.clone(),
                tests,
            }
        })
        .collect();

    OfficeComplianceDetail {
        period,
        compliance,
        vehicles,
    }
}

/// Datasets de las gráficas del dashboard.
///
/// `year_tests` debe contener las pruebas de todo el año para poder trazar
/// la línea trimestral; el resto se calcula sobre `period`.
pub fn build_chart_datasets(
    offices: &[Office],
    vehicles: &[VehicleWithOffice],
    year_tests: &[EmissionTest],
    period: CompliancePeriod,
    threshold: i64,
) -> Vec<ChartDataset> {
    let records = aggregate_office_compliance(offices, vehicles, year_tests, &period, threshold);
    let summary = summarize(&records, period);

    let bar = ChartDataset::Bar {
        title: "Compliance rate by office".to_string(),
        points: records
            .iter()
            .filter_map(|r| {
                r.compliance_rate.map(|rate| BarPoint {
                    label: r.office_name.clone(),
                    value: rate,
                })
            })
            .collect(),
    };

    let pie = ChartDataset::Pie {
        title: "Emission test results".to_string(),
        slices: vec![
            PieSlice {
                label: "Passed".to_string(),
                value: summary.compliant_vehicles,
            },
            PieSlice {
                label: "Failed".to_string(),
                value: summary.tested_vehicles - summary.compliant_vehicles,
            },
        ],
    };

    let line = ChartDataset::Line {
        title: format!("Quarterly compliance {}", period.year),
        points: (1..=4)
            .map(|quarter| {
                let quarter_period = CompliancePeriod::new(period.year, Some(quarter));
                let quarter_records =
                    aggregate_office_compliance(offices, vehicles, year_tests, &quarter_period, threshold);
                LinePoint {
                    x: format!("Q{}", quarter),
                    y: summarize(&quarter_records, quarter_period).overall_compliance_rate,
                }
            })
            .collect(),
    };

    vec![bar, pie, line]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::Vehicle;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    const THRESHOLD: i64 = 80;

    fn office(name: &str) -> Office {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Office {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: None,
            contact_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn vehicle(office: &Office, plate: &str) -> VehicleWithOffice {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        VehicleWithOffice {
            vehicle: Vehicle {
                id: Uuid::new_v4(),
                plate_number: Some(plate.to_string()),
                chassis_number: None,
                registration_number: None,
                driver_name: format!("Driver {}", plate),
                office_id: office.id,
                vehicle_type: "Sedan".to_string(),
                engine_type: "Gasoline".to_string(),
                wheels: 4,
                year_acquired: Some(2018),
                created_at: now,
                updated_at: now,
            },
            office_name: office.name.clone(),
        }
    }

    fn test_on(vehicle: &VehicleWithOffice, date: (i32, u32, u32), result: bool) -> EmissionTest {
        let test_date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        let created_at = Utc.with_ymd_and_hms(date.0, date.1, date.2, 9, 0, 0).unwrap();
        EmissionTest {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.vehicle.id,
            test_date,
            quarter: crate::utils::validation::quarter_of(test_date),
            year: date.0,
            result,
            created_by: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn year_2025() -> CompliancePeriod {
        CompliancePeriod::new(2025, None)
    }

    #[test]
    fn test_compliance_rate_rounding() {
        assert_eq!(compliance_rate(1, 1), Some(100));
        assert_eq!(compliance_rate(2, 3), Some(67));
        assert_eq!(compliance_rate(1, 8), Some(13));
        assert_eq!(compliance_rate(4, 5), Some(80));
        assert_eq!(compliance_rate(0, 3), Some(0));
        assert_eq!(compliance_rate(0, 0), None);
    }

    #[test]
    fn test_classify_threshold() {
        assert_eq!(classify(Some(80), THRESHOLD), ComplianceStatus::Compliant);
        assert_eq!(classify(Some(79), THRESHOLD), ComplianceStatus::NonCompliant);
        assert_eq!(classify(None, THRESHOLD), ComplianceStatus::NoData);
        assert_eq!(display_rate(None), "No Data");
        assert_eq!(display_rate(Some(67)), "67%");
    }

    #[test]
    fn test_office_with_untested_vehicles_shows_no_data() {
        let a = office("Office A");
        let b = office("Office B");
        let empty = office("Office C");
        let vehicles = vec![vehicle(&a, "AAA 111"), vehicle(&a, "AAA 222"), vehicle(&b, "BBB 111")];
        let tests = vec![test_on(&vehicles[0], (2025, 2, 10), true)];

        let records = aggregate_office_compliance(
            &[a.clone(), b.clone(), empty.clone()],
            &vehicles,
            &tests,
            &year_2025(),
            THRESHOLD,
        );

        assert_eq!(records.len(), 2, "office without vehicles must be excluded");

        let rec_a = &records[0];
        assert_eq!(rec_a.office_name, "Office A");
        assert_eq!((rec_a.total_vehicles, rec_a.tested_vehicles, rec_a.compliant_vehicles), (2, 1, 1));
        assert_eq!(rec_a.compliance_rate, Some(100));
        assert_eq!(rec_a.status, ComplianceStatus::Compliant);

        let rec_b = &records[1];
        assert_eq!(rec_b.office_name, "Office B");
        assert_eq!((rec_b.total_vehicles, rec_b.tested_vehicles), (1, 0));
        assert_eq!(rec_b.compliance_rate, None);
        assert_eq!(rec_b.compliance_display, "No Data");
        assert_eq!(rec_b.status, ComplianceStatus::NoData);
    }

    #[test]
    fn test_retest_uses_latest_result_and_keeps_invariant() {
        let a = office("Office A");
        let vehicles = vec![vehicle(&a, "AAA 111"), vehicle(&a, "AAA 222")];
        let tests = vec![
            test_on(&vehicles[0], (2025, 1, 10), false),
            test_on(&vehicles[0], (2025, 1, 20), true),
            test_on(&vehicles[1], (2025, 1, 10), true),
            test_on(&vehicles[1], (2025, 1, 25), true),
        ];

        let records = aggregate_office_compliance(&[a], &vehicles, &tests, &year_2025(), THRESHOLD);
        let rec = &records[0];
        assert_eq!(rec.tested_vehicles, 2);
        assert_eq!(rec.compliant_vehicles, 2);
        assert!(rec.compliant_vehicles <= rec.tested_vehicles);
        assert!(rec.tested_vehicles <= rec.total_vehicles);
    }

    #[test]
    fn test_failed_retest_overrides_earlier_pass() {
        let a = office("Office A");
        let vehicles = vec![vehicle(&a, "AAA 111")];
        let tests = vec![
            test_on(&vehicles[0], (2025, 1, 10), true),
            test_on(&vehicles[0], (2025, 3, 1), false),
        ];

        let records = aggregate_office_compliance(&[a], &vehicles, &tests, &year_2025(), THRESHOLD);
        assert_eq!(records[0].compliant_vehicles, 0);
        assert_eq!(records[0].compliance_rate, Some(0));
        assert_eq!(records[0].status, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn test_same_day_tie_broken_by_created_at() {
        let a = office("Office A");
        let vehicles = vec![vehicle(&a, "AAA 111")];
        let first = test_on(&vehicles[0], (2025, 5, 5), true);
        let mut second = test_on(&vehicles[0], (2025, 5, 5), false);
        second.created_at = first.created_at + Duration::hours(2);

        let tests = vec![second.clone(), first];
        let latest = latest_tests_by_vehicle(&tests, &year_2025());
        assert_eq!(latest[&vehicles[0].vehicle.id].id, second.id);
    }

    #[test]
    fn test_period_filter_by_quarter_and_year() {
        let a = office("Office A");
        let vehicles = vec![vehicle(&a, "AAA 111"), vehicle(&a, "AAA 222"), vehicle(&a, "AAA 333")];
        let tests = vec![
            test_on(&vehicles[0], (2025, 2, 1), true),  // Q1
            test_on(&vehicles[1], (2025, 5, 1), false), // Q2
            test_on(&vehicles[2], (2024, 2, 1), true),  // otro año
        ];

        let q1 = aggregate_office_compliance(
            &[a.clone()],
            &vehicles,
            &tests,
            &CompliancePeriod::new(2025, Some(1)),
            THRESHOLD,
        );
        assert_eq!((q1[0].tested_vehicles, q1[0].compliant_vehicles), (1, 1));

        let year = aggregate_office_compliance(&[a], &vehicles, &tests, &year_2025(), THRESHOLD);
        assert_eq!((year[0].tested_vehicles, year[0].compliant_vehicles), (2, 1));
        assert_eq!(year[0].compliance_rate, Some(50));
    }

    #[test]
    fn test_tests_for_unknown_vehicles_are_ignored() {
        let a = office("Office A");
        let other = office("Elsewhere");
        let vehicles = vec![vehicle(&a, "AAA 111")];
        let stray = vehicle(&other, "ZZZ 999");
        let tests = vec![test_on(&stray, (2025, 1, 1), true)];

        let records = aggregate_office_compliance(&[a], &vehicles, &tests, &year_2025(), THRESHOLD);
        assert_eq!(records[0].tested_vehicles, 0);
    }

    #[test]
    fn test_sort_by_rate_puts_no_data_last() {
        let make = |name: &str, rate: Option<i64>| OfficeCompliance {
            office_id: Uuid::new_v4(),
            office_name: name.to_string(),
            total_vehicles: 1,
            tested_vehicles: rate.map_or(0, |_| 1),
            compliant_vehicles: 0,
            compliance_rate: rate,
            compliance_display: display_rate(rate),
            status: classify(rate, THRESHOLD),
        };
        let mut records = vec![make("B", None), make("C", Some(90)), make("A", Some(40))];

        sort_records(&mut records, ComplianceSortKey::ComplianceRate, SortOrder::Desc);
        let names: Vec<_> = records.iter().map(|r| r.office_name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);

        sort_records(&mut records, ComplianceSortKey::ComplianceRate, SortOrder::Asc);
        let names: Vec<_> = records.iter().map(|r| r.office_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "B"]);

        sort_records(&mut records, ComplianceSortKey::Name, SortOrder::Desc);
        let names: Vec<_> = records.iter().map(|r| r.office_name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_filter_by_office_name() {
        let a = office("City Engineering Office");
        let b = office("Mayor's Office");
        let vehicles = vec![vehicle(&a, "AAA 111"), vehicle(&b, "BBB 111")];
        let records = aggregate_office_compliance(&[a, b], &vehicles, &[], &year_2025(), THRESHOLD);

        let filtered = filter_by_office_name(records.clone(), Some("engineering"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].office_name, "City Engineering Office");

        assert_eq!(filter_by_office_name(records.clone(), Some("  ")).len(), 2);
        assert_eq!(filter_by_office_name(records, None).len(), 2);
    }

    #[test]
    fn test_summarize_rates() {
        let a = office("A");
        let b = office("B");
        let c = office("C");
        let vehicles = vec![
            vehicle(&a, "A1"),
            vehicle(&a, "A2"),
            vehicle(&b, "B1"),
            vehicle(&b, "B2"),
            vehicle(&c, "C1"),
        ];
        let tests = vec![
            test_on(&vehicles[0], (2025, 1, 1), true),
            test_on(&vehicles[1], (2025, 1, 1), true),
            test_on(&vehicles[2], (2025, 1, 1), true),
            test_on(&vehicles[3], (2025, 1, 1), false),
        ];

        let records = aggregate_office_compliance(&[a, b, c], &vehicles, &tests, &year_2025(), THRESHOLD);
        let summary = summarize(&records, year_2025());

        assert_eq!(summary.total_offices, 3);
        assert_eq!(summary.offices_with_data, 2);
        assert_eq!(summary.compliant_offices, 1);
        assert_eq!(summary.total_vehicles, 5);
        assert_eq!(summary.tested_vehicles, 4);
        assert_eq!(summary.compliant_vehicles, 3);
        assert_eq!(summary.overall_compliance_rate, Some(75));
        assert_eq!(summary.office_compliance_rate, Some(50));
    }

    #[test]
    fn test_office_detail_history_and_search() {
        let a = office("Office A");
        let vehicles = vec![vehicle(&a, "AAA 111"), vehicle(&a, "BBB 222")];
        let tests = vec![
            test_on(&vehicles[0], (2025, 1, 10), false),
            test_on(&vehicles[0], (2025, 2, 10), true),
        ];

        let detail = build_office_detail(&a, &vehicles, &tests, year_2025(), THRESHOLD, "");
        assert_eq!(detail.compliance.total_vehicles, 2);
        assert_eq!(detail.vehicles.len(), 2);

        let first = &detail.vehicles[0];
        assert_eq!(first.tests.len(), 2);
        assert!(first.tests[0].test_date > first.tests[1].test_date);
        assert_eq!(first.latest_result, Some(true));
        assert_eq!(detail.vehicles[1].latest_result, None);

        let filtered = build_office_detail(&a, &vehicles, &tests, year_2025(), THRESHOLD, "bbb");
        assert_eq!(filtered.vehicles.len(), 1);
        assert_eq!(filtered.compliance.total_vehicles, 2, "search must not change the record");
    }

    #[test]
    fn test_office_detail_without_vehicles() {
        let a = office("Empty Office");
        let detail = build_office_detail(&a, &[], &[], year_2025(), THRESHOLD, "");
        assert_eq!(detail.compliance.total_vehicles, 0);
        assert_eq!(detail.compliance.compliance_display, "No Data");
        assert!(detail.vehicles.is_empty());
    }

    #[test]
    fn test_chart_datasets() {
        let a = office("Office A");
        let vehicles = vec![vehicle(&a, "AAA 111"), vehicle(&a, "AAA 222")];
        let tests = vec![
            test_on(&vehicles[0], (2025, 2, 1), true),
            test_on(&vehicles[1], (2025, 8, 1), false),
        ];

        let datasets = build_chart_datasets(&[a], &vehicles, &tests, year_2025(), THRESHOLD);
        assert_eq!(datasets.len(), 3);

        match &datasets[1] {
            ChartDataset::Pie { slices, .. } => {
                assert_eq!(slices[0].value, 1);
                assert_eq!(slices[1].value, 1);
            }
            other => panic!("expected pie, got {:?}", other),
        }

        match &datasets[2] {
            ChartDataset::Line { points, .. } => {
                let ys: Vec<_> = points.iter().map(|p| p.y).collect();
                assert_eq!(ys, vec![Some(100), None, Some(0), None]);
            }
            other => panic!("expected line, got {:?}", other),
        }
    }
}
