//! Exportación CSV
//!
//! Los calendarios de prueba y el reporte de compliance se descargan como CSV
//! con cabecera. Se escriben en memoria: los volúmenes son de una alcaldía.

use csv::WriterBuilder;

use crate::models::compliance::{CompliancePeriod, OfficeCompliance};
use crate::models::test_schedule::TestSchedule;
use crate::utils::errors::{AppError, AppResult};

pub const SCHEDULE_HEADERS: [&str; 5] = ["year", "quarter", "assigned_personnel", "location", "conducted_on"];

pub const COMPLIANCE_HEADERS: [&str; 8] = [
    "year",
    "quarter",
    "office",
    "total_vehicles",
    "tested_vehicles",
    "compliant_vehicles",
    "compliance_rate",
    "status",
];

fn finish(writer: csv::Writer<Vec<u8>>) -> AppResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV is not UTF-8: {}", e)))
}

pub fn export_schedules_csv(schedules: &[TestSchedule]) -> AppResult<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(SCHEDULE_HEADERS)?;

    for schedule in schedules {
        writer.write_record([
            schedule.year.to_string(),
            schedule.quarter.to_string(),
            schedule.assigned_personnel.clone(),
            schedule.location.clone(),
            schedule.conducted_on.format("%Y-%m-%d").to_string(),
        ])?;
    }

    finish(writer)
}

/// Reporte de compliance; sin trimestre la columna queda vacía
pub fn export_compliance_csv(period: CompliancePeriod, records: &[OfficeCompliance]) -> AppResult<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(COMPLIANCE_HEADERS)?;

    let year = period.year.to_string();
    let quarter = period.quarter.map(|q| q.to_string()).unwrap_or_default();

    for record in records {
        writer.write_record([
            year.clone(),
            quarter.clone(),
            record.office_name.clone(),
            record.total_vehicles.to_string(),
            record.tested_vehicles.to_string(),
            record.compliant_vehicles.to_string(),
            record.compliance_display.clone(),
            status_label(record),
        ])?;
    }

    finish(writer)
}

fn status_label(record: &OfficeCompliance) -> String {
    use crate::models::compliance::ComplianceStatus;
    match record.status {
        ComplianceStatus::Compliant => "compliant",
        ComplianceStatus::NonCompliant => "non_compliant",
        ComplianceStatus::NoData => "no_data",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::compliance::ComplianceStatus;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    #[test]
    fn test_export_schedules_quotes_fields() {
        let now = Utc::now();
        let schedules = vec![TestSchedule {
            id: Uuid::new_v4(),
            year: 2025,
            quarter: 1,
            assigned_personnel: "Santos, Maria".to_string(),
            location: "City Motorpool".to_string(),
            conducted_on: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            created_at: now,
            updated_at: now,
        }];

        let csv = export_schedules_csv(&schedules).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("year,quarter,assigned_personnel,location,conducted_on"));
        assert_eq!(lines.next(), Some("2025,1,\"Santos, Maria\",City Motorpool,2025-03-14"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_compliance_no_data_row() {
        let records = vec![OfficeCompliance {
            office_id: Uuid::new_v4(),
            office_name: "Treasury".to_string(),
            total_vehicles: 3,
            tested_vehicles: 0,
            compliant_vehicles: 0,
            compliance_rate: None,
            compliance_display: "No Data".to_string(),
            status: ComplianceStatus::NoData,
        }];

        let csv = export_compliance_csv(CompliancePeriod::new(2025, None), &records).unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], "2025,,Treasury,3,0,0,No Data,no_data");
    }
}
