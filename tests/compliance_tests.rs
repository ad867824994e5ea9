mod common;

use std::sync::Arc;

use uuid::Uuid;

use common::{emission_test, fixture, ENGINEERING, TREASURY};
use emission_compliance::models::compliance::{
    ComplianceQuery, CompliancePeriod, ComplianceSortKey, ComplianceStatus, SortOrder,
};
use emission_compliance::services::ComplianceService;
use emission_compliance::utils::errors::AppError;

const YEAR_2025: CompliancePeriod = CompliancePeriod {
    year: 2025,
    quarter: None,
};

#[tokio::test]
async fn test_new_test_changes_office_status() {
    let data = fixture();
    let source = Arc::new(data.source());
    let service = ComplianceService::new(source.clone(), 80);

    let records = service.office_compliance(YEAR_2025).await.unwrap();
    let treasury = records.iter().find(|r| r.office_name == TREASURY).unwrap();
    assert_eq!(treasury.status, ComplianceStatus::NoData);

    // Un vehículo de Treasury falla en Q3
    source
        .add_test(emission_test(&data.vehicles[2], (2025, 8, 1), false))
        .unwrap();

    let records = service.office_compliance(YEAR_2025).await.unwrap();
    let treasury = records.iter().find(|r| r.office_name == TREASURY).unwrap();
    assert_eq!(treasury.tested_vehicles, 1);
    assert_eq!(treasury.compliance_rate, Some(0));
    assert_eq!(treasury.status, ComplianceStatus::NonCompliant);
}

#[tokio::test]
async fn test_same_day_retest_uses_latest_created() {
    let data = fixture();
    let source = Arc::new(data.source());
    let service = ComplianceService::new(source.clone(), 80);

    // Misma fecha que la prueba aprobada de Q1, registrada después y fallida
    let mut retest = emission_test(&data.vehicles[0], (2025, 2, 10), false);
    retest.created_at += chrono::Duration::hours(2);
    source.add_test(retest).unwrap();

    let records = service
        .office_compliance(CompliancePeriod::new(2025, Some(1)))
        .await
        .unwrap();
    let engineering = records.iter().find(|r| r.office_name == ENGINEERING).unwrap();
    assert_eq!(engineering.tested_vehicles, 2);
    assert_eq!(engineering.compliant_vehicles, 0);
    assert_eq!(engineering.compliance_display, "0%");
}

#[tokio::test]
async fn test_threshold_is_configurable() {
    let data = fixture();
    let q1 = CompliancePeriod::new(2025, Some(1));

    let strict = ComplianceService::new(Arc::new(data.source()), 80);
    let lenient = ComplianceService::new(Arc::new(data.source()), 50);

    let strict_records = strict.office_compliance(q1).await.unwrap();
    let lenient_records = lenient.office_compliance(q1).await.unwrap();

    // 50% queda por debajo de 80 pero alcanza un umbral de 50
    assert_eq!(strict_records[0].status, ComplianceStatus::NonCompliant);
    assert_eq!(lenient_records[0].status, ComplianceStatus::Compliant);
}

#[tokio::test]
async fn test_report_pagination() {
    let data = fixture();
    let service = ComplianceService::new(Arc::new(data.source()), 80);

    let query = ComplianceQuery {
        year: Some(2025),
        sort_by: Some(ComplianceSortKey::TotalVehicles),
        sort_order: Some(SortOrder::Desc),
        per_page: Some(1),
        page: Some(2),
        ..Default::default()
    };
    let page = service.report(&query).await.unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].office_name, TREASURY);
}

#[tokio::test]
async fn test_export_rows_are_not_paginated() {
    let data = fixture();
    let service = ComplianceService::new(Arc::new(data.source()), 80);

    let query = ComplianceQuery {
        year: Some(2025),
        per_page: Some(1),
        ..Default::default()
    };
    let (period, rows) = service.export_rows(&query).await.unwrap();

    assert_eq!(period, YEAR_2025);
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_summary_filtered_by_search() {
    let data = fixture();
    let service = ComplianceService::new(Arc::new(data.source()), 80);

    let summary = service.summary(YEAR_2025, Some("engineering")).await.unwrap();
    assert_eq!(summary.total_offices, 1);
    assert_eq!(summary.total_vehicles, 2);
    assert_eq!(summary.overall_compliance_rate, Some(100));

    let empty = service.summary(YEAR_2025, Some("no such office")).await.unwrap();
    assert_eq!(empty.total_offices, 0);
    assert_eq!(empty.overall_compliance_rate, None);
    assert_eq!(empty.office_compliance_rate, None);
}

#[tokio::test]
async fn test_year_without_tests() {
    let data = fixture();
    let service = ComplianceService::new(Arc::new(data.source()), 80);

    let records = service
        .office_compliance(CompliancePeriod::new(2024, None))
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == ComplianceStatus::NoData));
}

#[tokio::test]
async fn test_office_detail_unknown_office() {
    let data = fixture();
    let service = ComplianceService::new(Arc::new(data.source()), 80);

    let result = service.office_detail(Uuid::new_v4(), YEAR_2025, None).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
