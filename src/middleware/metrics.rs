//! Métricas Prometheus
//!
//! Registro propio (no el global de prometheus) con contadores HTTP y de
//! reportes de compliance. Se exporta en formato texto en `/metrics`.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::utils::errors::AppError;

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration: HistogramVec,
    compliance_reports_total: IntCounterVec,
    compliance_report_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("emission_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new("emission_http_request_duration_seconds", "HTTP request latency")
                .buckets(LATENCY_BUCKETS.to_vec()),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        let compliance_reports_total = IntCounterVec::new(
            Opts::new("emission_compliance_reports_total", "Compliance reports computed"),
            &["kind"],
        )?;
        registry.register(Box::new(compliance_reports_total.clone()))?;

        let compliance_report_duration = HistogramVec::new(
            HistogramOpts::new(
                "emission_compliance_report_duration_seconds",
                "Time spent loading and aggregating a compliance report",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["kind"],
        )?;
        registry.register(Box::new(compliance_report_duration.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration,
            compliance_reports_total,
            compliance_report_duration,
        })
    }

    pub fn observe_request(&self, method: &str, path: &str, status: u16, seconds: f64) {
        self.http_requests_total
            .with_label_values(&[method, path, &status.to_string()])
            .inc();
        self.http_request_duration
            .with_label_values(&[method, path])
            .observe(seconds);
    }

    pub fn observe_compliance_report(&self, kind: &str, seconds: f64) {
        self.compliance_reports_total.with_label_values(&[kind]).inc();
        self.compliance_report_duration
            .with_label_values(&[kind])
            .observe(seconds);
    }

    pub fn encode_text(&self) -> Result<String, AppError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;
        String::from_utf8(buffer).map_err(|e| AppError::Internal(format!("Metrics are not UTF-8: {}", e)))
    }
}

lazy_static! {
    pub static ref METRICS: Option<Metrics> = match Metrics::new() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            log::error!("❌ No se pudieron registrar las métricas: {}", e);
            None
        }
    };
}

pub fn observe_compliance_report(kind: &str, started: Instant) {
    if let Some(metrics) = METRICS.as_ref() {
        metrics.observe_compliance_report(kind, started.elapsed().as_secs_f64());
    }
}

/// Texto para el endpoint `/metrics`
pub fn render() -> Result<String, AppError> {
    match METRICS.as_ref() {
        Some(metrics) => metrics.encode_text(),
        None => Err(AppError::Internal("Metrics registry unavailable".to_string())),
    }
}

/// Middleware que cuenta peticiones y mide latencia por ruta
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    // Ruta con parámetros (/api/vehicles/:id) para no crear una serie por id
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    if let Some(metrics) = METRICS.as_ref() {
        metrics.observe_request(&method, &path, response.status().as_u16(), started.elapsed().as_secs_f64());
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_render() {
        let metrics = Metrics::new().unwrap();
        metrics.observe_request("GET", "/api/compliance", 200, 0.02);
        metrics.observe_compliance_report("report", 0.01);

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("emission_http_requests_total"));
        assert!(text.contains("path=\"/api/compliance\""));
        assert!(text.contains("emission_compliance_reports_total{kind=\"report\"} 1"));
    }
}
