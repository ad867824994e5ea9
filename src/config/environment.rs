//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Umbral por defecto para considerar una oficina como "compliant"
pub const DEFAULT_COMPLIANCE_THRESHOLD: i64 = 80;

/// Errores al leer la configuración
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    /// Usar X-Forwarded-For como IP del cliente (solo detrás de un proxy propio)
    pub trust_proxy_headers: bool,
    pub request_timeout_secs: u64,
    pub compliance_threshold: i64,
}

impl EnvironmentConfig {
    /// Valores por defecto para desarrollo local
    pub fn development() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            jwt_secret: "development-secret-change-me".to_string(),
            jwt_expiration: 8 * 3600,
            cors_origins: vec!["*".to_string()],
            rate_limit_requests: 300,
            rate_limit_window: 60,
            trust_proxy_headers: false,
            request_timeout_secs: 30,
            compliance_threshold: DEFAULT_COMPLIANCE_THRESHOLD,
        }
    }

    /// Leer la configuración desde las variables de entorno.
    ///
    /// Todas las variables tienen un valor por defecto salvo `JWT_SECRET`,
    /// que es obligatoria en producción.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::development();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == "production" => return Err(ConfigError::Missing("JWT_SECRET")),
            _ => defaults.jwt_secret,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|origins| parse_origins(&origins))
            .unwrap_or(defaults.cors_origins);

        let compliance_threshold = parse_var("COMPLIANCE_THRESHOLD", defaults.compliance_threshold)?;
        if !(0..=100).contains(&compliance_threshold) {
            return Err(ConfigError::Invalid {
                key: "COMPLIANCE_THRESHOLD",
                value: compliance_threshold.to_string(),
            });
        }

        Ok(Self {
            environment,
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", defaults.jwt_expiration)?,
            cors_origins,
            rate_limit_requests: parse_var("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests)?,
            rate_limit_window: parse_var("RATE_LIMIT_WINDOW", defaults.rate_limit_window)?,
            trust_proxy_headers: parse_var("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers)?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            compliance_threshold,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
