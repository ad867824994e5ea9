//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! que complementan los derives de `validator`.

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::utils::errors::{validation_error, AppResult};

lazy_static! {
    // Placas LTO: "ABC 1234", "AB 1234", "ABC-123", "1234-567890" y placas de motocicleta
    static ref PLATE_RE: Regex = Regex::new(r"^[A-Z0-9]{1,4}[ -]?[A-Z0-9]{2,7}$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean_phone = value.chars().filter(|c| c.is_ascii_digit()).collect::<String>();
    if clean_phone.len() < 7 || clean_phone.len() > 15 {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de placa de vehículo
pub fn validate_plate_number(value: &str) -> Result<(), ValidationError> {
    let normalized = value.trim().to_uppercase();
    if !PLATE_RE.is_match(&normalized) {
        let mut error = ValidationError::new("plate_number");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que el trimestre esté entre 1 y 4
pub fn validate_quarter(quarter: i32) -> AppResult<()> {
    if !(1..=4).contains(&quarter) {
        return Err(validation_error("quarter", "quarter must be between 1 and 4"));
    }
    Ok(())
}

/// Validar el año de un periodo de reporte
pub fn validate_report_year(year: i32) -> AppResult<()> {
    if !(2000..=2100).contains(&year) {
        return Err(validation_error("year", "year must be between 2000 and 2100"));
    }
    Ok(())
}

/// Validar el año de adquisición: no puede ser posterior al próximo año
pub fn validate_year_acquired(year: i32) -> AppResult<()> {
    let max_year = Utc::now().year() + 1;
    if year < 1900 || year > max_year {
        return Err(validation_error("year_acquired", "year_acquired is out of range"));
    }
    Ok(())
}

/// Trimestre (1-4) al que pertenece una fecha
pub fn quarter_of(date: NaiveDate) -> i32 {
    (date.month0() / 3 + 1) as i32
}

/// Normalizar un identificador: recortar espacios, mayúsculas y vacío como `None`
pub fn normalize_identifier(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("Juan Dela Cruz").is_ok());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("(02) 8123-4567").is_ok());
        assert!(validate_phone("09171234567").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("1234567890123456").is_err());
    }

    #[test]
    fn test_validate_plate_number() {
        assert!(validate_plate_number("ABC 1234").is_ok());
        assert!(validate_plate_number("abc-123").is_ok());
        assert!(validate_plate_number("SAB1234").is_ok());
        assert!(validate_plate_number("A").is_err());
        assert!(validate_plate_number("ABC 12#4").is_err());
    }

    #[test]
    fn test_validate_quarter() {
        assert!(validate_quarter(1).is_ok());
        assert!(validate_quarter(4).is_ok());
        assert!(validate_quarter(0).is_err());
        assert!(validate_quarter(5).is_err());
    }

    #[test]
    fn test_validate_report_year() {
        assert!(validate_report_year(2025).is_ok());
        assert!(validate_report_year(1999).is_err());
    }

    #[test]
    fn test_validate_year_acquired() {
        assert!(validate_year_acquired(2015).is_ok());
        assert!(validate_year_acquired(1800).is_err());
        assert!(validate_year_acquired(Utc::now().year() + 5).is_err());
    }

    #[test]
    fn test_quarter_of() {
        let date = |m| NaiveDate::from_ymd_opt(2025, m, 15).unwrap();
        assert_eq!(quarter_of(date(1)), 1);
        assert_eq!(quarter_of(date(3)), 1);
        assert_eq!(quarter_of(date(4)), 2);
        assert_eq!(quarter_of(date(9)), 3);
        assert_eq!(quarter_of(date(12)), 4);
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier(Some(" abc 123 ".into())), Some("ABC 123".into()));
        assert_eq!(normalize_identifier(Some("   ".into())), None);
        assert_eq!(normalize_identifier(None), None);
    }
}
