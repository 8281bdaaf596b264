//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! de formularios y conversión de fechas.

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Prefijo de fecha ISO: `2024-01-31`, `2024-01-31T10:00`, `2024-01-31 10:00:00`
    static ref ISO_DATE_PREFIX: Regex = Regex::new(r"^\s*(\d{4})-(\d{2})-(\d{2})").unwrap();
    /// Prefijo de fecha local: `31/01/2024`, `31/01/2024 10:00`
    static ref LOCAL_DATE_PREFIX: Regex = Regex::new(r"^\s*(\d{2})/(\d{2})/(\d{4})").unwrap();
}

/// Formatos aceptados para `datetime-local`
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar y convertir un valor de `datetime-local` (`2024-01-01T09:00`)
pub fn validate_datetime_local(value: &str) -> Result<NaiveDateTime, ValidationError> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"YYYY-MM-DDTHH:MM".to_string());
            error
        })
}

/// Extraer la fecha (sin hora) del inicio de un timestamp
///
/// Acepta `YYYY-MM-DD...` y `DD/MM/YYYY...`. Devuelve `None` si el
/// prefijo no es una fecha válida.
pub fn date_prefix(value: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE_PREFIX.captures(value) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if let Some(caps) = LOCAL_DATE_PREFIX.captures(value) {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    None
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
