use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::list::filter::{DateRange, EnumFilter, TextFilter};
use crate::list::paginate::Page;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::validate_date;

// Query string común de las pantallas de lista
//
// Cada pantalla usa solo los filtros que le corresponden; el resto se
// ignora. Vacío o `TODOS` equivale a no filtrar.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culminado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehiculo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desde: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hasta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

fn parse_bound(name: &str, value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => validate_date(value).map(Some).map_err(|_| {
            AppError::BadRequest(format!(
                "Fecha '{}' inválida en '{}', use YYYY-MM-DD",
                value, name
            ))
        }),
    }
}

impl ListQuery {
    /// Filtro de enumeración sobre `field` con el valor de la query
    pub fn enum_filter(field: &str, value: Option<&str>) -> EnumFilter {
        EnumFilter::new(field, value.unwrap_or_default())
    }

    /// Búsqueda de texto en los campos indicados
    pub fn text_filter(&self, fields: &[&str]) -> TextFilter {
        TextFilter::new(fields, self.q.as_deref().unwrap_or_default())
    }

    /// Rango `desde..=hasta` sobre `field`; rechaza fechas mal escritas
    pub fn date_range(&self, field: &str) -> AppResult<DateRange> {
        let from = parse_bound("desde", self.desde.as_deref())?;
        let to = parse_bound("hasta", self.hasta.as_deref())?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AppError::BadRequest(
                    "'desde' no puede ser posterior a 'hasta'".to_string(),
                ));
            }
        }
        Ok(DateRange::new(field, from, to))
    }

    pub fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }
}

// Respuesta de lista: página actual y filtros aplicados
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Page<T>,
    pub filtros: ListQuery,
}

impl<T> ListResponse<T> {
    pub fn new(data: Page<T>, filtros: ListQuery) -> Self {
        Self {
            success: true,
            message: None,
            data,
            filtros,
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_from_query() {
        let query = ListQuery {
            desde: Some("2024-01-01".to_string()),
            hasta: Some(" ".to_string()),
            ..Default::default()
        };
        let range = query.date_range("FECHA").unwrap();
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(range.to, None);
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let query = ListQuery {
            desde: Some("01/01/2024".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.date_range("FECHA"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let query = ListQuery {
            desde: Some("2024-02-01".to_string()),
            hasta: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        assert!(query.date_range("FECHA").is_err());
    }

    #[test]
    fn test_echoed_filters_skip_empty() {
        let query = ListQuery {
            estado: Some("PENDIENTE".to_string()),
            ..Default::default()
        };
        let echoed = serde_json::to_value(&query).unwrap();
        assert_eq!(echoed, serde_json::json!({"estado": "PENDIENTE"}));
    }
}
