//! Motor de filtros
//!
//! Función pura de (lista completa, valores de filtro) → lista filtrada.
//! Los predicados se combinan siempre con AND.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::list::normalize::value_to_text;
use crate::utils::validation::date_prefix;

/// Valor de selector que equivale a "sin filtro"
pub const ALL_SENTINEL: &str = "TODOS";

/// Acceso por nombre a los campos de un registro
pub trait Record {
    fn field(&self, name: &str) -> Option<String>;
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<String> {
        self.get(name).and_then(value_to_text)
    }
}

/// Igualdad de enumerado sin distinguir mayúsculas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumFilter {
    pub field: String,
    pub value: String,
    /// Valor asumido cuando el registro no trae el campo
    pub default: Option<String>,
}

impl EnumFilter {
    pub fn new(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    fn is_active(&self) -> bool {
        let value = self.value.trim();
        !value.is_empty() && !value.eq_ignore_ascii_case(ALL_SENTINEL)
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        let actual = record
            .field(&self.field)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.default.clone());
        match actual {
            Some(actual) => fold(actual.trim()) == fold(self.value.trim()),
            None => false,
        }
    }
}

/// Búsqueda de texto en uno o varios campos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFilter {
    pub fields: Vec<String>,
    pub needle: String,
}

impl TextFilter {
    pub fn new(fields: &[&str], needle: &str) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            needle: needle.to_string(),
        }
    }

    fn is_active(&self) -> bool {
        !self.needle.trim().is_empty()
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        let needle = fold(self.needle.trim());
        self.fields.iter().any(|field| {
            record
                .field(field)
                .map(|value| fold(&value).contains(&needle))
                .unwrap_or(false)
        })
    }
}

/// Rango de fechas inclusivo sobre el prefijo de fecha de un campo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub field: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(field: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            field: field.to_string(),
            from,
            to,
        }
    }

    fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        let Some(date) = record.field(&self.field).as_deref().and_then(date_prefix) else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Conjunto de filtros de una pantalla
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFilter {
    pub enums: Vec<EnumFilter>,
    pub text: Option<TextFilter>,
    pub date_range: Option<DateRange>,
    pub sort: Option<SortKey>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enum(mut self, filter: EnumFilter) -> Self {
        self.enums.push(filter);
        self
    }

    pub fn with_text(mut self, filter: TextFilter) -> Self {
        self.text = Some(filter);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn sorted_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort = Some(SortKey {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Verifica si un registro pasa todos los filtros activos
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.enums
            .iter()
            .filter(|f| f.is_active())
            .all(|f| f.matches(record))
            && self
                .text
                .as_ref()
                .filter(|f| f.is_active())
                .map_or(true, |f| f.matches(record))
            && self
                .date_range
                .as_ref()
                .filter(|r| r.is_active())
                .map_or(true, |r| r.matches(record))
    }

    /// Aplicar los filtros (y el orden, si hay) a la lista completa
    pub fn apply<R: Record + Clone>(&self, items: &[R]) -> Vec<R> {
        let mut filtered: Vec<R> = items.iter().filter(|r| self.matches(*r)).cloned().collect();

        if let Some(sort) = &self.sort {
            // sort_by es estable: los empates conservan el orden original
            filtered.sort_by(|a, b| {
                match (a.field(&sort.field), b.field(&sort.field)) {
                    // Vacíos al final en ambas direcciones
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(x), Some(y)) => {
                        let ordering = compare_values(&x, &y);
                        match sort.direction {
                            SortDirection::Asc => ordering,
                            SortDirection::Desc => ordering.reverse(),
                        }
                    }
                }
            });
        }

        filtered
    }
}

/// Números como números; fechas ISO y texto como texto
fn compare_values(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => fold(a).cmp(&fold(b)),
    }
}

/// Minúsculas y sin tildes, para comparar `EN REVISIÓN` con `en revision`
pub fn fold(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .collect()
}
