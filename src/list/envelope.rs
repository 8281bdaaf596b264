//! Desenvolver respuestas de listas
//!
//! Los servicios externos devuelven la misma lista con formas distintas
//! según el despliegue. Aquí se resuelven una sola vez, en el borde del
//! cliente, en lugar de olfatear la forma en cada pantalla.

use serde_json::Value;
use thiserror::Error;

/// Claves de sobre conocidas, en orden de preferencia
const ENVELOPE_KEYS: [&str; 3] = ["data", "records", "result"];

/// Límite de anidamiento (`{data: {data: {...}}}`)
const MAX_DEPTH: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    #[error("forma de respuesta no reconocida: {0}")]
    Unrecognized(&'static str),

    #[error("`result` contiene JSON inválido: {0}")]
    InvalidEmbeddedJson(String),
}

/// Formas en que llega una lista
#[derive(Debug, PartialEq)]
pub enum ListEnvelope {
    /// `[...]`
    Bare(Vec<Value>),
    /// `{data: ...}`, `{records: ...}` o `{result: ...}`
    Wrapped { key: String, inner: Box<ListEnvelope> },
    /// `{result: "<json>"}`
    EmbeddedJson(Box<ListEnvelope>),
    /// Objeto cuyo primer valor tipo arreglo es la lista
    FirstArray { key: String, items: Vec<Value> },
}

impl ListEnvelope {
    /// Clasificar una respuesta
    pub fn parse(value: Value) -> Result<Self, ShapeError> {
        Self::parse_at(value, 0)
    }

    fn parse_at(value: Value, depth: usize) -> Result<Self, ShapeError> {
        if depth > MAX_DEPTH {
            return Err(ShapeError::Unrecognized("anidamiento excesivo"));
        }

        match value {
            Value::Array(items) => Ok(ListEnvelope::Bare(items)),
            Value::String(text) => {
                let parsed: Value = serde_json::from_str(&text)
                    .map_err(|e| ShapeError::InvalidEmbeddedJson(e.to_string()))?;
                Ok(ListEnvelope::EmbeddedJson(Box::new(Self::parse_at(
                    parsed,
                    depth + 1,
                )?)))
            }
            Value::Object(mut map) => {
                // Un sobre conocido sin lista no descarta las demás claves
                let mut first_error = None;
                for key in ENVELOPE_KEYS {
                    let is_candidate = matches!(
                        map.get(key),
                        Some(Value::Array(_)) | Some(Value::Object(_)) | Some(Value::String(_))
                    );
                    if !is_candidate {
                        continue;
                    }
                    if let Some(inner) = map.remove(key) {
                        match Self::parse_at(inner, depth + 1) {
                            Ok(inner) => {
                                return Ok(ListEnvelope::Wrapped {
                                    key: key.to_string(),
                                    inner: Box::new(inner),
                                })
                            }
                            Err(e) => {
                                log::debug!("🔍 Sobre `{}` sin lista: {}", key, e);
                                first_error.get_or_insert(e);
                            }
                        }
                    }
                }

                // `preserve_order` mantiene el orden del documento original
                let first_array = map
                    .into_iter()
                    .find_map(|(key, value)| match value {
                        Value::Array(items) => Some((key, items)),
                        _ => None,
                    });
                match first_array {
                    Some((key, items)) => Ok(ListEnvelope::FirstArray { key, items }),
                    None => Err(first_error
                        .unwrap_or(ShapeError::Unrecognized("objeto sin arreglos"))),
                }
            }
            Value::Null => Err(ShapeError::Unrecognized("null")),
            Value::Bool(_) => Err(ShapeError::Unrecognized("booleano")),
            Value::Number(_) => Err(ShapeError::Unrecognized("número")),
        }
    }

    /// Registros contenidos en el sobre
    pub fn into_records(self) -> Vec<Value> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped { inner, .. } => inner.into_records(),
            ListEnvelope::EmbeddedJson(inner) => inner.into_records(),
            ListEnvelope::FirstArray { items, .. } => items,
        }
    }
}

/// Clasificar y extraer los registros en un solo paso
pub fn unwrap_records(value: Value) -> Result<Vec<Value>, ShapeError> {
    ListEnvelope::parse(value).map(ListEnvelope::into_records)
}
