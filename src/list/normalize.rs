//! Normalización de nombres de campo
//!
//! Un mismo campo lógico llega como `ID`, `id` o `Id` según la versión del
//! backend. `FieldAliases` mueve la primera variante presente a la clave
//! canónica antes de deserializar.

use serde_json::{Map, Value};

/// Clave canónica → variantes aceptadas, en orden de preferencia
#[derive(Debug, Clone, Default)]
pub struct FieldAliases {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrar variantes para una clave canónica
    pub fn alias(mut self, canonical: &str, variants: &[&str]) -> Self {
        self.entries.push((
            canonical.to_string(),
            variants.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalizar un registro
    ///
    /// Si la clave canónica ya existe se respeta. Si no, se busca primero
    /// cada variante exacta y luego cualquier clave que coincida sin
    /// distinguir mayúsculas.
    pub fn normalize_record(&self, record: Value) -> Value {
        let Value::Object(mut map) = record else {
            return record;
        };

        for (canonical, variants) in &self.entries {
            if has_value(&map, canonical) {
                continue;
            }
            if let Some(variant) = find_variant(&map, canonical, variants) {
                if let Some(value) = map.remove(&variant) {
                    map.insert(canonical.clone(), value);
                }
            }
        }

        coerce_id(&mut map);
        Value::Object(map)
    }
}

fn has_value(map: &Map<String, Value>, key: &str) -> bool {
    matches!(map.get(key), Some(v) if !v.is_null())
}

/// Clave real de la primera variante presente
fn find_variant(map: &Map<String, Value>, canonical: &str, variants: &[String]) -> Option<String> {
    if let Some(variant) = variants.iter().find(|v| has_value(map, v)) {
        return Some(variant.clone());
    }

    std::iter::once(canonical)
        .chain(variants.iter().map(String::as_str))
        .find_map(|wanted| {
            map.iter()
                .find(|(key, value)| key.eq_ignore_ascii_case(wanted) && !value.is_null())
                .map(|(key, _)| key.clone())
        })
}

/// `ID` siempre como texto para que coincida entre pantallas
fn coerce_id(map: &mut Map<String, Value>) {
    if let Some(id) = map.get_mut("ID") {
        if let Some(text) = value_to_text(id) {
            *id = Value::String(text);
        }
    }
}

/// Representación textual de un escalar JSON
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aliases() -> FieldAliases {
        FieldAliases::new()
            .alias("ID", &["id", "Id", "ID_PRODUCTO"])
            .alias("NOMBRE", &["nombre", "name"])
    }

    #[test]
    fn test_moves_first_variant() {
        let record = aliases().normalize_record(json!({"id": 5, "name": "Casco"}));
        assert_eq!(record["ID"], "5");
        assert_eq!(record["NOMBRE"], "Casco");
        // La variante se mueve, no se duplica
        assert!(record.get("name").is_none());
    }

    #[test]
    fn test_canonical_key_wins() {
        let record =
            aliases().normalize_record(json!({"ID": "A-1", "id": 99, "NOMBRE": "Guantes"}));
        assert_eq!(record["ID"], "A-1");
        assert_eq!(record["NOMBRE"], "Guantes");
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let record = aliases().normalize_record(json!({"Nombre": "Botas", "iD": 3}));
        assert_eq!(record["NOMBRE"], "Botas");
        assert_eq!(record["ID"], "3");
    }

    #[test]
    fn test_null_variant_is_skipped() {
        let record = aliases().normalize_record(json!({"id": null, "ID_PRODUCTO": 12}));
        assert_eq!(record["ID"], "12");
    }

    #[test]
    fn test_non_object_passthrough() {
        assert_eq!(aliases().normalize_record(json!("texto")), json!("texto"));
    }
}
