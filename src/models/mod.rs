//! Modelos de datos
//!
//! Copias efímeras de los registros que devuelven los servicios externos.
//! El portal nunca es dueño de su ciclo de vida: solo los lee, filtra y
//! reenvía cambios.

pub mod cajas;
pub mod incidencia;
pub mod movilidad;
pub mod permisos;
pub mod solicitudes;

pub use cajas::{check_transfer, Product, ProductUpdate, Reservation, TransferRequest};
pub use incidencia::{IncidentRecord, IncidentUpdate, VerificationState};
pub use movilidad::{FuelPurchase, MobilityRecord, NewMobilityRecord, ParkingExpense, Vehicle};
pub use permisos::{horas_solicitadas, LeavePermit, NewLeavePermit};
pub use solicitudes::{NewRequest, RequestIncidence, RequestStatus, ResponseRound};

/// Deserializadores tolerantes: los servicios mezclan números, textos y
/// cadenas vacías para el mismo campo.
pub(crate) mod lenient {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    /// Texto; números y booleanos se convierten, vacío → `None`
    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(match value {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Número desde número o texto (`"1,5"` incluido)
    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        })
    }

    /// Importe decimal desde número o texto
    pub fn opt_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(match value {
            Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
                .ok()
                .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
            Some(Value::String(s)) => Decimal::from_str(s.trim().replace(',', ".").as_str()).ok(),
            _ => None,
        })
    }

    /// Bandera tipo `SI/NO`, `true/false`, `1/0`, `X`
    pub fn opt_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(match value {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::Number(n)) => n.as_i64().map(|i| i != 0),
            Some(Value::String(s)) => parse_flag(&s),
            _ => None,
        })
    }

    pub fn parse_flag(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "si" | "sí" | "s" | "true" | "1" | "x" | "yes" => Some(true),
            "no" | "n" | "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// `Some(true)` → `"SI"`, para la vista y el CSV
    pub fn flag_text(flag: Option<bool>) -> String {
        match flag {
            Some(true) => "SI".to_string(),
            Some(false) => "NO".to_string(),
            None => String::new(),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use serde::Deserialize;
        use serde_json::json;

        #[derive(Deserialize)]
        struct Sample {
            #[serde(default, deserialize_with = "opt_text")]
            text: Option<String>,
            #[serde(default, deserialize_with = "opt_f64")]
            number: Option<f64>,
            #[serde(default, deserialize_with = "opt_decimal")]
            amount: Option<Decimal>,
            #[serde(default, deserialize_with = "opt_flag")]
            flag: Option<bool>,
        }

        #[test]
        fn test_mixed_inputs() {
            let s: Sample = serde_json::from_value(json!({
                "text": 120, "number": "1,5", "amount": "45.90", "flag": "Si"
            }))
            .unwrap();
            assert_eq!(s.text.as_deref(), Some("120"));
            assert_eq!(s.number, Some(1.5));
            assert_eq!(s.amount, Some(Decimal::new(4590, 2)));
            assert_eq!(s.flag, Some(true));
        }

        #[test]
        fn test_empty_and_missing() {
            let s: Sample =
                serde_json::from_value(json!({"text": "  ", "amount": "", "flag": null})).unwrap();
            assert_eq!(s.text, None);
            assert_eq!(s.number, None);
            assert_eq!(s.amount, None);
            assert_eq!(s.flag, None);
        }

        #[test]
        fn test_flag_text() {
            assert_eq!(flag_text(Some(true)), "SI");
            assert_eq!(flag_text(Some(false)), "NO");
            assert_eq!(flag_text(None), "");
        }
    }
}
