//! Registro de movilidad de vehículos

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::list::filter::{fold, Record};
use crate::list::normalize::{value_to_text, FieldAliases};
use crate::models::lenient;

/// Flota fija de la empresa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vehicle {
    #[serde(rename = "HILUX")]
    Hilux,
    #[serde(rename = "FURGON")]
    Furgon,
    #[serde(rename = "MOTO")]
    Moto,
}

impl Vehicle {
    pub const ALL: [Vehicle; 3] = [Vehicle::Hilux, Vehicle::Furgon, Vehicle::Moto];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vehicle::Hilux => "HILUX",
            Vehicle::Furgon => "FURGON",
            Vehicle::Moto => "MOTO",
        }
    }

    /// Reconoce el nombre aunque venga con marca o en minúsculas
    pub fn parse(value: &str) -> Option<Self> {
        let value = fold(value);
        Vehicle::ALL
            .into_iter()
            .find(|v| value.contains(&fold(v.as_str())))
    }
}

/// Compra de combustible asociada a un recorrido
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPurchase {
    #[serde(rename = "TIPO_COMBUSTIBLE")]
    pub tipo: String,
    #[serde(rename = "GALONES", default)]
    pub galones: Option<f64>,
    #[serde(rename = "TOTAL_COMBUSTIBLE")]
    pub total: Decimal,
    #[serde(rename = "FOTO_COMPROBANTE", default)]
    pub foto_comprobante: Option<String>,
}

/// Gasto de estacionamiento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingExpense {
    #[serde(rename = "MONTO_ESTACIONAMIENTO")]
    pub monto: Decimal,
    #[serde(rename = "LUGAR_ESTACIONAMIENTO", default)]
    pub lugar: Option<String>,
}

/// Fila del registro de movilidad (se identifica por su posición)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobilityRecord {
    #[serde(rename = "FECHA", deserialize_with = "lenient::opt_text", default)]
    pub fecha: Option<String>,
    #[serde(rename = "VEHICULO", deserialize_with = "lenient::opt_text", default)]
    pub vehiculo: Option<String>,
    #[serde(rename = "CONDUCTOR", deserialize_with = "lenient::opt_text", default)]
    pub conductor: Option<String>,
    #[serde(rename = "KM_INICIAL", deserialize_with = "lenient::opt_f64", default)]
    pub km_inicial: Option<f64>,
    #[serde(rename = "KM_FINAL", deserialize_with = "lenient::opt_f64", default)]
    pub km_final: Option<f64>,
    #[serde(rename = "LIMPIO", deserialize_with = "lenient::opt_flag", default)]
    pub limpio: Option<bool>,
    #[serde(rename = "BUEN_ESTADO", deserialize_with = "lenient::opt_flag", default)]
    pub buen_estado: Option<bool>,
    #[serde(rename = "TIPO_COMBUSTIBLE", deserialize_with = "lenient::opt_text", default)]
    pub tipo_combustible: Option<String>,
    #[serde(rename = "GALONES", deserialize_with = "lenient::opt_f64", default)]
    pub galones: Option<f64>,
    #[serde(rename = "TOTAL_COMBUSTIBLE", deserialize_with = "lenient::opt_decimal", default)]
    pub total_combustible: Option<Decimal>,
    #[serde(rename = "FOTO_COMPROBANTE", deserialize_with = "lenient::opt_text", default)]
    pub foto_comprobante: Option<String>,
    #[serde(rename = "MONTO_ESTACIONAMIENTO", deserialize_with = "lenient::opt_decimal", default)]
    pub monto_estacionamiento: Option<Decimal>,
    #[serde(rename = "LUGAR_ESTACIONAMIENTO", deserialize_with = "lenient::opt_text", default)]
    pub lugar_estacionamiento: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MobilityRecord {
    pub fn aliases() -> FieldAliases {
        FieldAliases::new()
            .alias("FECHA", &["fecha", "FECHA_REGISTRO", "fecha_registro"])
            .alias("VEHICULO", &["vehiculo", "UNIDAD", "unidad"])
            .alias("CONDUCTOR", &["conductor", "CHOFER", "chofer"])
            .alias("KM_INICIAL", &["km_inicial", "KILOMETRAJE_INICIAL"])
            .alias("KM_FINAL", &["km_final", "KILOMETRAJE_FINAL"])
            .alias("LIMPIO", &["limpio", "LIMPIEZA", "limpieza"])
            .alias("BUEN_ESTADO", &["buen_estado", "ESTADO_VEHICULO"])
            .alias("TIPO_COMBUSTIBLE", &["tipo_combustible", "COMBUSTIBLE"])
            .alias("GALONES", &["galones"])
            .alias("TOTAL_COMBUSTIBLE", &["total_combustible", "TOTAL"])
            .alias("FOTO_COMPROBANTE", &["foto_comprobante", "IMAGEN_COMPROBANTE", "url_imagen"])
            .alias("MONTO_ESTACIONAMIENTO", &["monto_estacionamiento", "ESTACIONAMIENTO"])
            .alias("LUGAR_ESTACIONAMIENTO", &["lugar_estacionamiento"])
    }

    /// Kilómetros recorridos, si ambos odómetros están presentes
    pub fn recorrido(&self) -> Option<f64> {
        Some(self.km_final? - self.km_inicial?)
    }

    pub fn fuel(&self) -> Option<FuelPurchase> {
        Some(FuelPurchase {
            tipo: self.tipo_combustible.clone()?,
            galones: self.galones,
            total: self.total_combustible?,
            foto_comprobante: self.foto_comprobante.clone(),
        })
    }

    pub fn parking(&self) -> Option<ParkingExpense> {
        Some(ParkingExpense {
            monto: self.monto_estacionamiento?,
            lugar: self.lugar_estacionamiento.clone(),
        })
    }
}

impl Record for MobilityRecord {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "FECHA" => self.fecha.clone(),
            "VEHICULO" => self.vehiculo.clone(),
            "CONDUCTOR" => self.conductor.clone(),
            "KM_INICIAL" => self.km_inicial.map(|v| v.to_string()),
            "KM_FINAL" => self.km_final.map(|v| v.to_string()),
            "RECORRIDO" => self.recorrido().map(|v| v.to_string()),
            "LIMPIO" => self.limpio.map(|f| lenient::flag_text(Some(f))),
            "BUEN_ESTADO" => self.buen_estado.map(|f| lenient::flag_text(Some(f))),
            "TIPO_COMBUSTIBLE" => self.tipo_combustible.clone(),
            "TOTAL_COMBUSTIBLE" => self.total_combustible.map(|d| d.to_string()),
            "MONTO_ESTACIONAMIENTO" => self.monto_estacionamiento.map(|d| d.to_string()),
            other => self.extra.get(other).and_then(value_to_text),
        }
    }
}

/// Nuevo registro desde el formulario de movilidad
///
/// Combustible y estacionamiento llegan como campos sueltos; un grupo con
/// algún campo presente tiene que estar completo.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_odometer"))]
#[validate(schema(function = "validate_fuel"))]
#[validate(schema(function = "validate_parking"))]
pub struct NewMobilityRecord {
    #[serde(rename = "FECHA")]
    #[validate(custom = "crate::utils::validation::validate_not_empty")]
    pub fecha: String,
    #[serde(rename = "VEHICULO")]
    pub vehiculo: Vehicle,
    #[serde(rename = "CONDUCTOR")]
    #[validate(length(min = 1, max = 120))]
    pub conductor: String,
    #[serde(rename = "KM_INICIAL")]
    #[validate(range(min = 0.0))]
    pub km_inicial: f64,
    #[serde(rename = "KM_FINAL")]
    #[validate(range(min = 0.0))]
    pub km_final: f64,
    #[serde(rename = "LIMPIO", default)]
    pub limpio: bool,
    #[serde(rename = "BUEN_ESTADO", default)]
    pub buen_estado: bool,
    #[serde(
        rename = "TIPO_COMBUSTIBLE",
        deserialize_with = "lenient::opt_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub tipo_combustible: Option<String>,
    #[serde(rename = "GALONES", default, skip_serializing_if = "Option::is_none")]
    pub galones: Option<f64>,
    #[serde(rename = "TOTAL_COMBUSTIBLE", default, skip_serializing_if = "Option::is_none")]
    pub total_combustible: Option<Decimal>,
    #[serde(
        rename = "FOTO_COMPROBANTE",
        deserialize_with = "lenient::opt_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub foto_comprobante: Option<String>,
    #[serde(rename = "MONTO_ESTACIONAMIENTO", default, skip_serializing_if = "Option::is_none")]
    pub monto_estacionamiento: Option<Decimal>,
    #[serde(
        rename = "LUGAR_ESTACIONAMIENTO",
        deserialize_with = "lenient::opt_text",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lugar_estacionamiento: Option<String>,
}

impl NewMobilityRecord {
    fn has_fuel_fields(&self) -> bool {
        self.tipo_combustible.is_some()
            || self.galones.is_some()
            || self.total_combustible.is_some()
            || self.foto_comprobante.is_some()
    }

    fn has_parking_fields(&self) -> bool {
        self.monto_estacionamiento.is_some() || self.lugar_estacionamiento.is_some()
    }

    /// Compra de combustible, solo si el grupo está completo
    pub fn fuel(&self) -> Option<FuelPurchase> {
        Some(FuelPurchase {
            tipo: self.tipo_combustible.clone()?,
            galones: self.galones,
            total: self.total_combustible?,
            foto_comprobante: self.foto_comprobante.clone(),
        })
    }

    pub fn parking(&self) -> Option<ParkingExpense> {
        Some(ParkingExpense {
            monto: self.monto_estacionamiento?,
            lugar: self.lugar_estacionamiento.clone(),
        })
    }
}

fn validate_odometer(record: &NewMobilityRecord) -> Result<(), ValidationError> {
    if record.km_final < record.km_inicial {
        let mut error = ValidationError::new("km_final");
        error.message = Some("El kilometraje final no puede ser menor al inicial".into());
        return Err(error);
    }
    Ok(())
}

fn validate_fuel(record: &NewMobilityRecord) -> Result<(), ValidationError> {
    if !record.has_fuel_fields() {
        return Ok(());
    }
    let complete = record.tipo_combustible.is_some()
        && record.total_combustible.map_or(false, |total| total > Decimal::ZERO)
        && record.galones.map_or(true, |galones| galones >= 0.0);
    if !complete {
        let mut error = ValidationError::new("combustible");
        error.message = Some("La compra de combustible requiere tipo y total".into());
        return Err(error);
    }
    Ok(())
}

fn validate_parking(record: &NewMobilityRecord) -> Result<(), ValidationError> {
    if !record.has_parking_fields() {
        return Ok(());
    }
    match record.monto_estacionamiento {
        Some(monto) if monto >= Decimal::ZERO => Ok(()),
        _ => {
            let mut error = ValidationError::new("estacionamiento");
            error.message = Some("El estacionamiento requiere un monto válido".into());
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vehicle_parse() {
        assert_eq!(Vehicle::parse("Toyota Hilux"), Some(Vehicle::Hilux));
        assert_eq!(Vehicle::parse("moto"), Some(Vehicle::Moto));
        assert_eq!(Vehicle::parse("bicicleta"), None);
    }

    #[test]
    fn test_record_sub_records() {
        let normalized = MobilityRecord::aliases().normalize_record(json!({
            "fecha": "2024-06-01",
            "unidad": "FURGON",
            "chofer": "Luis Quispe",
            "km_inicial": "12000",
            "km_final": 12085.5,
            "limpio": "SI",
            "COMBUSTIBLE": "DIESEL",
            "TOTAL": "150.50",
            "url_imagen": "https://storage/img.jpg"
        }));
        let record: MobilityRecord = serde_json::from_value(normalized).unwrap();
        assert_eq!(record.recorrido(), Some(85.5));
        assert_eq!(record.limpio, Some(true));
        assert_eq!(record.buen_estado, None);

        let fuel = record.fuel().unwrap();
        assert_eq!(fuel.tipo, "DIESEL");
        assert_eq!(fuel.total, Decimal::new(15050, 2));
        assert!(record.parking().is_none());
        assert_eq!(record.field("CONDUCTOR").as_deref(), Some("Luis Quispe"));
    }

    #[test]
    fn test_new_record_validation() {
        let valid: NewMobilityRecord = serde_json::from_value(json!({
            "FECHA": "2024-06-01",
            "VEHICULO": "MOTO",
            "CONDUCTOR": "Ana Torres",
            "KM_INICIAL": 100.0,
            "KM_FINAL": 140.0,
            "LIMPIO": true
        }))
        .unwrap();
        assert!(valid.validate().is_ok());
        assert!(valid.fuel().is_none());
        assert!(valid.parking().is_none());

        let backwards = NewMobilityRecord {
            km_final: 90.0,
            ..valid.clone()
        };
        assert!(backwards.validate().is_err());

        let missing_driver = NewMobilityRecord {
            conductor: String::new(),
            ..valid
        };
        assert!(missing_driver.validate().is_err());
    }

    #[test]
    fn test_unknown_vehicle_is_rejected() {
        let result: Result<NewMobilityRecord, _> = serde_json::from_value(json!({
            "FECHA": "2024-06-01",
            "VEHICULO": "AVION",
            "CONDUCTOR": "Ana",
            "KM_INICIAL": 1.0,
            "KM_FINAL": 2.0
        }));
        assert!(result.is_err());
    }

    fn base_form() -> serde_json::Map<String, Value> {
        let value = json!({
            "FECHA": "2024-06-01",
            "VEHICULO": "MOTO",
            "CONDUCTOR": "Ana",
            "KM_INICIAL": 1,
            "KM_FINAL": 2
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn form_with(extra: Value) -> NewMobilityRecord {
        let mut form = base_form();
        if let Value::Object(extra) = extra {
            form.extend(extra);
        }
        serde_json::from_value(Value::Object(form)).unwrap()
    }

    #[test]
    fn test_partial_fuel_is_rejected_not_dropped() {
        let record = form_with(json!({"TIPO_COMBUSTIBLE": "DIESEL"}));
        assert_eq!(record.tipo_combustible.as_deref(), Some("DIESEL"));
        assert!(record.validate().is_err());

        let record = form_with(json!({"TOTAL_COMBUSTIBLE": "80.00"}));
        assert!(record.validate().is_err());

        let record = form_with(json!({"TIPO_COMBUSTIBLE": "DIESEL", "TOTAL_COMBUSTIBLE": 0}));
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_partial_parking_is_rejected() {
        let record = form_with(json!({"LUGAR_ESTACIONAMIENTO": "Playa Centro"}));
        assert!(record.validate().is_err());

        let record = form_with(json!({"LUGAR_ESTACIONAMIENTO": "Playa Centro", "MONTO_ESTACIONAMIENTO": 5}));
        assert!(record.validate().is_ok());
        assert_eq!(record.parking().unwrap().monto, Decimal::new(5, 0));
    }

    #[test]
    fn test_complete_fuel_is_forwarded() {
        let record = form_with(json!({
            "TIPO_COMBUSTIBLE": "DIESEL",
            "GALONES": 10.5,
            "TOTAL_COMBUSTIBLE": "150.50"
        }));
        assert!(record.validate().is_ok());
        assert_eq!(record.fuel().unwrap().total, Decimal::new(15050, 2));

        let body = serde_json::to_value(&record).unwrap();
        assert_eq!(body["TIPO_COMBUSTIBLE"], "DIESEL");
        assert_eq!(body["GALONES"], 10.5);
        assert!(body.get("MONTO_ESTACIONAMIENTO").is_none());
    }

    #[test]
    fn test_blank_fuel_type_counts_as_absent() {
        let record = form_with(json!({"TIPO_COMBUSTIBLE": "  "}));
        assert!(record.tipo_combustible.is_none());
        assert!(record.validate().is_ok());
    }
}
