//! Permisos de salida del personal

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::list::filter::Record;
use crate::list::normalize::{value_to_text, FieldAliases};
use crate::models::lenient;
use crate::utils::validation::validate_datetime_local;

/// Horas solicitadas: resta directa `fin - inicio`, redondeada a un decimal
///
/// No corrige rangos que cruzan la medianoche: `09:00 → 01:00` del mismo
/// día da `-8.0`. La validación del formulario rechaza esos casos.
pub fn horas_solicitadas(inicio: NaiveDateTime, fin: NaiveDateTime) -> f64 {
    let minutes = (fin - inicio).num_minutes() as f64;
    (minutes / 60.0 * 10.0).round() / 10.0
}

/// Permiso registrado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeavePermit {
    #[serde(rename = "ID", deserialize_with = "lenient::opt_text", default)]
    pub id: Option<String>,
    #[serde(rename = "SOLICITANTE", deserialize_with = "lenient::opt_text", default)]
    pub solicitante: Option<String>,
    #[serde(rename = "AREA", deserialize_with = "lenient::opt_text", default)]
    pub area: Option<String>,
    #[serde(rename = "FECHA_INICIO", deserialize_with = "lenient::opt_text", default)]
    pub fecha_inicio: Option<String>,
    #[serde(rename = "FECHA_FIN", deserialize_with = "lenient::opt_text", default)]
    pub fecha_fin: Option<String>,
    #[serde(rename = "HORAS", deserialize_with = "lenient::opt_f64", default)]
    pub horas: Option<f64>,
    #[serde(rename = "MOTIVO", deserialize_with = "lenient::opt_text", default)]
    pub motivo: Option<String>,
    #[serde(rename = "ESTADO", deserialize_with = "lenient::opt_text", default)]
    pub estado: Option<String>,
    #[serde(rename = "FECHA_REGISTRO", deserialize_with = "lenient::opt_text", default)]
    pub fecha_registro: Option<String>,
    #[serde(rename = "ARCHIVO", deserialize_with = "lenient::opt_text", default)]
    pub archivo: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LeavePermit {
    pub fn aliases() -> FieldAliases {
        FieldAliases::new()
            .alias("ID", &["id", "Id", "ID_PERMISO", "id_permiso"])
            .alias("SOLICITANTE", &["solicitante", "TRABAJADOR", "trabajador", "NOMBRE"])
            .alias("AREA", &["area", "AREA_TRABAJO"])
            .alias("FECHA_INICIO", &["fecha_inicio", "FECHA_HORA_INICIO", "inicio"])
            .alias("FECHA_FIN", &["fecha_fin", "FECHA_HORA_FIN", "fin"])
            .alias("HORAS", &["horas", "HORAS_SOLICITADAS", "horas_solicitadas"])
            .alias("MOTIVO", &["motivo", "DESCRIPCION"])
            .alias("ESTADO", &["estado", "status"])
            .alias("FECHA_REGISTRO", &["fecha_registro", "created_at"])
            .alias("ARCHIVO", &["archivo", "URL_ARCHIVO", "url_archivo"])
    }

    /// Horas guardadas o, si faltan, calculadas desde las fechas
    pub fn horas_efectivas(&self) -> Option<f64> {
        self.horas.or_else(|| {
            let inicio = validate_datetime_local(self.fecha_inicio.as_deref()?).ok()?;
            let fin = validate_datetime_local(self.fecha_fin.as_deref()?).ok()?;
            Some(horas_solicitadas(inicio, fin))
        })
    }
}

impl Record for LeavePermit {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "ID" => self.id.clone(),
            "SOLICITANTE" => self.solicitante.clone(),
            "AREA" => self.area.clone(),
            "FECHA_INICIO" => self.fecha_inicio.clone(),
            "FECHA_FIN" => self.fecha_fin.clone(),
            "HORAS" => self.horas_efectivas().map(|h| h.to_string()),
            "MOTIVO" => self.motivo.clone(),
            "ESTADO" => self.estado.clone(),
            "FECHA_REGISTRO" => self.fecha_registro.clone(),
            other => self.extra.get(other).and_then(value_to_text),
        }
    }
}

/// Solicitud de permiso desde el formulario
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_range_order"))]
pub struct NewLeavePermit {
    #[serde(alias = "SOLICITANTE")]
    #[validate(length(min = 1, max = 120))]
    pub solicitante: String,
    #[serde(alias = "AREA", default)]
    pub area: Option<String>,
    #[serde(alias = "FECHA_INICIO")]
    #[validate(custom = "validate_datetime_field")]
    pub fecha_inicio: String,
    #[serde(alias = "FECHA_FIN")]
    #[validate(custom = "validate_datetime_field")]
    pub fecha_fin: String,
    #[serde(alias = "MOTIVO")]
    #[validate(length(min = 1, max = 1000))]
    pub motivo: String,
}

fn validate_datetime_field(value: &str) -> Result<(), ValidationError> {
    validate_datetime_local(value).map(|_| ())
}

fn validate_range_order(permit: &NewLeavePermit) -> Result<(), ValidationError> {
    match (
        validate_datetime_local(&permit.fecha_inicio),
        validate_datetime_local(&permit.fecha_fin),
    ) {
        (Ok(inicio), Ok(fin)) if fin <= inicio => {
            let mut error = ValidationError::new("fecha_fin");
            error.message = Some("La fecha de fin debe ser posterior a la de inicio".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

impl NewLeavePermit {
    /// Horas solicitadas (requiere fechas válidas)
    pub fn horas(&self) -> Option<f64> {
        let inicio = validate_datetime_local(&self.fecha_inicio).ok()?;
        let fin = validate_datetime_local(&self.fecha_fin).ok()?;
        Some(horas_solicitadas(inicio, fin))
    }

    /// Campos en el formato del servicio externo, con `HORAS` calculadas
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("SOLICITANTE".into(), self.solicitante.trim().into());
        if let Some(area) = self.area.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            fields.insert("AREA".into(), area.into());
        }
        fields.insert("FECHA_INICIO".into(), self.fecha_inicio.trim().into());
        fields.insert("FECHA_FIN".into(), self.fecha_fin.trim().into());
        if let Some(horas) = self.horas() {
            fields.insert("HORAS".into(), horas.into());
        }
        fields.insert("MOTIVO".into(), self.motivo.trim().into());
        fields.insert("ESTADO".into(), "PENDIENTE".into());
        fields
    }
}
