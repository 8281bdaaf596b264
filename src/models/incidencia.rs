//! Proformas / actas con seguimiento de incidencias

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::list::filter::{fold, Record};
use crate::list::normalize::FieldAliases;
use crate::models::lenient;

/// Estado de verificación de una proforma
///
/// Cualquier estado puede pasar a cualquier otro: el servicio externo es
/// el único que decide si la transición es válida.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VerificationState {
    #[default]
    Pendiente,
    EnRevision,
    Notificado,
    Completado,
    Observado,
    /// Valor que el portal no conoce; se conserva tal cual
    Otro(String),
}

impl VerificationState {
    pub const KNOWN: [VerificationState; 5] = [
        VerificationState::Pendiente,
        VerificationState::EnRevision,
        VerificationState::Notificado,
        VerificationState::Completado,
        VerificationState::Observado,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            VerificationState::Pendiente => "PENDIENTE",
            VerificationState::EnRevision => "EN REVISIÓN",
            VerificationState::Notificado => "NOTIFICADO",
            VerificationState::Completado => "COMPLETADO",
            VerificationState::Observado => "OBSERVADO",
            VerificationState::Otro(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match fold(value.trim()).as_str() {
            "" | "pendiente" => VerificationState::Pendiente,
            "en revision" | "en_revision" => VerificationState::EnRevision,
            "notificado" => VerificationState::Notificado,
            "completado" => VerificationState::Completado,
            "observado" => VerificationState::Observado,
            _ => VerificationState::Otro(value.trim().to_string()),
        }
    }
}

impl From<String> for VerificationState {
    fn from(value: String) -> Self {
        VerificationState::parse(&value)
    }
}

impl From<VerificationState> for String {
    fn from(state: VerificationState) -> Self {
        state.as_str().to_string()
    }
}

/// Registro de proforma/acta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    #[serde(rename = "ID", deserialize_with = "lenient::opt_text", default)]
    pub id: Option<String>,
    #[serde(rename = "NUMERO_PROFORMA", deserialize_with = "lenient::opt_text", default)]
    pub numero_proforma: Option<String>,
    #[serde(rename = "NUMERO_COMPROBANTE", deserialize_with = "lenient::opt_text", default)]
    pub numero_comprobante: Option<String>,
    #[serde(rename = "CLIENTE", deserialize_with = "lenient::opt_text", default)]
    pub cliente: Option<String>,
    #[serde(rename = "FECHA_EMISION", deserialize_with = "lenient::opt_text", default)]
    pub fecha_emision: Option<String>,
    #[serde(rename = "FECHA_NOTIFICACION", deserialize_with = "lenient::opt_text", default)]
    pub fecha_notificacion: Option<String>,
    #[serde(rename = "FECHA_REGISTRO", deserialize_with = "lenient::opt_text", default)]
    pub fecha_registro: Option<String>,
    #[serde(rename = "SOLUCION", deserialize_with = "lenient::opt_text", default)]
    pub solucion: Option<String>,
    #[serde(rename = "OBSERVACION", deserialize_with = "lenient::opt_text", default)]
    pub observacion: Option<String>,
    /// Ausente → `PENDIENTE`
    #[serde(rename = "ESTADO_VERIFICACION", default)]
    pub estado: VerificationState,
    #[serde(rename = "CULMINADO", deserialize_with = "lenient::opt_flag", default)]
    pub culminado: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IncidentRecord {
    pub fn aliases() -> FieldAliases {
        FieldAliases::new()
            .alias("ID", &["id", "Id", "ID_PROFORMA", "id_proforma"])
            .alias("NUMERO_PROFORMA", &["numero_proforma", "PROFORMA", "proforma", "N_PROFORMA"])
            .alias("NUMERO_COMPROBANTE", &["numero_comprobante", "COMPROBANTE", "comprobante"])
            .alias("CLIENTE", &["cliente", "RAZON_SOCIAL", "razon_social"])
            .alias("FECHA_EMISION", &["fecha_emision", "FECHA", "fecha"])
            .alias("FECHA_NOTIFICACION", &["fecha_notificacion"])
            .alias("FECHA_REGISTRO", &["fecha_registro", "created_at"])
            .alias("SOLUCION", &["solucion"])
            .alias("OBSERVACION", &["observacion", "OBSERVACIONES", "observaciones"])
            .alias("ESTADO_VERIFICACION", &["estado_verificacion", "ESTADO", "estado"])
            .alias("CULMINADO", &["culminado"])
    }

    pub fn is_culminado(&self) -> bool {
        self.culminado == Some(true)
    }
}

impl Record for IncidentRecord {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "ID" => self.id.clone(),
            "NUMERO_PROFORMA" => self.numero_proforma.clone(),
            "NUMERO_COMPROBANTE" => self.numero_comprobante.clone(),
            "CLIENTE" => self.cliente.clone(),
            "FECHA_EMISION" => self.fecha_emision.clone(),
            "FECHA_NOTIFICACION" => self.fecha_notificacion.clone(),
            "FECHA_REGISTRO" => self.fecha_registro.clone(),
            "SOLUCION" => self.solucion.clone(),
            "OBSERVACION" => self.observacion.clone(),
            "ESTADO_VERIFICACION" => Some(self.estado.as_str().to_string()),
            "CULMINADO" => Some(lenient::flag_text(self.culminado)).filter(|s| !s.is_empty()),
            other => self.extra.get(other).and_then(crate::list::normalize::value_to_text),
        }
    }
}

/// Cambios desde el modal de edición
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct IncidentUpdate {
    #[serde(alias = "ESTADO_VERIFICACION", alias = "ESTADO")]
    pub estado: Option<VerificationState>,
    #[serde(alias = "CULMINADO")]
    #[validate(custom = "validate_culminado")]
    pub culminado: Option<String>,
    #[serde(alias = "SOLUCION")]
    #[validate(length(max = 2000))]
    pub solucion: Option<String>,
    #[serde(alias = "OBSERVACION")]
    #[validate(length(max = 2000))]
    pub observacion: Option<String>,
    #[serde(alias = "FECHA_NOTIFICACION")]
    #[validate(custom = "validate_fecha")]
    pub fecha_notificacion: Option<String>,
    #[serde(alias = "NUMERO_COMPROBANTE")]
    pub numero_comprobante: Option<String>,
}

fn validate_culminado(value: &str) -> Result<(), validator::ValidationError> {
    match lenient::parse_flag(value) {
        Some(_) => Ok(()),
        None => Err(validator::ValidationError::new("culminado")),
    }
}

fn validate_fecha(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    crate::utils::validation::validate_date(value).map(|_| ())
}

impl IncidentUpdate {
    /// Campos en el formato del servicio externo; solo los enviados
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(estado) = &self.estado {
            fields.insert("ESTADO_VERIFICACION".into(), estado.as_str().into());
        }
        if let Some(culminado) = self.culminado.as_deref().and_then(lenient::parse_flag) {
            fields.insert("CULMINADO".into(), if culminado { "Si" } else { "No" }.into());
        }
        let texts = [
            ("SOLUCION", &self.solucion),
            ("OBSERVACION", &self.observacion),
            ("FECHA_NOTIFICACION", &self.fecha_notificacion),
            ("NUMERO_COMPROBANTE", &self.numero_comprobante),
        ];
        for (key, value) in texts {
            if let Some(value) = value {
                fields.insert(key.into(), value.trim().into());
            }
        }
        fields
    }
}
