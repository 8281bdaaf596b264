//! Solicitudes / incidencias entre áreas
//!
//! Una solicitud nace en un área de emisión y se deriva a un área de
//! recepción. Admite hasta dos rondas de respuesta adicionales
//! (`REQUERIMIENTO_2`/`ARCHIVO_2` y `REQUERIMIENTO_3`/`ARCHIVO_3`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::list::filter::{fold, Record};
use crate::list::normalize::{value_to_text, FieldAliases};
use crate::models::lenient;

/// Estado de una solicitud
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    #[default]
    Pendiente,
    EnProceso,
    Atendido,
    Rechazado,
    Completado,
    Otro(String),
}

impl RequestStatus {
    pub const KNOWN: [RequestStatus; 5] = [
        RequestStatus::Pendiente,
        RequestStatus::EnProceso,
        RequestStatus::Atendido,
        RequestStatus::Rechazado,
        RequestStatus::Completado,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pendiente => "PENDIENTE",
            RequestStatus::EnProceso => "EN PROCESO",
            RequestStatus::Atendido => "ATENDIDO",
            RequestStatus::Rechazado => "RECHAZADO",
            RequestStatus::Completado => "COMPLETADO",
            RequestStatus::Otro(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match fold(value.trim()).as_str() {
            "" | "pendiente" => RequestStatus::Pendiente,
            "en proceso" | "en_proceso" => RequestStatus::EnProceso,
            "atendido" => RequestStatus::Atendido,
            "rechazado" => RequestStatus::Rechazado,
            "completado" => RequestStatus::Completado,
            _ => RequestStatus::Otro(value.trim().to_string()),
        }
    }

    /// Estados que ya no admiten respuestas
    pub fn is_closed(&self) -> bool {
        matches!(self, RequestStatus::Rechazado | RequestStatus::Completado)
    }
}

impl From<String> for RequestStatus {
    fn from(value: String) -> Self {
        RequestStatus::parse(&value)
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Ronda de respuesta suplementaria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ResponseRound {
    Second,
    Third,
}

impl ResponseRound {
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            2 => Some(ResponseRound::Second),
            3 => Some(ResponseRound::Third),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            ResponseRound::Second => 2,
            ResponseRound::Third => 3,
        }
    }

    pub fn requirement_key(&self) -> &'static str {
        match self {
            ResponseRound::Second => "REQUERIMIENTO_2",
            ResponseRound::Third => "REQUERIMIENTO_3",
        }
    }

    pub fn file_key(&self) -> &'static str {
        match self {
            ResponseRound::Second => "ARCHIVO_2",
            ResponseRound::Third => "ARCHIVO_3",
        }
    }
}

impl From<ResponseRound> for u8 {
    fn from(round: ResponseRound) -> Self {
        round.number()
    }
}

/// Solicitud registrada
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestIncidence {
    #[serde(rename = "ID", deserialize_with = "lenient::opt_text", default)]
    pub id: Option<String>,
    #[serde(rename = "NUMERO_SOLICITUD", deserialize_with = "lenient::opt_text", default)]
    pub numero_solicitud: Option<String>,
    #[serde(rename = "SOLICITANTE", deserialize_with = "lenient::opt_text", default)]
    pub solicitante: Option<String>,
    #[serde(rename = "AREA_EMISION", deserialize_with = "lenient::opt_text", default)]
    pub area_emision: Option<String>,
    #[serde(rename = "AREA_RECEPCION", deserialize_with = "lenient::opt_text", default)]
    pub area_recepcion: Option<String>,
    #[serde(rename = "MOTIVO", deserialize_with = "lenient::opt_text", default)]
    pub motivo: Option<String>,
    #[serde(rename = "REQUERIMIENTO", deserialize_with = "lenient::opt_text", default)]
    pub requerimiento: Option<String>,
    #[serde(rename = "REQUERIMIENTO_2", deserialize_with = "lenient::opt_text", default)]
    pub requerimiento_2: Option<String>,
    #[serde(rename = "ARCHIVO_2", deserialize_with = "lenient::opt_text", default)]
    pub archivo_2: Option<String>,
    #[serde(rename = "REQUERIMIENTO_3", deserialize_with = "lenient::opt_text", default)]
    pub requerimiento_3: Option<String>,
    #[serde(rename = "ARCHIVO_3", deserialize_with = "lenient::opt_text", default)]
    pub archivo_3: Option<String>,
    #[serde(rename = "ESTADO", default)]
    pub estado: RequestStatus,
    #[serde(rename = "FECHA_REGISTRO", deserialize_with = "lenient::opt_text", default)]
    pub fecha_registro: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.trim().is_empty())
}

impl RequestIncidence {
    pub fn aliases() -> FieldAliases {
        FieldAliases::new()
            .alias("ID", &["id", "Id", "ID_SOLICITUD", "id_solicitud"])
            .alias("NUMERO_SOLICITUD", &["numero_solicitud", "N_SOLICITUD", "nro_solicitud"])
            .alias("SOLICITANTE", &["solicitante", "USUARIO", "usuario"])
            .alias("AREA_EMISION", &["area_emision", "AREA_ORIGEN", "area_origen"])
            .alias("AREA_RECEPCION", &["area_recepcion", "AREA_DESTINO", "area_destino"])
            .alias("MOTIVO", &["motivo", "ASUNTO", "asunto"])
            .alias("REQUERIMIENTO", &["requerimiento", "DESCRIPCION", "descripcion"])
            .alias("REQUERIMIENTO_2", &["requerimiento_2", "requerimiento2"])
            .alias("ARCHIVO_2", &["archivo_2", "archivo2"])
            .alias("REQUERIMIENTO_3", &["requerimiento_3", "requerimiento3"])
            .alias("ARCHIVO_3", &["archivo_3", "archivo3"])
            .alias("ESTADO", &["estado", "status"])
            .alias("FECHA_REGISTRO", &["fecha_registro", "FECHA", "fecha", "created_at"])
    }

    /// Identificador visible: `ID` o, en su defecto, `NUMERO_SOLICITUD`
    pub fn key(&self) -> Option<&str> {
        self.id.as_deref().or(self.numero_solicitud.as_deref())
    }

    /// Siguiente ronda libre; `None` cuando ambas ya se usaron
    pub fn next_response_round(&self) -> Option<ResponseRound> {
        if !filled(&self.requerimiento_2) && !filled(&self.archivo_2) {
            Some(ResponseRound::Second)
        } else if !filled(&self.requerimiento_3) && !filled(&self.archivo_3) {
            Some(ResponseRound::Third)
        } else {
            None
        }
    }
}

impl Record for RequestIncidence {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "ID" => self.key().map(str::to_string),
            "NUMERO_SOLICITUD" => self.numero_solicitud.clone(),
            "SOLICITANTE" => self.solicitante.clone(),
            "AREA_EMISION" => self.area_emision.clone(),
            "AREA_RECEPCION" => self.area_recepcion.clone(),
            "MOTIVO" => self.motivo.clone(),
            "REQUERIMIENTO" => self.requerimiento.clone(),
            "REQUERIMIENTO_2" => self.requerimiento_2.clone(),
            "REQUERIMIENTO_3" => self.requerimiento_3.clone(),
            "ESTADO" => Some(self.estado.as_str().to_string()),
            "FECHA_REGISTRO" => self.fecha_registro.clone(),
            other => self.extra.get(other).and_then(value_to_text),
        }
    }
}

/// Nueva solicitud desde el formulario
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRequest {
    #[serde(alias = "SOLICITANTE")]
    #[validate(length(min = 1, max = 120))]
    pub solicitante: String,
    #[serde(alias = "AREA_EMISION")]
    #[validate(length(min = 1, max = 120))]
    pub area_emision: String,
    #[serde(alias = "AREA_RECEPCION")]
    #[validate(length(min = 1, max = 120))]
    pub area_recepcion: String,
    #[serde(alias = "MOTIVO")]
    #[validate(length(min = 1, max = 500))]
    pub motivo: String,
    #[serde(alias = "REQUERIMIENTO")]
    #[validate(length(min = 1, max = 4000))]
    pub requerimiento: String,
}

impl NewRequest {
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("SOLICITANTE".into(), self.solicitante.trim().into());
        fields.insert("AREA_EMISION".into(), self.area_emision.trim().into());
        fields.insert("AREA_RECEPCION".into(), self.area_recepcion.trim().into());
        fields.insert("MOTIVO".into(), self.motivo.trim().into());
        fields.insert("REQUERIMIENTO".into(), self.requerimiento.trim().into());
        fields.insert("ESTADO".into(), RequestStatus::Pendiente.as_str().into());
        fields
    }
}
