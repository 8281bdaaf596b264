//! Despachador de mutaciones
//!
//! Un formulario se envía como JSON cuando no lleva archivos y como
//! `multipart/form-data` cuando sí. Tras un envío exitoso se recarga la
//! lista completa; no hay parches optimistas que revertir.

use serde_json::{Map, Value};

use crate::list::normalize::value_to_text;
use crate::utils::errors::{AppError, AppResult};

/// Archivo adjunto de un formulario
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Cuerpo de una mutación
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationPayload {
    pub fields: Map<String, Value>,
    pub files: Vec<Attachment>,
}

impl MutationPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construir desde un valor JSON de tipo objeto
    pub fn from_json(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                files: Vec::new(),
            }),
            _ => Err(AppError::BadRequest(
                "El cuerpo debe ser un objeto JSON".to_string(),
            )),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.files.push(attachment);
        self
    }

    pub fn is_multipart(&self) -> bool {
        !self.files.is_empty()
    }

    /// Texto de un campo, si existe y no está vacío
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .and_then(value_to_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Rechazar el envío antes de llamar a la red si los adjuntos exceden límites
    pub fn validate_attachments(&self, max_files: usize, max_bytes: usize) -> AppResult<()> {
        if self.files.len() > max_files {
            return Err(AppError::BadRequest(format!(
                "Se permiten como máximo {} archivos",
                max_files
            )));
        }
        if let Some(file) = self.files.iter().find(|f| f.bytes.len() > max_bytes) {
            return Err(AppError::BadRequest(format!(
                "El archivo '{}' supera el tamaño máximo de {} MB",
                file.file_name,
                max_bytes / (1024 * 1024)
            )));
        }
        if let Some(file) = self.files.iter().find(|f| f.bytes.is_empty()) {
            return Err(AppError::BadRequest(format!(
                "El archivo '{}' está vacío",
                file.file_name
            )));
        }
        Ok(())
    }

    /// Formulario multipart equivalente
    pub fn to_multipart(&self) -> AppResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (key, value) in &self.fields {
            let text = match value {
                Value::Null => continue,
                other => value_to_text(other).unwrap_or_else(|| other.to_string()),
            };
            form = form.text(key.clone(), text);
        }
        for file in &self.files {
            let mut part = reqwest::multipart::Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone());
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type).map_err(|e| {
                    AppError::BadRequest(format!("Tipo de archivo inválido: {}", e))
                })?;
            }
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}
