//! Lectura de formularios JSON o multipart
//!
//! Los formularios con adjuntos llegan como `multipart/form-data`; el
//! resto como JSON. Ambos terminan en un `MutationPayload`.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dispatch::{Attachment, MutationPayload};
use crate::utils::errors::{AppError, AppResult};

/// Formulario recibido, sea JSON o multipart
pub struct FormPayload(pub MutationPayload);

#[async_trait]
impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return read_multipart(multipart).await.map(FormPayload);
        }

        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        MutationPayload::from_json(body).map(FormPayload)
    }
}

fn form_error(error: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Formulario inválido: {}", error))
}

/// Convertir un formulario multipart en campos y adjuntos
pub async fn read_multipart(mut multipart: Multipart) -> AppResult<MutationPayload> {
    let mut payload = MutationPayload::new();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(form_error)?;
                // Un input de archivo sin selección llega sin nombre ni contenido
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                log::debug!("📎 Adjunto '{}' ({} bytes)", file_name, bytes.len());
                payload = payload.attach(Attachment {
                    field: name,
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let text = field.text().await.map_err(form_error)?;
                payload = payload.field(&name, text);
            }
        }
    }

    Ok(payload)
}

/// Deserializar los campos del formulario en un tipo del modelo
pub fn form_fields<T: DeserializeOwned>(payload: &MutationPayload) -> AppResult<T> {
    serde_json::from_value(Value::Object(payload.fields.clone()))
        .map_err(|e| AppError::BadRequest(format!("Formulario incompleto: {}", e)))
}
