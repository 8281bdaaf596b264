//! Cliente HTTP para los servicios externos
//!
//! Todas las llamadas a los servicios de Cloud Run pasan por aquí: se
//! agrega el token Bearer, se acota el tiempo de espera y se traduce
//! cualquier falla a `AppError` con un mensaje legible.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::dispatch::MutationPayload;
use crate::utils::errors::{AppError, AppResult};

/// Claves donde los servicios suelen poner el mensaje de error
const ERROR_MESSAGE_KEYS: [&str; 5] = ["message", "error", "detail", "mensaje", "msg"];

/// Cliente HTTP compartido por todos los recursos
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// Crear cliente con el tiempo de espera configurado
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Error creando cliente HTTP: {}", e)))?;
        Ok(Self { client })
    }

    /// GET que devuelve el cuerpo JSON
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(String, String)],
        token: Option<&str>,
    ) -> AppResult<Value> {
        log::debug!("📤 GET {}", url);
        let mut request = self.client.get(url).query(query);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(connection_error)?;
        read_json(response).await
    }

    /// PUT/POST con cuerpo JSON o multipart según el payload
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        payload: &MutationPayload,
        token: Option<&str>,
    ) -> AppResult<Value> {
        log::info!(
            "📤 {} {} ({})",
            method,
            url,
            if payload.is_multipart() { "multipart" } else { "json" }
        );
        let mut request = self.client.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request = if payload.is_multipart() {
            request.multipart(payload.to_multipart()?)
        } else {
            request.json(&payload.fields)
        };
        let response = request.send().await.map_err(connection_error)?;
        read_json(response).await
    }
}

fn connection_error(error: reqwest::Error) -> AppError {
    log::error!("❌ Error de red: {}", error);
    AppError::Connection(error.to_string())
}

/// Leer la respuesta; un cuerpo vacío con 2xx se toma como `null`
async fn read_json(response: reqwest::Response) -> AppResult<Value> {
    let status = response.status();
    let body = response.text().await.map_err(connection_error)?;

    if !status.is_success() {
        return Err(status_error(status, &body));
    }

    log::debug!("📥 {} ({} bytes)", status, body.len());
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| {
        log::error!("❌ Respuesta JSON inválida: {}", e);
        AppError::Upstream {
            status: StatusCode::BAD_GATEWAY.as_u16(),
            message: "Respuesta inválida del servidor".to_string(),
        }
    })
}

/// Traducir un estado no exitoso a `AppError`
pub fn status_error(status: StatusCode, body: &str) -> AppError {
    if status == StatusCode::UNAUTHORIZED {
        return AppError::SessionExpired;
    }
    AppError::Upstream {
        status: status.as_u16(),
        message: error_message(status, body),
    }
}

/// Mensaje de error: JSON, luego texto plano, luego `Error {status}`
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = find_message(&value) {
            return message;
        }
    }
    let text = body.trim();
    // Páginas HTML de error del balanceador no sirven como mensaje
    if !text.is_empty() && !text.starts_with('<') && !text.starts_with('{') {
        return text.chars().take(300).collect();
    }
    format!("Error {}", status.as_u16())
}

fn find_message(value: &Value) -> Option<String> {
    ERROR_MESSAGE_KEYS.iter().find_map(|key| match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        nested @ Value::Object(_) => find_message(nested),
        _ => None,
    })
}
