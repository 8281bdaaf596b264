//! Zeus Portal
//!
//! Gateway del portal administrativo: reenvía cada pantalla a su servicio
//! externo, normaliza las respuestas y devuelve páginas ya filtradas.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod dto;
pub mod export;
pub mod list;
pub mod middleware;
pub mod models;
pub mod state;
pub mod utils;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::state::AppState;

/// Margen para los campos de texto de un formulario multipart
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Router completo con CORS, trazas y límite de cuerpo
pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_mul(state.config.max_upload_files.max(1))
        .saturating_add(FORM_OVERHEAD_BYTES);

    api::create_api_router()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}
