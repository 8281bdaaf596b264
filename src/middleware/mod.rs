//! Middleware del sistema
//!
//! Este módulo contiene el contexto de sesión y la configuración de CORS.

pub mod auth;
pub mod cors;

pub use auth::{RequiredSession, Session};
pub use cors::cors_layer;
