use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{AdminRule, LoginOutcome};

// Login request (el formulario del portal envía `usuario`)
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "USUARIO")]
    #[validate(length(min = 1, max = 100))]
    pub usuario: String,
    #[serde(alias = "PASSWORD", alias = "contrasena")]
    #[validate(length(min = 1, max = 200))]
    pub password: String,
}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub usuario: String,
    pub modulos: Vec<String>,
    pub is_admin: bool,
    /// Regla que decidió el rol (`null` si ninguna aplicó)
    pub admin_rule: Option<AdminRule>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            success: true,
            token: outcome.token,
            usuario: outcome.usuario,
            modulos: outcome.modulos,
            is_admin: outcome.is_admin,
            admin_rule: outcome.admin.matched,
        }
    }
}

// Estado de la sesión del cliente
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
