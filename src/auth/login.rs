//! Interpretación de la respuesta del servicio de login

use serde::Serialize;
use serde_json::Value;

use crate::auth::modules::{extract_modules, find_key, infer_admin, AdminDecision};
use crate::list::normalize::value_to_text;
use crate::utils::errors::{AppError, AppResult};

const TOKEN_KEYS: [&str; 4] = ["token", "access_token", "accessToken", "TOKEN"];

const DISPLAY_NAME_KEYS: [&str; 8] = [
    "nombre_completo", "NOMBRE_COMPLETO", "nombre", "NOMBRE", "name", "usuario", "username", "USUARIO",
];

/// Sesión que recibe el cliente después del login
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub usuario: String,
    pub modulos: Vec<String>,
    pub is_admin: bool,
    pub admin: AdminDecision,
}

/// Reducir el payload del login a token, módulos y rol
pub fn interpret_login(
    payload: &Value,
    fallback_username: &str,
    admin_aliases: &[String],
) -> AppResult<LoginOutcome> {
    let token = find_key(payload, &TOKEN_KEYS)
        .and_then(value_to_text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("El servicio de login no devolvió token".to_string())
        })?;

    let usuario = find_key(payload, &DISPLAY_NAME_KEYS)
        .and_then(value_to_text)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback_username.to_string());

    let modulos = extract_modules(payload);

    // El alias se compara contra lo que escribió el usuario al iniciar sesión
    let mut facts = payload.clone();
    if let Value::Object(map) = &mut facts {
        map.entry("username")
            .or_insert_with(|| Value::String(fallback_username.to_string()));
    }
    let admin = infer_admin(&facts, &modulos, admin_aliases);

    Ok(LoginOutcome {
        token,
        usuario,
        is_admin: admin.is_admin,
        modulos,
        admin,
    })
}
