//! Contexto de sesión
//!
//! El portal no valida tokens: los recibe del cliente en `Authorization`
//! y los reenvía a los servicios externos, que son quienes deciden. Un 401
//! de cualquiera de ellos se traduce a `SESSION_EXPIRED` para que el
//! cliente borre su `token` guardado.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::utils::errors::AppError;

/// Token Bearer opcional de la request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Exigir token; su ausencia equivale a sesión expirada
    pub fn require(self) -> Result<RequiredSession, AppError> {
        match self.token {
            Some(token) => Ok(RequiredSession { token }),
            None => Err(AppError::SessionExpired),
        }
    }
}

/// Extraer el token de un valor `Authorization`
pub fn bearer_token(value: &str) -> Option<String> {
    let value = value.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    // El cliente a veces envía el literal de un valor ausente
    if token.is_empty() || token == "null" || token == "undefined" {
        return None;
    }
    Some(token.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);
        Ok(Session { token })
    }
}

/// Sesión con token obligatorio
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredSession {
    token: String,
}

impl RequiredSession {
    pub fn token(&self) -> &str {
        &self.token
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequiredSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await?.require()
    }
}
