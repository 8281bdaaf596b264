//! Handlers de autenticación
//!
//! El login se delega al servicio externo; aquí solo se reduce su
//! respuesta a token, módulos y rol. El portal nunca valida el token.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use reqwest::Method;
use validator::Validate;

use crate::auth::interpret_login;
use crate::dispatch::MutationPayload;
use crate::dto::{LoginRequest, LoginResponse, SessionResponse};
use crate::middleware::Session;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/session", get(session))
}

/// Handler de login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request.validate().map_err(AppError::Validation)?;
    log::info!("🔐 Login de '{}'", request.usuario);

    let payload = MutationPayload::new()
        .field("usuario", request.usuario.trim())
        .field("password", request.password.as_str());
    let body = state
        .upstream
        .send(Method::POST, &state.config.upstream.login, &payload, None)
        .await
        .map_err(|e| match e {
            // En el login un 401 son credenciales inválidas, no sesión vencida
            AppError::SessionExpired => {
                AppError::Unauthorized("Usuario o contraseña incorrectos".to_string())
            }
            other => other,
        })?;

    let outcome = interpret_login(&body, request.usuario.trim(), &state.config.admin_aliases)?;
    log::info!(
        "✅ Login exitoso: {} ({} módulos, admin: {}, regla: {:?})",
        outcome.usuario,
        outcome.modulos.len(),
        outcome.is_admin,
        outcome.admin.matched
    );
    Ok(Json(LoginResponse::from(outcome)))
}

/// Indica si el cliente envió un token; el servicio externo lo valida
pub async fn session(session: Session) -> Json<SessionResponse> {
    let authenticated = session.is_authenticated();
    Json(SessionResponse {
        authenticated,
        message: (!authenticated).then(|| "Sesión expirada, vuelva a iniciar sesión".to_string()),
    })
}
