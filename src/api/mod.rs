//! API endpoints
//!
//! Este módulo contiene los endpoints de la API. Cada pantalla del portal
//! tiene su router; todos comparten el mismo ciclo cargar → filtrar →
//! paginar y recargan la lista completa después de cada mutación.

pub mod auth;
pub mod cajas;
pub mod form;
pub mod incidencias;
pub mod movilidad;
pub mod permisos;
pub mod solicitudes;

use axum::{response::Json, routing::get, Router};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::dto::{ListQuery, ListResponse};
use crate::list::{ListFilter, ListView, Record, RemoteListResource};
use crate::state::AppState;
use crate::utils::errors::AppResult;

/// Crear el router principal de la API
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/incidencias", incidencias::create_incidencias_router())
        .nest("/api/movilidad", movilidad::create_movilidad_router())
        .nest("/api/cajas", cajas::create_cajas_router())
        .nest("/api/permisos", permisos::create_permisos_router())
        .nest("/api/solicitudes", solicitudes::create_solicitudes_router())
        .merge(auth::create_auth_router())
}

/// Health check
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "zeus-portal",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Cargar la lista completa y devolver la página pedida
pub(crate) async fn list_page<T>(
    state: &AppState,
    resource: &RemoteListResource<T>,
    filter: ListFilter,
    query: ListQuery,
    token: Option<&str>,
) -> AppResult<ListResponse<T>>
where
    T: Record + Clone + DeserializeOwned + Serialize,
{
    let mut view = ListView::new(state.page_size(query.page_size));
    view.set_filter(filter);
    view.reload(resource, &state.upstream, &[], token).await?;
    view.set_page(query.page());
    Ok(ListResponse::new(view.current_page(), query))
}

/// Todos los registros filtrados (para exportar)
pub(crate) async fn filtered_records<T>(
    state: &AppState,
    resource: &RemoteListResource<T>,
    filter: ListFilter,
    token: Option<&str>,
) -> AppResult<Vec<T>>
where
    T: Record + Clone + DeserializeOwned,
{
    let items = resource.load(&state.upstream, &[], token).await?;
    Ok(filter.apply(&items))
}

/// Primera página sin filtros, tras una mutación exitosa
pub(crate) async fn reloaded<T>(
    state: &AppState,
    resource: &RemoteListResource<T>,
    token: &str,
    message: &str,
) -> AppResult<ListResponse<T>>
where
    T: Record + Clone + DeserializeOwned + Serialize,
{
    let page = list_page(state, resource, ListFilter::new(), ListQuery::default(), Some(token)).await?;
    Ok(page.with_message(message))
}

/// `{base}/{id}` con el id codificado
pub(crate) fn item_url(base: &str, id: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), urlencoding::encode(id.trim()))
}
