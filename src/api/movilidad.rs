//! Handlers del registro de movilidad

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use reqwest::Method;
use validator::Validate;

use crate::api::{list_page, reloaded};
use crate::dispatch::MutationPayload;
use crate::dto::{ApiResponse, ListQuery, ListResponse};
use crate::list::{ListFilter, RemoteListResource, SortDirection};
use crate::middleware::{RequiredSession, Session};
use crate::models::{MobilityRecord, NewMobilityRecord, Vehicle};
use crate::state::AppState;
use crate::utils::errors::{internal_error, AppResult};

pub fn create_movilidad_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_movilidad).post(create_movilidad))
        .route("/vehiculos", get(list_vehiculos))
}

fn resource(state: &AppState) -> RemoteListResource<MobilityRecord> {
    RemoteListResource::new(
        state.config.upstream.movilidad.clone(),
        MobilityRecord::aliases(),
    )
}

pub async fn list_movilidad(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ListResponse<MobilityRecord>>> {
    let filter = ListFilter::new()
        .with_enum(ListQuery::enum_filter("VEHICULO", query.vehiculo.as_deref()))
        .with_text(query.text_filter(&["CONDUCTOR", "VEHICULO", "LUGAR_ESTACIONAMIENTO"]))
        .with_date_range(query.date_range("FECHA")?)
        .sorted_by("FECHA", SortDirection::Desc);
    let page = list_page(&state, &resource(&state), filter, query, session.token()).await?;
    Ok(Json(page))
}

/// Flota disponible para el selector del formulario
pub async fn list_vehiculos() -> Json<ApiResponse<Vec<&'static str>>> {
    let vehiculos = Vehicle::ALL.iter().map(Vehicle::as_str).collect();
    Json(ApiResponse::success(vehiculos))
}

/// Registrar un recorrido
pub async fn create_movilidad(
    State(state): State<AppState>,
    session: RequiredSession,
    Json(record): Json<NewMobilityRecord>,
) -> AppResult<Json<ListResponse<MobilityRecord>>> {
    record.validate()?;

    let body = serde_json::to_value(&record)
        .map_err(|e| internal_error(&format!("Error serializando registro: {}", e)))?;
    let payload = MutationPayload::from_json(body)?;

    let resource = resource(&state);
    state
        .upstream
        .send(Method::POST, resource.url(), &payload, Some(session.token()))
        .await?;
    log::info!(
        "✅ Recorrido registrado: {} / {}",
        record.vehiculo.as_str(),
        record.conductor
    );
    if let Some(fuel) = record.fuel() {
        log::info!("⛽ Combustible: {} por {}", fuel.tipo, fuel.total);
    }
    if let Some(parking) = record.parking() {
        log::info!("🅿️ Estacionamiento: {}", parking.monto);
    }

    let page = reloaded(&state, &resource, session.token(), "Registro guardado").await?;
    Ok(Json(page))
}
