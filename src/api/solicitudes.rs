//! Handlers de solicitudes / incidencias entre áreas

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use reqwest::Method;
use validator::Validate;

use crate::api::form::{form_fields, FormPayload};
use crate::api::{item_url, list_page, reloaded};
use crate::dispatch::MutationPayload;
use crate::dto::{ListQuery, ListResponse};
use crate::list::{ListFilter, RemoteListResource, SortDirection};
use crate::middleware::{RequiredSession, Session};
use crate::models::{NewRequest, RequestIncidence, ResponseRound};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult};

const SEARCH_FIELDS: [&str; 6] = [
    "ID",
    "SOLICITANTE",
    "AREA_EMISION",
    "AREA_RECEPCION",
    "MOTIVO",
    "REQUERIMIENTO",
];

pub fn create_solicitudes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_solicitudes).post(create_solicitud))
        .route("/:id/respuesta", put(responder_solicitud))
}

fn resource(state: &AppState) -> RemoteListResource<RequestIncidence> {
    RemoteListResource::new(
        state.config.upstream.solicitudes.clone(),
        RequestIncidence::aliases(),
    )
}

pub async fn list_solicitudes(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ListResponse<RequestIncidence>>> {
    let filter = ListFilter::new()
        .with_enum(ListQuery::enum_filter("ESTADO", query.estado.as_deref()).with_default("PENDIENTE"))
        .with_enum(ListQuery::enum_filter("AREA_RECEPCION", query.area.as_deref()))
        .with_text(query.text_filter(&SEARCH_FIELDS))
        .with_date_range(query.date_range("FECHA_REGISTRO")?)
        .sorted_by("FECHA_REGISTRO", SortDirection::Desc);
    let page = list_page(&state, &resource(&state), filter, query, session.token()).await?;
    Ok(Json(page))
}

/// Registrar una solicitud (con adjuntos opcionales)
pub async fn create_solicitud(
    State(state): State<AppState>,
    session: RequiredSession,
    FormPayload(form): FormPayload,
) -> AppResult<Json<ListResponse<RequestIncidence>>> {
    form.validate_attachments(state.config.max_upload_files, state.config.max_upload_bytes)?;
    let request: NewRequest = form_fields(&form)?;
    request.validate()?;

    let payload = MutationPayload {
        fields: request.to_fields(),
        files: form.files,
    };
    let resource = resource(&state);
    state
        .upstream
        .send(Method::POST, resource.url(), &payload, Some(session.token()))
        .await?;
    log::info!(
        "✅ Solicitud registrada: {} → {}",
        request.area_emision,
        request.area_recepcion
    );

    let page = reloaded(&state, &resource, session.token(), "Solicitud registrada").await?;
    Ok(Json(page))
}

/// Responder una solicitud en su siguiente ronda libre (2 o 3)
///
/// El formulario trae `requerimiento` y, opcionalmente, un archivo. Si
/// incluye `ronda`, debe coincidir con la ronda libre.
pub async fn responder_solicitud(
    State(state): State<AppState>,
    session: RequiredSession,
    Path(id): Path<String>,
    FormPayload(form): FormPayload,
) -> AppResult<Json<ListResponse<RequestIncidence>>> {
    form.validate_attachments(1, state.config.max_upload_bytes)?;
    let requerimiento = form.text("requerimiento").or_else(|| form.text("REQUERIMIENTO"));
    if requerimiento.is_none() && form.files.is_empty() {
        return Err(AppError::BadRequest(
            "La respuesta requiere un texto o un archivo".to_string(),
        ));
    }

    let resource = resource(&state);
    let current = resource
        .load(&state.upstream, &[], Some(session.token()))
        .await?;
    let solicitud = current
        .iter()
        .find(|s| s.key().map(str::trim) == Some(id.trim()))
        .ok_or_else(|| not_found_error("Solicitud", &id))?;

    if solicitud.estado.is_closed() {
        return Err(AppError::BadRequest(format!(
            "La solicitud está {} y no admite respuestas",
            solicitud.estado.as_str()
        )));
    }
    let round = solicitud
        .next_response_round()
        .ok_or_else(|| bad_request_error("La solicitud ya tiene las dos respuestas permitidas"))?;
    if let Some(requested) = form.text("ronda") {
        if requested.parse::<u8>().ok().and_then(ResponseRound::from_number) != Some(round) {
            return Err(AppError::BadRequest(format!(
                "La siguiente ronda disponible es la {}",
                round.number()
            )));
        }
    }

    let mut payload = MutationPayload::new().field("RONDA", round.number());
    if let Some(text) = requerimiento {
        payload = payload.field(round.requirement_key(), text);
    }
    for mut file in form.files {
        file.field = round.file_key().to_string();
        payload = payload.attach(file);
    }

    state
        .upstream
        .send(Method::PUT, &item_url(resource.url(), &id), &payload, Some(session.token()))
        .await?;
    log::info!("✅ Solicitud {} respondida (ronda {})", id, round.number());

    let page = reloaded(&state, &resource, session.token(), "Respuesta registrada").await?;
    Ok(Json(page))
}
