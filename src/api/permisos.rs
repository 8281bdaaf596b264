//! Handlers de permisos de salida

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use reqwest::Method;
use validator::Validate;

use crate::api::form::{form_fields, FormPayload};
use crate::api::{filtered_records, list_page, reloaded};
use crate::dispatch::MutationPayload;
use crate::dto::{ListQuery, ListResponse};
use crate::export::{CsvColumn, CsvDownload};
use crate::list::{ListFilter, RemoteListResource, SortDirection};
use crate::middleware::{RequiredSession, Session};
use crate::models::{LeavePermit, NewLeavePermit};
use crate::state::AppState;
use crate::utils::errors::AppResult;

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

const CSV_COLUMNS: [CsvColumn<LeavePermit>; 8] = [
    CsvColumn::new("ID", |p| text(&p.id)),
    CsvColumn::new("SOLICITANTE", |p| text(&p.solicitante)),
    CsvColumn::new("ÁREA", |p| text(&p.area)),
    CsvColumn::new("INICIO", |p| text(&p.fecha_inicio)),
    CsvColumn::new("FIN", |p| text(&p.fecha_fin)),
    CsvColumn::new("HORAS", |p| {
        p.horas_efectivas().map(|h| format!("{:.1}", h)).unwrap_or_default()
    }),
    CsvColumn::new("MOTIVO", |p| text(&p.motivo)),
    CsvColumn::new("ESTADO", |p| text(&p.estado)),
];

pub fn create_permisos_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_permisos).post(create_permiso))
        .route("/export", get(export_permisos))
}

fn resource(state: &AppState) -> RemoteListResource<LeavePermit> {
    RemoteListResource::new(state.config.upstream.permisos.clone(), LeavePermit::aliases())
}

fn permit_filter(query: &ListQuery) -> AppResult<ListFilter> {
    Ok(ListFilter::new()
        .with_enum(ListQuery::enum_filter("ESTADO", query.estado.as_deref()).with_default("PENDIENTE"))
        .with_enum(ListQuery::enum_filter("AREA", query.area.as_deref()))
        .with_text(query.text_filter(&["SOLICITANTE", "AREA", "MOTIVO"]))
        .with_date_range(query.date_range("FECHA_INICIO")?)
        .sorted_by("FECHA_INICIO", SortDirection::Desc))
}

pub async fn list_permisos(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ListResponse<LeavePermit>>> {
    let filter = permit_filter(&query)?;
    let page = list_page(&state, &resource(&state), filter, query, session.token()).await?;
    Ok(Json(page))
}

pub async fn export_permisos(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<CsvDownload> {
    let filter = permit_filter(&query)?;
    let records = filtered_records(&state, &resource(&state), filter, session.token()).await?;
    log::info!("📄 Exportando {} permisos", records.len());
    Ok(CsvDownload::new("permisos.csv", &records, &CSV_COLUMNS))
}

/// Registrar un permiso (JSON, o multipart si lleva sustento adjunto)
///
/// Límites de adjuntos y orden de fechas se validan antes de llamar al
/// servicio externo.
pub async fn create_permiso(
    State(state): State<AppState>,
    session: RequiredSession,
    FormPayload(form): FormPayload,
) -> AppResult<Json<ListResponse<LeavePermit>>> {
    form.validate_attachments(state.config.max_upload_files, state.config.max_upload_bytes)?;
    let permit: NewLeavePermit = form_fields(&form)?;
    permit.validate()?;

    let payload = MutationPayload {
        fields: permit.to_fields(),
        files: form.files,
    };
    let resource = resource(&state);
    state
        .upstream
        .send(Method::POST, resource.url(), &payload, Some(session.token()))
        .await?;
    log::info!(
        "✅ Permiso registrado para {} ({:?} h)",
        permit.solicitante,
        permit.horas()
    );

    let page = reloaded(&state, &resource, session.token(), "Permiso registrado").await?;
    Ok(Json(page))
}
