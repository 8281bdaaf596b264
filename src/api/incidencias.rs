//! Handlers de proformas / actas con incidencias

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};
use reqwest::Method;
use validator::Validate;

use crate::api::{filtered_records, item_url, list_page, reloaded};
use crate::dispatch::MutationPayload;
use crate::dto::{ListQuery, ListResponse};
use crate::export::{CsvColumn, CsvDownload};
use crate::list::{ListFilter, RemoteListResource, SortDirection};
use crate::middleware::{RequiredSession, Session};
use crate::models::lenient::flag_text;
use crate::models::{IncidentRecord, IncidentUpdate};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppResult};

const SEARCH_FIELDS: [&str; 5] = [
    "NUMERO_PROFORMA",
    "NUMERO_COMPROBANTE",
    "CLIENTE",
    "SOLUCION",
    "OBSERVACION",
];

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

const CSV_COLUMNS: [CsvColumn<IncidentRecord>; 10] = [
    CsvColumn::new("ID", |r| text(&r.id)),
    CsvColumn::new("N° PROFORMA", |r| text(&r.numero_proforma)),
    CsvColumn::new("N° COMPROBANTE", |r| text(&r.numero_comprobante)),
    CsvColumn::new("CLIENTE", |r| text(&r.cliente)),
    CsvColumn::new("FECHA EMISIÓN", |r| text(&r.fecha_emision)),
    CsvColumn::new("FECHA NOTIFICACIÓN", |r| text(&r.fecha_notificacion)),
    CsvColumn::new("ESTADO", |r| r.estado.as_str().to_string()),
    CsvColumn::new("CULMINADO", |r| flag_text(r.culminado)),
    CsvColumn::new("SOLUCIÓN", |r| text(&r.solucion)),
    CsvColumn::new("OBSERVACIÓN", |r| text(&r.observacion)),
];

pub fn create_incidencias_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_incidencias))
        .route("/export", get(export_incidencias))
        .route("/:id", put(update_incidencia))
}

fn resource(state: &AppState) -> RemoteListResource<IncidentRecord> {
    RemoteListResource::new(
        state.config.upstream.incidencias.clone(),
        IncidentRecord::aliases(),
    )
}

fn incident_filter(query: &ListQuery) -> AppResult<ListFilter> {
    Ok(ListFilter::new()
        .with_enum(
            ListQuery::enum_filter("ESTADO_VERIFICACION", query.estado.as_deref())
                .with_default("PENDIENTE"),
        )
        .with_enum(ListQuery::enum_filter("CULMINADO", query.culminado.as_deref()).with_default("NO"))
        .with_text(query.text_filter(&SEARCH_FIELDS))
        .with_date_range(query.date_range("FECHA_EMISION")?)
        .sorted_by("FECHA_EMISION", SortDirection::Desc))
}

/// Listar proformas filtradas y paginadas
pub async fn list_incidencias(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ListResponse<IncidentRecord>>> {
    log::info!("🔍 Listando incidencias: {:?}", query);
    let filter = incident_filter(&query)?;
    let page = list_page(&state, &resource(&state), filter, query, session.token()).await?;
    Ok(Json(page))
}

/// Exportar a CSV la lista filtrada completa
pub async fn export_incidencias(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<CsvDownload> {
    let filter = incident_filter(&query)?;
    let records = filtered_records(&state, &resource(&state), filter, session.token()).await?;
    log::info!("📄 Exportando {} incidencias", records.len());
    Ok(CsvDownload::new("incidencias.csv", &records, &CSV_COLUMNS))
}

/// Guardar los cambios del modal de edición
///
/// Cualquier estado puede pasar a cualquier otro; el servicio externo
/// decide si la transición es válida.
pub async fn update_incidencia(
    State(state): State<AppState>,
    session: RequiredSession,
    Path(id): Path<String>,
    Json(update): Json<IncidentUpdate>,
) -> AppResult<Json<ListResponse<IncidentRecord>>> {
    update.validate()?;
    let fields = update.to_fields();
    if fields.is_empty() {
        return Err(bad_request_error("No hay cambios para guardar"));
    }

    let resource = resource(&state);
    let payload = MutationPayload {
        fields,
        files: Vec::new(),
    };
    state
        .upstream
        .send(Method::PUT, &item_url(resource.url(), &id), &payload, Some(session.token()))
        .await?;
    log::info!("✅ Incidencia {} actualizada", id);

    let page = reloaded(&state, &resource, session.token(), "Incidencia actualizada").await?;
    Ok(Json(page))
}
