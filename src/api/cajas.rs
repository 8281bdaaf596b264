//! Handlers del stock de cajas (Malvinas)
//!
//! Productos y reservas se cargan por separado: cada sección tiene su
//! propio estado de error y una falla en una no oculta la otra.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use reqwest::Method;
use serde::Serialize;
use validator::Validate;

use crate::api::{item_url, list_page, reloaded};
use crate::dispatch::MutationPayload;
use crate::dto::{ListQuery, ListResponse};
use crate::list::{ListFilter, Page, RemoteListResource, SortDirection};
use crate::middleware::{RequiredSession, Session};
use crate::models::{check_transfer, Product, ProductUpdate, Reservation, TransferRequest};
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, internal_error, not_found_error, AppResult};

pub fn create_cajas_router() -> Router<AppState> {
    Router::new()
        .route("/productos", get(list_productos))
        .route("/productos/:id", put(update_producto))
        .route("/reservas", get(list_reservas))
        .route("/reservas/devolver", post(devolver_reserva))
        .route("/resumen", get(resumen))
}

fn productos(state: &AppState) -> RemoteListResource<Product> {
    RemoteListResource::new(
        format!("{}/productos", state.config.upstream.cajas.trim_end_matches('/')),
        Product::aliases(),
    )
}

fn reservas(state: &AppState) -> RemoteListResource<Reservation> {
    RemoteListResource::new(
        format!("{}/reservas", state.config.upstream.cajas.trim_end_matches('/')),
        Reservation::aliases(),
    )
}

fn product_filter(query: &ListQuery) -> ListFilter {
    ListFilter::new()
        .with_enum(ListQuery::enum_filter("CATEGORIA", query.categoria.as_deref()))
        .with_text(query.text_filter(&["CODIGO", "NOMBRE", "CATEGORIA"]))
        .sorted_by("NOMBRE", SortDirection::Asc)
}

fn reservation_filter(query: &ListQuery) -> AppResult<ListFilter> {
    Ok(ListFilter::new()
        .with_text(query.text_filter(&["PRODUCTO", "RESPONSABLE", "ID_PRODUCTO"]))
        .with_date_range(query.date_range("FECHA")?)
        .sorted_by("FECHA", SortDirection::Desc))
}

pub async fn list_productos(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ListResponse<Product>>> {
    let filter = product_filter(&query);
    let page = list_page(&state, &productos(&state), filter, query, session.token()).await?;
    Ok(Json(page))
}

pub async fn list_reservas(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ListResponse<Reservation>>> {
    let filter = reservation_filter(&query)?;
    let page = list_page(&state, &reservas(&state), filter, query, session.token()).await?;
    Ok(Json(page))
}

/// Una sección del resumen: página o error, nunca ambos
#[derive(Debug, Serialize)]
pub struct Section<T> {
    pub data: Option<Page<T>>,
    pub error: Option<String>,
}

impl<T> From<AppResult<ListResponse<T>>> for Section<T> {
    fn from(result: AppResult<ListResponse<T>>) -> Self {
        match result {
            Ok(response) => Section {
                data: Some(response.data),
                error: None,
            },
            Err(e) => Section {
                data: None,
                error: Some(e.user_message()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Resumen {
    pub success: bool,
    pub productos: Section<Product>,
    pub reservas: Section<Reservation>,
}

/// Productos y reservas en paralelo, con errores independientes
pub async fn resumen(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Resumen>> {
    let productos_resource = productos(&state);
    let reservas_resource = reservas(&state);
    let reservation_filter = reservation_filter(&query)?;

    let (productos_result, reservas_result) = futures::join!(
        list_page(
            &state,
            &productos_resource,
            product_filter(&query),
            query.clone(),
            session.token()
        ),
        list_page(
            &state,
            &reservas_resource,
            reservation_filter,
            query.clone(),
            session.token()
        ),
    );

    if let Err(e) = &productos_result {
        log::warn!("⚠️ Resumen: productos no disponibles: {}", e);
    }
    if let Err(e) = &reservas_result {
        log::warn!("⚠️ Resumen: reservas no disponibles: {}", e);
    }

    let productos = Section::from(productos_result);
    let reservas = Section::from(reservas_result);
    Ok(Json(Resumen {
        success: productos.error.is_none() && reservas.error.is_none(),
        productos,
        reservas,
    }))
}

/// Editar límite de descuento o cantidad de un producto
pub async fn update_producto(
    State(state): State<AppState>,
    session: RequiredSession,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> AppResult<Json<ListResponse<Product>>> {
    update.validate()?;
    if update.limite_descuento.is_none() && update.cantidad.is_none() {
        return Err(bad_request_error("No hay cambios para guardar"));
    }

    let body = serde_json::to_value(&update)
        .map_err(|e| internal_error(&format!("Error serializando producto: {}", e)))?;
    let payload = MutationPayload::from_json(body)?;

    let resource = productos(&state);
    state
        .upstream
        .send(Method::PUT, &item_url(resource.url(), &id), &payload, Some(session.token()))
        .await?;
    log::info!("✅ Producto {} actualizado", id);

    let page = reloaded(&state, &resource, session.token(), "Producto actualizado").await?;
    Ok(Json(page))
}

/// Devolver (total o parcialmente) una reserva
///
/// Se recarga la reserva antes de enviar para comprobar que la cantidad
/// no supere lo reservado; el servicio externo vuelve a validar.
pub async fn devolver_reserva(
    State(state): State<AppState>,
    session: RequiredSession,
    Json(request): Json<TransferRequest>,
) -> AppResult<Json<ListResponse<Reservation>>> {
    request.validate()?;

    let resource = reservas(&state);
    let current = resource
        .load(&state.upstream, &[], Some(session.token()))
        .await?;
    let reservation = current
        .iter()
        .find(|r| r.id.as_deref().map(str::trim) == Some(request.id_reserva.trim()))
        .ok_or_else(|| not_found_error("Reserva", &request.id_reserva))?;
    check_transfer(reservation.cantidad_reservada.unwrap_or(0.0), request.cantidad)?;

    let body = serde_json::to_value(&request)
        .map_err(|e| internal_error(&format!("Error serializando devolución: {}", e)))?;
    let payload = MutationPayload::from_json(body)?;
    state
        .upstream
        .send(
            Method::POST,
            &format!("{}/devolver", resource.url()),
            &payload,
            Some(session.token()),
        )
        .await?;
    log::info!(
        "✅ Devolución de {} en reserva {}",
        request.cantidad,
        request.id_reserva
    );

    let page = reloaded(&state, &resource, session.token(), "Devolución registrada").await?;
    Ok(Json(page))
}
