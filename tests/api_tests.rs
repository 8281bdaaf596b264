use std::sync::{Arc, Mutex};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use zeus_portal::build_router;
use zeus_portal::config::EnvironmentConfig;
use zeus_portal::state::AppState;

// Servicio externo simulado
//
// Devuelve las formas inconsistentes que entregan los servicios reales y
// guarda cada mutación recibida para poder inspeccionarla.

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    content_type: String,
    body: String,
}

impl Recorded {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    fn all(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.all().pop().expect("no se registró ninguna mutación")
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

async fn record(
    State(recorder): State<Recorder>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    recorder.0.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        body: String::from_utf8_lossy(&body).to_string(),
    });
    Json(json!({"ok": true}))
}

async fn fake_login(Json(body): Json<Value>) -> Response {
    if body["password"] != "secreta" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Credenciales inválidas"})),
        )
            .into_response();
    }
    Json(json!({
        "token": "tok-123",
        "usuario": {
            "nombre": "Ana Pérez",
            "rol": 1,
            "modulos": [{"NOMBRE": "Incidencias"}, {"foo": 1}, "Cajas"]
        }
    }))
    .into_response()
}

async fn fake_incidencias() -> Json<Value> {
    let records = json!([
        {"id": 1, "proforma": "PF-1", "cliente": "Comercial \"El Sol\"", "estado": "PENDIENTE",
         "fecha": "2024-05-02T10:00:00", "culminado": "No"},
        {"id": 2, "proforma": "PF-2", "cliente": "Ferretería Lima", "fecha": "2024-05-10",
         "culminado": "No"},
        {"id": 3, "proforma": "PF-3", "cliente": "Minera Sur", "estado": "COMPLETADO",
         "fecha": "2024-04-01", "culminado": "Si"}
    ]);
    // Lista serializada dentro de un string
    Json(json!({"result": records.to_string()}))
}

async fn fake_movilidad(headers: HeaderMap) -> Response {
    match bearer(&headers).as_deref() {
        None => (StatusCode::UNAUTHORIZED, Json(json!({"message": "Token inválido"}))).into_response(),
        Some("forma-rara") => Json(json!({"status": "ok"})).into_response(),
        Some(_) => Json(json!([{
            "fecha": "2024-06-01", "unidad": "HILUX", "chofer": "Luis",
            "km_inicial": 100, "km_final": 150
        }]))
        .into_response(),
    }
}

async fn fake_productos(headers: HeaderMap) -> Response {
    if bearer(&headers).as_deref() == Some("roto") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Base de datos caída"})),
        )
            .into_response();
    }
    Json(json!({"data": [
        {"id_producto": 881, "producto": "Caja 40x30", "categoria": "CARTON", "stock": "120"},
        {"id_producto": 882, "producto": "Cinta", "categoria": "ACCESORIOS", "stock": 5}
    ]}))
    .into_response()
}

async fn fake_reservas() -> Json<Value> {
    Json(json!({"data": [{
        "id_reserva": "R-1", "id_producto": 881, "producto": "Caja 40x30",
        "cantidad": 10, "usuario": "jramos", "fecha": "2024-06-02"
    }]}))
}

async fn fake_permisos() -> Json<Value> {
    Json(json!({"records": [{
        "id_permiso": 1, "trabajador": "Carla", "area": "VENTAS",
        "FECHA_HORA_INICIO": "2024-02-10 08:00:00", "FECHA_HORA_FIN": "2024-02-10 10:30:00",
        "estado": "APROBADO"
    }]}))
}

async fn fake_solicitudes() -> Json<Value> {
    Json(json!({"total": 3, "items": [
        {"ID": "S-1", "solicitante": "María", "area_origen": "VENTAS", "area_destino": "ALMACEN",
         "REQUERIMIENTO_2": "Falta firma", "estado": "EN PROCESO", "fecha": "2024-06-01"},
        {"ID": "S-2", "REQUERIMIENTO_2": "a", "REQUERIMIENTO_3": "b", "estado": "PENDIENTE",
         "area_destino": "SISTEMAS"},
        {"ID": "S-3", "estado": "COMPLETADO", "area_destino": "SISTEMAS"}
    ]}))
}

async fn spawn_upstream() -> (String, Recorder) {
    let recorder = Recorder::default();
    let upstream = Router::new()
        .route("/login", post(fake_login))
        .route("/incidencias", get(fake_incidencias))
        .route("/incidencias/:id", put(record))
        .route("/movilidad", get(fake_movilidad).post(record))
        .route("/cajas/productos", get(fake_productos))
        .route("/cajas/productos/:id", put(record))
        .route("/cajas/reservas", get(fake_reservas))
        .route("/cajas/reservas/devolver", post(record))
        .route("/permisos", get(fake_permisos).post(record))
        .route("/solicitudes", get(fake_solicitudes).post(record))
        .route("/solicitudes/:id", put(record))
        .with_state(recorder.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });
    (format!("http://{}", addr), recorder)
}

// Función helper para crear la app de test
async fn create_test_app() -> (Router, Recorder) {
    let (base, recorder) = spawn_upstream().await;
    let state = AppState::new(EnvironmentConfig::local(&base)).unwrap();
    (build_router(state), recorder)
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

async fn call(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_app().await;
    let response = call(&app, get_request("/health", None)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
}

#[tokio::test]
async fn test_login_normalizes_modules_and_role() {
    let (app, _) = create_test_app().await;
    let response = call(
        &app,
        json_request(
            Method::POST,
            "/api/login",
            None,
            json!({"usuario": "aperez", "password": "secreta"}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["token"], "tok-123");
    assert_eq!(body["usuario"], "Ana Pérez");
    assert_eq!(body["modulos"], json!(["incidencias", "cajas"]));
    assert_eq!(body["is_admin"], true);
    assert_eq!(body["admin_rule"], "numeric_role_one");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let (app, _) = create_test_app().await;
    let response = call(
        &app,
        json_request(
            Method::POST,
            "/api/login",
            None,
            json!({"usuario": "aperez", "password": "otra"}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_session_reports_token_presence() {
    let (app, _) = create_test_app().await;

    let with_token = call(&app, get_request("/api/session", Some("tok"))).await;
    assert_eq!(with_token.json()["authenticated"], true);

    let without = call(&app, get_request("/api/session", None)).await;
    assert_eq!(without.json()["authenticated"], false);
}

#[tokio::test]
async fn test_incidencias_filter_and_clamped_page() {
    let (app, _) = create_test_app().await;
    let response = call(
        &app,
        get_request("/api/incidencias?estado=pendiente&page_size=1&page=9", None),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["filtros"]["estado"], "pendiente");

    let page = &body["data"];
    assert_eq!(page["total_items"], 2);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["page"], 2);
    // Orden descendente por fecha de emisión: PF-2 (10/05) y luego PF-1 (02/05)
    assert_eq!(page["items"][0]["ID"], "1");
    assert_eq!(page["items"][0]["ESTADO_VERIFICACION"], "PENDIENTE");
}

#[tokio::test]
async fn test_incidencias_date_range() {
    let (app, _) = create_test_app().await;
    let response = call(
        &app,
        get_request("/api/incidencias?desde=2024-05-01&hasta=2024-05-02", None),
    )
    .await;

    let body = response.json();
    assert_eq!(body["data"]["total_items"], 1);
    assert_eq!(body["data"]["items"][0]["NUMERO_PROFORMA"], "PF-1");

    let invalid = call(&app, get_request("/api/incidencias?desde=ayer", None)).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_incidencias_csv_export() {
    let (app, _) = create_test_app().await;
    let response = call(&app, get_request("/api/incidencias/export?q=sol", None)).await;

    assert_eq!(response.status, StatusCode::OK);
    let content_type = response.headers[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/csv"));
    let disposition = response.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("incidencias.csv"));

    let csv_text = response.body.strip_prefix('\u{feff}').unwrap();
    assert!(csv_text.contains("\"Comercial \"\"El Sol\"\"\""));

    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][3], "Comercial \"El Sol\"");
}

#[tokio::test]
async fn test_update_incidencia_requires_session() {
    let (app, recorder) = create_test_app().await;
    let response = call(
        &app,
        json_request(Method::PUT, "/api/incidencias/3", None, json!({"estado": "OBSERVADO"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["code"], "SESSION_EXPIRED");
    assert!(recorder.all().is_empty());
}

#[tokio::test]
async fn test_update_incidencia_any_state_and_reload() {
    let (app, recorder) = create_test_app().await;
    let response = call(
        &app,
        json_request(
            Method::PUT,
            "/api/incidencias/3",
            Some("tok"),
            json!({"estado": "OBSERVADO", "culminado": "si", "observacion": "Falta firma"}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["message"], "Incidencia actualizada");
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["total_items"], 3);

    let sent = recorder.last();
    assert_eq!(sent.method, "PUT");
    assert_eq!(sent.path, "/incidencias/3");
    let fields = sent.json();
    assert_eq!(fields["ESTADO_VERIFICACION"], "OBSERVADO");
    assert_eq!(fields["CULMINADO"], "Si");
    assert_eq!(fields["OBSERVACION"], "Falta firma");
}

#[tokio::test]
async fn test_upstream_401_is_session_expired() {
    let (app, _) = create_test_app().await;
    let response = call(&app, get_request("/api/movilidad", None)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["code"], "SESSION_EXPIRED");
}

#[tokio::test]
async fn test_unrecognized_shape_is_empty_list() {
    let (app, _) = create_test_app().await;
    let response = call(&app, get_request("/api/movilidad", Some("forma-rara"))).await;

    assert_eq!(response.status, StatusCode::OK);
    let page = &response.json()["data"];
    assert_eq!(page["total_items"], 0);
    assert_eq!(page["total_pages"], 1);
}

#[tokio::test]
async fn test_movilidad_list_and_create() {
    let (app, recorder) = create_test_app().await;

    let list = call(&app, get_request("/api/movilidad?vehiculo=hilux", Some("tok"))).await;
    let item = &list.json()["data"]["items"][0];
    assert_eq!(item["VEHICULO"], "HILUX");
    assert_eq!(item["CONDUCTOR"], "Luis");

    let backwards = call(
        &app,
        json_request(
            Method::POST,
            "/api/movilidad",
            Some("tok"),
            json!({"FECHA": "2024-06-02", "VEHICULO": "MOTO", "CONDUCTOR": "Ana",
                   "KM_INICIAL": 200.0, "KM_FINAL": 150.0}),
        ),
    )
    .await;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);
    assert_eq!(backwards.json()["code"], "VALIDATION_ERROR");
    assert!(recorder.all().is_empty());

    let fuel_without_total = call(
        &app,
        json_request(
            Method::POST,
            "/api/movilidad",
            Some("tok"),
            json!({"FECHA": "2024-06-01", "VEHICULO": "MOTO", "CONDUCTOR": "Ana",
                   "KM_INICIAL": 1, "KM_FINAL": 2, "TIPO_COMBUSTIBLE": "DIESEL"}),
        ),
    )
    .await;
    assert_eq!(fuel_without_total.status, StatusCode::BAD_REQUEST);
    assert_eq!(fuel_without_total.json()["code"], "VALIDATION_ERROR");

    let parking_without_amount = call(
        &app,
        json_request(
            Method::POST,
            "/api/movilidad",
            Some("tok"),
            json!({"FECHA": "2024-06-01", "VEHICULO": "MOTO", "CONDUCTOR": "Ana",
                   "KM_INICIAL": 1, "KM_FINAL": 2, "LUGAR_ESTACIONAMIENTO": "Playa Centro"}),
        ),
    )
    .await;
    assert_eq!(parking_without_amount.status, StatusCode::BAD_REQUEST);
    assert!(recorder.all().is_empty());

    let created = call(
        &app,
        json_request(
            Method::POST,
            "/api/movilidad",
            Some("tok"),
            json!({"FECHA": "2024-06-02", "VEHICULO": "MOTO", "CONDUCTOR": "Ana",
                   "KM_INICIAL": 200.0, "KM_FINAL": 260.0, "LIMPIO": true,
                   "TIPO_COMBUSTIBLE": "GASOLINA 90", "TOTAL_COMBUSTIBLE": "45.00"}),
        ),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    let sent = recorder.last().json();
    assert_eq!(sent["VEHICULO"], "MOTO");
    assert_eq!(sent["KM_FINAL"], 260.0);
    assert_eq!(sent["TIPO_COMBUSTIBLE"], "GASOLINA 90");
    assert!(sent.get("TOTAL_COMBUSTIBLE").is_some());
    assert!(sent.get("LUGAR_ESTACIONAMIENTO").is_none());
}

#[tokio::test]
async fn test_cajas_resumen_independent_errors() {
    let (app, _) = create_test_app().await;
    let response = call(&app, get_request("/api/cajas/resumen", Some("roto"))).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["productos"]["data"], Value::Null);
    assert_eq!(body["productos"]["error"], "Base de datos caída");
    assert_eq!(body["reservas"]["error"], Value::Null);
    assert_eq!(body["reservas"]["data"]["total_items"], 1);
}

#[tokio::test]
async fn test_cajas_productos_ids_are_text() {
    let (app, _) = create_test_app().await;
    let response = call(&app, get_request("/api/cajas/productos?categoria=carton", None)).await;

    let page = &response.json()["data"];
    assert_eq!(page["total_items"], 1);
    assert_eq!(page["items"][0]["ID"], "881");
    assert_eq!(page["items"][0]["CANTIDAD"], 120.0);
}

#[tokio::test]
async fn test_devolucion_cannot_exceed_reserved() {
    let (app, recorder) = create_test_app().await;

    let too_much = call(
        &app,
        json_request(
            Method::POST,
            "/api/cajas/reservas/devolver",
            Some("tok"),
            json!({"id_reserva": "R-1", "cantidad": 12, "responsable": "jramos"}),
        ),
    )
    .await;
    assert_eq!(too_much.status, StatusCode::BAD_REQUEST);
    assert!(recorder.all().is_empty());

    let unknown = call(
        &app,
        json_request(
            Method::POST,
            "/api/cajas/reservas/devolver",
            Some("tok"),
            json!({"id_reserva": "R-9", "cantidad": 1, "responsable": "jramos"}),
        ),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let ok = call(
        &app,
        json_request(
            Method::POST,
            "/api/cajas/reservas/devolver",
            Some("tok"),
            json!({"id_reserva": "R-1", "cantidad": 4, "responsable": "jramos"}),
        ),
    )
    .await;
    assert_eq!(ok.status, StatusCode::OK);
    let sent = recorder.last();
    assert_eq!(sent.path, "/cajas/reservas/devolver");
    assert_eq!(sent.json()["ID_RESERVA"], "R-1");
    assert_eq!(sent.json()["CANTIDAD"], 4.0);
}

fn multipart_body(boundary: &str, fields: &[(&str, &str)], file: (&str, &str, &str)) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            boundary, name, value
        ));
    }
    let (name, file_name, content) = file;
    body.push_str(&format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n{}\r\n",
        boundary, name, file_name, content
    ));
    body.push_str(&format!("--{}--\r\n", boundary));
    body
}

#[tokio::test]
async fn test_permiso_multipart_with_computed_hours() {
    let (app, recorder) = create_test_app().await;
    let boundary = "XBOUNDARY";
    let body = multipart_body(
        boundary,
        &[
            ("solicitante", "Carla Mendoza"),
            ("fecha_inicio", "2024-01-01T09:00"),
            ("fecha_fin", "2024-01-01T13:00"),
            ("motivo", "Cita médica"),
        ],
        ("archivo", "sustento.txt", "constancia"),
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/permisos")
        .header(header::AUTHORIZATION, "Bearer tok")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = call(&app, request).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);

    let sent = recorder.last();
    assert_eq!(sent.method, "POST");
    assert!(sent.content_type.starts_with("multipart/form-data"));
    assert!(sent.body.contains("sustento.txt"));
    assert!(sent.body.contains("name=\"HORAS\""));
    assert!(sent.body.contains("4.0"));
}

#[tokio::test]
async fn test_permiso_end_before_start_is_rejected() {
    let (app, recorder) = create_test_app().await;
    let response = call(
        &app,
        json_request(
            Method::POST,
            "/api/permisos",
            Some("tok"),
            json!({"solicitante": "Carla", "fecha_inicio": "2024-01-01T09:00",
                   "fecha_fin": "2024-01-01T01:00", "motivo": "Trámite"}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(recorder.all().is_empty());
}

#[tokio::test]
async fn test_permisos_export_computes_hours() {
    let (app, _) = create_test_app().await;
    let response = call(&app, get_request("/api/permisos/export?estado=aprobado", None)).await;

    assert_eq!(response.status, StatusCode::OK);
    let csv_text = response.body.trim_start_matches('\u{feff}');
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "Carla");
    assert_eq!(&rows[0][5], "2.5");
}

#[tokio::test]
async fn test_solicitudes_area_filter() {
    let (app, _) = create_test_app().await;
    let response = call(&app, get_request("/api/solicitudes?area=almacen", None)).await;

    let page = &response.json()["data"];
    assert_eq!(page["total_items"], 1);
    assert_eq!(page["items"][0]["ID"], "S-1");
    assert_eq!(page["items"][0]["ESTADO"], "EN PROCESO");
}

#[tokio::test]
async fn test_solicitud_response_uses_next_round() {
    let (app, recorder) = create_test_app().await;
    let response = call(
        &app,
        json_request(
            Method::PUT,
            "/api/solicitudes/S-1/respuesta",
            Some("tok"),
            json!({"requerimiento": "Adjunto la firma"}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let sent = recorder.last();
    assert_eq!(sent.path, "/solicitudes/S-1");
    let fields = sent.json();
    assert_eq!(fields["REQUERIMIENTO_3"], "Adjunto la firma");
    assert_eq!(fields["RONDA"], 3);
}

#[tokio::test]
async fn test_solicitud_response_rejections() {
    let (app, recorder) = create_test_app().await;
    let respond = |id: &str, body: Value| {
        json_request(
            Method::PUT,
            &format!("/api/solicitudes/{}/respuesta", id),
            Some("tok"),
            body,
        )
    };

    // Ambas rondas usadas
    let full = call(&app, respond("S-2", json!({"requerimiento": "otra"}))).await;
    assert_eq!(full.status, StatusCode::BAD_REQUEST);

    // Solicitud cerrada
    let closed = call(&app, respond("S-3", json!({"requerimiento": "otra"}))).await;
    assert_eq!(closed.status, StatusCode::BAD_REQUEST);

    // Ronda pedida distinta a la libre
    let wrong_round =
        call(&app, respond("S-1", json!({"requerimiento": "otra", "ronda": "2"}))).await;
    assert_eq!(wrong_round.status, StatusCode::BAD_REQUEST);

    let missing = call(&app, respond("S-9", json!({"requerimiento": "otra"}))).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    assert!(recorder.all().is_empty());
}

#[tokio::test]
async fn test_connection_error_is_bad_gateway() {
    // Puerto reservado y liberado: nadie escucha ahí
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let state = AppState::new(EnvironmentConfig::local(&format!("http://{}", addr))).unwrap();
    let app = build_router(state);
    let response = call(&app, get_request("/api/permisos", None)).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.json()["code"], "CONNECTION_ERROR");
}
