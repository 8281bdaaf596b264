use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use dotenvy::dotenv;

use zeus_portal::build_router;
use zeus_portal::config::environment::EnvironmentConfig;
use zeus_portal::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = config
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🦺 Zeus Portal - Gateway administrativo");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);
    info!("⏱️ Timeout de servicios externos: {:?}", config.upstream_timeout);

    let addr: SocketAddr = config.server_url().parse()?;
    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Error inicializando el cliente HTTP: {}", e);
            return Err(anyhow::anyhow!("Error de inicialización: {}", e));
        }
    };
    let app = build_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔐 Sesión:");
    info!("   POST /api/login - Login (proxy al servicio de usuarios)");
    info!("   GET  /api/session - Estado de la sesión");
    info!("📋 Incidencias:");
    info!("   GET  /api/incidencias - Listar proformas/actas");
    info!("   PUT  /api/incidencias/:id - Actualizar estado y seguimiento");
    info!("   GET  /api/incidencias/export - Exportar CSV");
    info!("🚗 Movilidad:");
    info!("   GET  /api/movilidad - Listar recorridos");
    info!("   POST /api/movilidad - Registrar recorrido");
    info!("   GET  /api/movilidad/vehiculos - Flota");
    info!("📦 Cajas:");
    info!("   GET  /api/cajas/productos - Listar productos");
    info!("   PUT  /api/cajas/productos/:id - Actualizar producto");
    info!("   GET  /api/cajas/reservas - Listar reservas");
    info!("   POST /api/cajas/reservas/devolver - Devolver reserva");
    info!("   GET  /api/cajas/resumen - Productos y reservas");
    info!("🕐 Permisos:");
    info!("   GET  /api/permisos - Listar permisos");
    info!("   POST /api/permisos - Registrar permiso");
    info!("   GET  /api/permisos/export - Exportar CSV");
    info!("📨 Solicitudes:");
    info!("   GET  /api/solicitudes - Listar solicitudes");
    info!("   POST /api/solicitudes - Registrar solicitud");
    info!("   PUT  /api/solicitudes/:id/respuesta - Responder solicitud");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                e
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
