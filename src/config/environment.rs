//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno: servidor, CORS,
//! URLs de los servicios externos y límites de formularios.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Errores al leer la configuración
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid number (got '{value}')")]
    InvalidNumber { name: &'static str, value: String },
}

/// URLs de los servicios externos (Cloud Run) a los que se reenvía
#[derive(Debug, Clone)]
pub struct UpstreamUrls {
    pub login: String,
    pub incidencias: String,
    pub movilidad: String,
    pub cajas: String,
    pub permisos: String,
    pub solicitudes: String,
}

impl UpstreamUrls {
    /// Todas las rutas colgando de una misma URL base
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            login: format!("{}/login", base),
            incidencias: format!("{}/incidencias", base),
            movilidad: format!("{}/movilidad", base),
            cajas: format!("{}/cajas", base),
            permisos: format!("{}/permisos", base),
            solicitudes: format!("{}/solicitudes", base),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    pub upstream: UpstreamUrls,
    pub upstream_timeout: Duration,
    pub default_page_size: usize,
    pub admin_aliases: Vec<String>,
    pub max_upload_files: usize,
    pub max_upload_bytes: usize,
}

impl EnvironmentConfig {
    /// Leer la configuración desde variables de entorno
    ///
    /// Cada servicio puede tener su propia URL (`INCIDENCIAS_API_URL`, ...);
    /// si falta, se deriva de `UPSTREAM_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = env::var("UPSTREAM_BASE_URL").ok();
        let service_url = |name: &'static str, suffix: &str| -> Result<String, ConfigError> {
            match env::var(name) {
                Ok(url) => Ok(url),
                Err(_) => base
                    .as_deref()
                    .map(|b| format!("{}/{}", b.trim_end_matches('/'), suffix))
                    .ok_or(ConfigError::Missing(name)),
            }
        };

        let upstream = UpstreamUrls {
            login: service_url("LOGIN_API_URL", "login")?,
            incidencias: service_url("INCIDENCIAS_API_URL", "incidencias")?,
            movilidad: service_url("MOVILIDAD_API_URL", "movilidad")?,
            cajas: service_url("CAJAS_API_URL", "cajas")?,
            permisos: service_url("PERMISOS_API_URL", "permisos")?,
            solicitudes: service_url("SOLICITUDES_API_URL", "solicitudes")?,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let default_level = if environment == "production" { "info" } else { "debug" };

        Ok(Self {
            port: parse_var("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string()),
            cors_origins: split_list(&env::var("CORS_ORIGINS").unwrap_or_default()),
            upstream,
            upstream_timeout: Duration::from_secs(parse_var("UPSTREAM_TIMEOUT_SECS", 30)?),
            default_page_size: parse_var::<usize>("DEFAULT_PAGE_SIZE", 10)?.clamp(1, 100),
            admin_aliases: match env::var("ADMIN_ALIASES") {
                Ok(list) => split_list(&list),
                Err(_) => default_admin_aliases(),
            },
            max_upload_files: parse_var("MAX_UPLOAD_FILES", 3)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            environment,
        })
    }

    /// Configuración de desarrollo con todos los servicios en una URL base
    pub fn local(upstream_base: &str) -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            cors_origins: Vec::new(),
            upstream: UpstreamUrls::from_base(upstream_base),
            upstream_timeout: Duration::from_secs(30),
            default_page_size: 10,
            admin_aliases: default_admin_aliases(),
            max_upload_files: 3,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_admin_aliases() -> Vec<String> {
    vec!["admin".to_string(), "administrador".to_string()]
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}
