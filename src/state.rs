//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::client::UpstreamClient;
use crate::config::environment::EnvironmentConfig;
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: EnvironmentConfig) -> AppResult<Self> {
        let upstream = UpstreamClient::new(config.upstream_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }

    /// Tamaño de página pedido, o el configurado por defecto
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.config.default_page_size)
    }
}
