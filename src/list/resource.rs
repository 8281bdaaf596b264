//! Recurso de lista remota
//!
//! Une cargador, normalizador, filtros y paginador en una sola pieza
//! parametrizada por endpoint, alias de campos y tipo de registro. Cada
//! pantalla del portal es una instancia de `RemoteListResource`.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::UpstreamClient;
use crate::list::envelope::unwrap_records;
use crate::list::filter::{ListFilter, Record};
use crate::list::normalize::FieldAliases;
use crate::list::paginate::{clamp_page, paginate, Page};
use crate::utils::errors::AppResult;

/// Origen de listas (el cliente HTTP real o un doble en pruebas)
#[async_trait]
pub trait ListSource: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        query: &[(String, String)],
        token: Option<&str>,
    ) -> AppResult<Value>;
}

#[async_trait]
impl ListSource for UpstreamClient {
    async fn fetch(
        &self,
        url: &str,
        query: &[(String, String)],
        token: Option<&str>,
    ) -> AppResult<Value> {
        self.get_json(url, query, token).await
    }
}

/// Lista remota de registros `T`
#[derive(Debug, Clone)]
pub struct RemoteListResource<T> {
    url: String,
    aliases: FieldAliases,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> RemoteListResource<T> {
    pub fn new(url: impl Into<String>, aliases: FieldAliases) -> Self {
        Self {
            url: url.into(),
            aliases,
            _record: PhantomData,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET → desenvolver → normalizar → deserializar
    ///
    /// Una forma de respuesta no reconocida se registra y se trata como
    /// lista vacía. Los registros que no deserializan se omiten.
    pub async fn load<S: ListSource + ?Sized>(
        &self,
        source: &S,
        query: &[(String, String)],
        token: Option<&str>,
    ) -> AppResult<Vec<T>> {
        let body = source.fetch(&self.url, query, token).await?;
        Ok(self.decode(body))
    }

    /// Convertir un cuerpo ya recibido en registros
    pub fn decode(&self, body: Value) -> Vec<T> {
        let raw = match unwrap_records(body) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("⚠️ {}: {}, se muestra lista vacía", self.url, e);
                return Vec::new();
            }
        };

        let total = raw.len();
        let records: Vec<T> = raw
            .into_iter()
            .map(|record| self.aliases.normalize_record(record))
            .filter_map(|record| match serde_json::from_value::<T>(record) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!("⚠️ Registro omitido en {}: {}", self.url, e);
                    None
                }
            })
            .collect();

        tracing::debug!("📥 {}: {}/{} registros", self.url, records.len(), total);
        records
    }
}

/// Estado de una pantalla de lista: registros, error, filtros y página
#[derive(Debug, Clone)]
pub struct ListView<T> {
    items: Vec<T>,
    error: Option<String>,
    filter: ListFilter,
    page: usize,
    page_size: usize,
}

impl<T: Record + Clone + DeserializeOwned> ListView<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            error: None,
            filter: ListFilter::default(),
            page: 1,
            page_size,
        }
    }

    /// Vista con registros ya cargados
    pub fn with_items(items: Vec<T>, page_size: usize) -> Self {
        let mut view = Self::new(page_size);
        view.items = items;
        view
    }

    /// Recargar la lista completa
    ///
    /// Si falla, el mensaje queda guardado y la lista se vacía. No hay
    /// reintentos: la siguiente recarga la dispara el usuario.
    pub async fn reload<S: ListSource + ?Sized>(
        &mut self,
        resource: &RemoteListResource<T>,
        source: &S,
        query: &[(String, String)],
        token: Option<&str>,
    ) -> AppResult<()> {
        match resource.load(source, query, token).await {
            Ok(items) => {
                self.items = items;
                self.error = None;
                self.page = clamp_page(self.page, self.filtered_len(), self.page_size);
                Ok(())
            }
            Err(e) => {
                self.items.clear();
                self.error = Some(e.user_message());
                self.page = 1;
                Err(e)
            }
        }
    }

    /// Cambiar filtros; cualquier cambio vuelve a la página 1
    pub fn set_filter(&mut self, filter: ListFilter) {
        if filter != self.filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    /// Ir a una página (acotada al rango válido)
    pub fn set_page(&mut self, page: usize) {
        self.page = clamp_page(page, self.filtered_len(), self.page_size);
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Todos los registros que pasan los filtros actuales
    pub fn filtered(&self) -> Vec<T> {
        self.filter.apply(&self.items)
    }

    fn filtered_len(&self) -> usize {
        self.items.iter().filter(|r| self.filter.matches(*r)).count()
    }

    /// Página actual de la lista filtrada
    pub fn current_page(&self) -> Page<T> {
        paginate(&self.filtered(), self.page_size, self.page)
    }
}
