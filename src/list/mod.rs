//! Listas remotas
//!
//! Cargar, desenvolver, normalizar, filtrar y paginar listas de registros
//! provenientes de los servicios externos.

pub mod envelope;
pub mod filter;
pub mod normalize;
pub mod paginate;
pub mod resource;

pub use envelope::{unwrap_records, ListEnvelope, ShapeError};
pub use filter::{DateRange, EnumFilter, ListFilter, Record, SortDirection, TextFilter};
pub use normalize::FieldAliases;
pub use paginate::{paginate, Page};
pub use resource::{ListSource, ListView, RemoteListResource};
