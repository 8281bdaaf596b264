//! Exportaciones de listas filtradas

pub mod csv;

pub use self::csv::{quote_cell, to_csv, CsvColumn, CsvDownload};
