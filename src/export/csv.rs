//! Exportación CSV
//!
//! Encabezados fijos y una fila por registro de la lista filtrada. Todas
//! las celdas van entre comillas y las comillas internas se duplican.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

/// Marca de orden de bytes para que Excel detecte UTF-8
const UTF8_BOM: &str = "\u{feff}";

/// Columna de exportación
pub struct CsvColumn<T> {
    pub header: &'static str,
    pub value: fn(&T) -> String,
}

impl<T> CsvColumn<T> {
    pub const fn new(header: &'static str, value: fn(&T) -> String) -> Self {
        Self { header, value }
    }
}

/// Citar una celda: `a"b` → `"a""b"`
pub fn quote_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Generar el texto CSV (sin BOM)
pub fn to_csv<T>(records: &[T], columns: &[CsvColumn<T>]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|c| quote_cell(c.header))
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        lines.push(
            columns
                .iter()
                .map(|c| quote_cell(&(c.value)(record)))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\r\n")
}

/// Respuesta de descarga `text/csv`
pub struct CsvDownload {
    pub file_name: String,
    pub body: String,
}

impl CsvDownload {
    pub fn new<T>(file_name: &str, records: &[T], columns: &[CsvColumn<T>]) -> Self {
        Self {
            file_name: file_name.to_string(),
            body: to_csv(records, columns),
        }
    }
}

impl IntoResponse for CsvDownload {
    fn into_response(self) -> Response {
        let disposition = format!(
            "attachment; filename=\"{}\"",
            self.file_name.replace('"', "")
        );
        (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            format!("{}{}", UTF8_BOM, self.body),
        )
            .into_response()
    }
}
