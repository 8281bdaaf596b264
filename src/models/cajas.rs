//! Stock de cajas (Malvinas): productos, reservas y devoluciones

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::list::filter::Record;
use crate::list::normalize::{value_to_text, FieldAliases};
use crate::models::lenient;
use crate::utils::errors::{AppError, AppResult};

/// Producto en stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Siempre texto, para comparar entre pantallas
    #[serde(rename = "ID", deserialize_with = "lenient::opt_text", default)]
    pub id: Option<String>,
    #[serde(rename = "CODIGO", deserialize_with = "lenient::opt_text", default)]
    pub codigo: Option<String>,
    #[serde(rename = "NOMBRE", deserialize_with = "lenient::opt_text", default)]
    pub nombre: Option<String>,
    #[serde(rename = "CATEGORIA", deserialize_with = "lenient::opt_text", default)]
    pub categoria: Option<String>,
    #[serde(rename = "LIMITE_DESCUENTO", deserialize_with = "lenient::opt_f64", default)]
    pub limite_descuento: Option<f64>,
    #[serde(rename = "CANTIDAD", deserialize_with = "lenient::opt_f64", default)]
    pub cantidad: Option<f64>,
    #[serde(rename = "UNIDAD_MEDIDA", deserialize_with = "lenient::opt_text", default)]
    pub unidad_medida: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn aliases() -> FieldAliases {
        FieldAliases::new()
            .alias("ID", &["id", "Id", "ID_PRODUCTO", "id_producto"])
            .alias("CODIGO", &["codigo", "COD_PRODUCTO", "cod_producto", "SKU"])
            .alias("NOMBRE", &["nombre", "PRODUCTO", "producto", "DESCRIPCION"])
            .alias("CATEGORIA", &["categoria", "LINEA", "linea"])
            .alias("LIMITE_DESCUENTO", &["limite_descuento", "DESCUENTO_MAXIMO", "LIMITE"])
            .alias("CANTIDAD", &["cantidad", "STOCK", "stock"])
            .alias("UNIDAD_MEDIDA", &["unidad_medida", "UNIDAD", "unidad", "UM"])
    }
}

impl Record for Product {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "ID" => self.id.clone(),
            "CODIGO" => self.codigo.clone(),
            "NOMBRE" => self.nombre.clone(),
            "CATEGORIA" => self.categoria.clone(),
            "LIMITE_DESCUENTO" => self.limite_descuento.map(|v| v.to_string()),
            "CANTIDAD" => self.cantidad.map(|v| v.to_string()),
            "UNIDAD_MEDIDA" => self.unidad_medida.clone(),
            other => self.extra.get(other).and_then(value_to_text),
        }
    }
}

/// Cantidad reservada de un producto a nombre de un responsable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(rename = "ID", deserialize_with = "lenient::opt_text", default)]
    pub id: Option<String>,
    #[serde(rename = "ID_PRODUCTO", deserialize_with = "lenient::opt_text", default)]
    pub id_producto: Option<String>,
    #[serde(rename = "PRODUCTO", deserialize_with = "lenient::opt_text", default)]
    pub producto: Option<String>,
    #[serde(rename = "CANTIDAD_RESERVADA", deserialize_with = "lenient::opt_f64", default)]
    pub cantidad_reservada: Option<f64>,
    #[serde(rename = "RESPONSABLE", deserialize_with = "lenient::opt_text", default)]
    pub responsable: Option<String>,
    #[serde(rename = "FECHA", deserialize_with = "lenient::opt_text", default)]
    pub fecha: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reservation {
    pub fn aliases() -> FieldAliases {
        FieldAliases::new()
            .alias("ID", &["id", "Id", "ID_RESERVA", "id_reserva"])
            .alias("ID_PRODUCTO", &["id_producto", "PRODUCTO_ID"])
            .alias("PRODUCTO", &["producto", "NOMBRE", "nombre"])
            .alias("CANTIDAD_RESERVADA", &["cantidad_reservada", "RESERVADO", "CANTIDAD", "cantidad"])
            .alias("RESPONSABLE", &["responsable", "USUARIO", "usuario"])
            .alias("FECHA", &["fecha", "FECHA_RESERVA", "fecha_reserva", "created_at"])
    }
}

impl Record for Reservation {
    fn field(&self, name: &str) -> Option<String> {
        match name {
            "ID" => self.id.clone(),
            "ID_PRODUCTO" => self.id_producto.clone(),
            "PRODUCTO" => self.producto.clone(),
            "CANTIDAD_RESERVADA" => self.cantidad_reservada.map(|v| v.to_string()),
            "RESPONSABLE" => self.responsable.clone(),
            "FECHA" => self.fecha.clone(),
            other => self.extra.get(other).and_then(value_to_text),
        }
    }
}

/// Cambios de un producto (límite de descuento, cantidad)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[serde(rename = "LIMITE_DESCUENTO", alias = "limite_descuento", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub limite_descuento: Option<f64>,
    #[serde(rename = "CANTIDAD", alias = "cantidad", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub cantidad: Option<f64>,
}

/// Devolución (o traspaso) de una cantidad reservada
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransferRequest {
    #[serde(rename = "ID_RESERVA", alias = "id_reserva")]
    #[validate(length(min = 1))]
    pub id_reserva: String,
    #[serde(rename = "CANTIDAD", alias = "cantidad")]
    pub cantidad: f64,
    #[serde(rename = "RESPONSABLE", alias = "responsable")]
    #[validate(length(min = 1, max = 120))]
    pub responsable: String,
    #[serde(rename = "OBSERVACION", alias = "observacion", default, skip_serializing_if = "Option::is_none")]
    pub observacion: Option<String>,
}

/// Última barrera local: no se puede devolver más de lo reservado
///
/// El servicio externo vuelve a validar; esta comprobación solo evita el
/// viaje de ida y vuelta en el caso obvio.
pub fn check_transfer(reserved: f64, requested: f64) -> AppResult<()> {
    if !requested.is_finite() || requested <= 0.0 {
        return Err(AppError::BadRequest(
            "La cantidad debe ser mayor a cero".to_string(),
        ));
    }
    if requested > reserved {
        return Err(AppError::BadRequest(format!(
            "La cantidad solicitada ({}) supera lo reservado ({})",
            requested, reserved
        )));
    }
    Ok(())
}
