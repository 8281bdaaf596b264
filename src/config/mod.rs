//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de variables de entorno
//! y de los servicios externos.

pub mod environment;

pub use environment::*;
