//! # Errores del Servidor
//! src/error.rs
//!
//! Taxonomía de errores del servidor de archivos:
//!
//! - [`EncodingError`]: fallo al convertir texto entre UTF-8, el texto
//!   nativo y el texto de paths de la plataforma.
//! - [`ParseError`](crate::http::request::ParseError): request mal formado
//!   (vive junto al parser en `http::request`).
//! - [`PoolError`]: el pool de workers ya no acepta trabajo.
//! - [`ServerError`]: errores a nivel de listener, fatales para el servidor.
//!
//! Los errores de una conexión nunca salen de su handler; solo
//! [`ServerError`] llega hasta `main`.

use std::io;
use thiserror::Error;

/// Fallo de conversión de texto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Los bytes no son UTF-8 válido
    #[error("input is not valid UTF-8")]
    InvalidUtf8,

    /// Un path no puede contener NUL
    #[error("text contains an interior NUL byte")]
    InteriorNul,

    /// El texto no se puede representar en la codificación destino
    #[error("text cannot be represented in the target encoding")]
    Unrepresentable,
}

/// El pool fue apagado y rechaza tareas nuevas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("worker pool is shutting down")]
    ShuttingDown,
}

/// Configuración inválida detectada al arrancar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

/// Errores a nivel de servidor (bind, listen, arranque del pool)
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid server root: {0}")]
    Root(#[from] EncodingError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Pool(#[from] PoolError),
}
