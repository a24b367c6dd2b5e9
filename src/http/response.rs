//! # Construcción de Respuestas HTTP
//!
//! Arma respuestas HTTP/1.1 de un solo uso (siempre `Connection: close`):
//! páginas de error fijas, contenido de archivos y listados de directorio.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Server: file_server/0.1.0\r\n
//! Connection: close\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 11\r\n
//! \r\n
//! hello world
//! ```
//!
//! Los headers conservan el orden de inserción y `Content-Length` siempre
//! coincide con el largo del body.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use file_server::http::{Response, StatusCode};
//!
//! let response = Response::error_page(StatusCode::NotFound);
//! assert_eq!(response.body(), b"<html><h1>Not Found</h1></html>");
//! ```

use super::StatusCode;
use crate::files::{listing, Entry};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Valor del header `Server`
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers en orden de inserción; un nombre aparece una sola vez
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta con los headers comunes (`Server`, `Connection`)
    /// y body vacío
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
        .with_header("Server", SERVER_NAME)
        .with_header("Connection", "close")
        .with_body_bytes(Vec::new())
    }

    /// Agrega un header a la respuesta
    ///
    /// Si el header ya existe, se sobrescribe en su posición original.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, existing_value)) => *existing_value = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el cuerpo desde un string y actualiza `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo desde bytes y actualiza `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        let length = self.body.len().to_string();
        self.add_header("Content-Length", &length);
        self
    }

    /// Página de error fija: `<html><h1>{reason}</h1></html>`
    ///
    /// Se usa para 404, 405, 414 y 500.
    pub fn error_page(status: StatusCode) -> Self {
        let body = format!("<html><h1>{}</h1></html>", status.reason_phrase());
        Self::new(status)
            .with_header("Content-Type", "text/html")
            .with_body(&body)
    }

    /// Respuesta 200 con el contenido completo de un archivo
    ///
    /// `content_type` sale de la extensión del path pedido (ver
    /// [`MimeTable::lookup`](crate::http::MimeTable::lookup)). Si el archivo desaparece entre la clasificación
    /// y la lectura, se degrada a 404.
    pub fn file(path: &Path, content_type: &str) -> Self {
        match fs::read(path) {
            Ok(content) => Self::new(StatusCode::Ok)
                .with_header("Content-Type", content_type)
                .with_body_bytes(content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "file vanished before it could be read");
                Self::error_page(StatusCode::NotFound)
            }
        }
    }

    /// Respuesta 200 con el listado HTML de un directorio
    pub fn directory(path: &Path, entries: &[Entry]) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body_bytes(listing::render(path, entries))
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.body.len() + 128);

        // 1. Status line
        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        // 2. Headers
        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        // 3. Línea vacía y body
        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Headers en orden de envío
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Busca un header por nombre (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
