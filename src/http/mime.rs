//! # Tabla de Tipos MIME
//! src/http/mime.rs
//!
//! Mapa fijo extensión → Content-Type. Se construye una vez al arrancar y se
//! comparte por referencia (`Arc`) con todos los handlers; nunca se muta.
//!
//! La búsqueda es exacta y sensible a mayúsculas: la clave incluye el punto
//! inicial y está en minúsculas (`".html"`). Una extensión desconocida cae en
//! `text/plain`.

use std::collections::BTreeMap;
use std::path::Path;

/// Content-Type por defecto para extensiones sin mapeo
pub const DEFAULT_MIME: &str = "text/plain";

const BUILTIN: &[(&str, &str)] = &[
    (".css", "text/css"),
    (".gif", "image/gif"),
    (".htm", "text/html"),
    (".html", "text/html"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".ico", "image/x-icon"),
    (".js", "application/javascript"),
    (".mp4", "video/mp4"),
    (".png", "image/png"),
    (".svg", "image/svg+xml"),
    (".xml", "text/xml"),
];

/// Tabla inmutable de tipos MIME
#[derive(Debug, Clone)]
pub struct MimeTable {
    types: BTreeMap<&'static str, &'static str>,
}

impl MimeTable {
    /// Tabla con los tipos incluidos por defecto
    pub fn new() -> Self {
        Self {
            types: BUILTIN.iter().copied().collect(),
        }
    }

    /// Busca el Content-Type de una extensión (con punto, ej: `".png"`)
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::MimeTable;
    ///
    /// let table = MimeTable::new();
    /// assert_eq!(table.lookup(".png"), "image/png");
    /// assert_eq!(table.lookup(".PNG"), "text/plain");
    /// ```
    pub fn lookup(&self, extension: &str) -> &'static str {
        self.types.get(extension).copied().unwrap_or(DEFAULT_MIME)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Extensión con punto inicial (`"index.html"` → `".html"`), vacía si no tiene
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
