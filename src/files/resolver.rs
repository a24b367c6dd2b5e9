//! # Resolución de Paths
//! src/files/resolver.rs
//!
//! Traduce el target de un request a un path bajo la raíz del servidor y lo
//! clasifica como archivo, directorio o inexistente.
//!
//! ## Pasos
//!
//! ```text
//! "/docs/a%20b.txt" → percent_decode → "/docs/a b.txt"
//!                   → UTF-8 → texto de path → raíz + "docs/a b.txt"
//!                   → canonicalize → ¿sigue bajo la raíz? → metadata
//! ```
//!
//! Cada request consulta el sistema de archivos de nuevo: no hay caché, un
//! cambio en disco se ve en el siguiente request.

use crate::encoding::{percent_decode, utf8_to_path_text};
use crate::error::EncodingError;
use crate::http::mime::extension_of;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Una entrada de un listado de directorio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Nombre del archivo o directorio (sin el path del padre)
    pub name: OsString,

    /// `true` si es un directorio
    pub is_dir: bool,

    /// Tamaño en bytes (0 para directorios)
    pub size: u64,
}

/// Resultado de clasificar un target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// Archivo regular
    File {
        path: PathBuf,
        size: u64,
        /// Extensión con punto inicial, vacía si no tiene
        extension: String,
    },

    /// Directorio con sus entradas ordenadas por nombre
    Directory { path: PathBuf, entries: Vec<Entry> },

    /// No existe, no es archivo ni directorio, no es accesible o está
    /// fuera de la raíz
    NotFound,
}

/// Raíz del servidor: un directorio existente, canonicalizado al arrancar
#[derive(Debug, Clone)]
pub struct ServeRoot {
    path: PathBuf,
}

impl ServeRoot {
    /// Valida y canonicaliza la raíz
    ///
    /// Falla si el path no existe o no es un directorio.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = fs::canonicalize(path)?;
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", path.display()),
            ));
        }
        Ok(Self { path })
    }

    /// Path absoluto y canónico de la raíz
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resuelve un target crudo (con escapes `%XX`)
    ///
    /// Solo falla si el target decodificado no se puede convertir a texto de
    /// path; cualquier error del sistema de archivos se traduce a
    /// [`ResolvedTarget::NotFound`].
    pub fn resolve(&self, raw_target: &[u8]) -> Result<ResolvedTarget, EncodingError> {
        let decoded = percent_decode(raw_target);

        let candidate = if decoded == b"/" {
            self.path.clone()
        } else {
            // Sin la barra inicial: un path absoluto reemplazaría a la raíz en join()
            let start = decoded.iter().position(|&b| b != b'/').unwrap_or(decoded.len());
            let relative = utf8_to_path_text(&decoded[start..])?;
            self.path.join(relative)
        };

        Ok(self.classify(&candidate))
    }

    /// Clasifica `candidate` (raíz + target)
    ///
    /// El path canónico solo decide si el target queda bajo la raíz y de
    /// dónde sale la metadata; el resultado conserva el path pedido, así un
    /// symlink `page.html -> data.txt` se sirve como `.html`.
    fn classify(&self, candidate: &Path) -> ResolvedTarget {
        let canonical = match fs::canonicalize(candidate) {
            Ok(canonical) => canonical,
            Err(e) => {
                debug!(path = %candidate.display(), error = %e, "target not found");
                return ResolvedTarget::NotFound;
            }
        };

        if !canonical.starts_with(&self.path) {
            warn!(path = %canonical.display(), "target escapes server root");
            return ResolvedTarget::NotFound;
        }

        let metadata = match fs::metadata(&canonical) {
            Ok(metadata) => metadata,
            Err(_) => return ResolvedTarget::NotFound,
        };

        if metadata.is_dir() {
            match read_entries(&canonical) {
                Ok(entries) => ResolvedTarget::Directory {
                    path: candidate.to_path_buf(),
                    entries,
                },
                Err(e) => {
                    warn!(path = %canonical.display(), error = %e, "directory could not be listed");
                    ResolvedTarget::NotFound
                }
            }
        } else if metadata.is_file() {
            ResolvedTarget::File {
                extension: extension_of(candidate),
                size: metadata.len(),
                path: candidate.to_path_buf(),
            }
        } else {
            ResolvedTarget::NotFound
        }
    }
}

/// Lee las entradas de un directorio, saltando las que no se pueden consultar
fn read_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            // fs::metadata sigue symlinks, igual que la clasificación del target
            let metadata = fs::metadata(entry.path()).ok()?;
            let is_dir = metadata.is_dir();
            Some(Entry {
                name: entry.file_name(),
                is_dir,
                size: if is_dir { 0 } else { metadata.len() },
            })
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
