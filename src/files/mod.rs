//! # Archivos
//!
//! Todo lo que toca el sistema de archivos:
//! - `resolver`: target del request → archivo / directorio / no encontrado
//! - `listing`: HTML de los listados de directorio

pub mod listing;
pub mod resolver;

pub use resolver::{Entry, ResolvedTarget, ServeRoot};
