//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes y las encola en el pool de workers
//! 3. Lee y parsea el request de cada conexión
//! 4. Resuelve el path y envía el archivo, el listado o un error

pub mod connection;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{handle_connection, ServeContext};
pub use tcp::Server;
