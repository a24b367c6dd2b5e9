//! # File Server
//! src/lib.rs
//!
//! Servidor HTTP bloqueante y multi-thread que sirve archivos estáticos y
//! listados de directorio generados desde una raíz configurada.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `encoding`: conversiones UTF-8 / texto nativo / texto de path y `%XX`
//! - `http`: parsing del request, construcción de responses, MIME
//! - `files`: resolución de paths bajo la raíz y HTML de los listados
//! - `workers`: pool fijo de threads con cola FIFO
//! - `server`: listener TCP y máquina de estados de cada conexión
//! - `config`: configuración por CLI y variables de entorno
//! - `error`: taxonomía de errores
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let mut config = Config::default();
//! config.root = "./public".into();
//!
//! let server = Server::bind(&config).expect("Error al iniciar servidor");
//! server.run().expect("Error en el loop de accept");
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod files;
pub mod http;
pub mod server;
pub mod workers;
