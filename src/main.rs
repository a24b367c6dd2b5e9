//! # File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: configuración desde CLI/entorno, logging, bind y loop
//! de accept.

use file_server::config::Config;
use file_server::server::Server;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::new();
    config.print_summary();

    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    };

    // Iniciar el servidor (esto bloqueará el thread)
    if let Err(e) = server.run() {
        error!(error = %e, "fatal error");
        std::process::exit(1);
    }
}
