//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de archivos con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server --port 8039 --root ./public --workers 8
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8039 HTTP_ROOT=./public ./file_server
//! ```

use crate::error::ConfigError;
use crate::workers::pool::default_size;
use clap::Parser;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor HTTP de archivos estáticos y listados de directorio")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Dirección IPv4 en la que escucha (todas las interfaces por defecto)
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio raíz que se sirve (se acepta cualquier path nativo, UTF-8 o no)
    #[arg(short, long, env = "HTTP_ROOT")]
    pub root: PathBuf,

    /// Número de workers (por defecto, uno por thread de hardware)
    #[arg(short, long, env = "HTTP_WORKERS")]
    pub workers: Option<usize>,

    /// Timeout de recepción del request, en segundos
    #[arg(long = "recv-timeout-secs", default_value = "5", env = "HTTP_RECV_TIMEOUT")]
    pub recv_timeout_secs: u64,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Host como dirección IPv4
    pub fn ipv4_host(&self) -> Result<Ipv4Addr, ConfigError> {
        self.host
            .parse()
            .map_err(|_| ConfigError(format!("Host must be an IPv4 address: {}", self.host)))
    }

    /// Workers efectivos: el configurado o uno por thread de hardware
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_size)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError("Workers must be >= 1".to_string()));
        }

        if self.recv_timeout_secs == 0 {
            return Err(ConfigError("Receive timeout must be > 0".to_string()));
        }

        self.ipv4_host()?;

        if !self.root.is_dir() {
            return Err(ConfigError(format!(
                "Root must be an existing directory: {}",
                self.root.display()
            )));
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════╗");
        println!("║        File Server Configuration             ║");
        println!("╚══════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Root:         {}", self.root.display());
        println!();
        println!("👷 Workers:");
        println!("   Threads:      {}", self.worker_count());
        println!("   Recv timeout: {} s", self.recv_timeout_secs);
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto (raíz: directorio actual)
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            root: PathBuf::from("."),
            workers: None,
            recv_timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.recv_timeout_secs, 5);
        assert_eq!(config.workers, None);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_validate_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    // ==================== Workers ====================

    #[test]
    fn test_worker_count_default() {
        let config = Config::default();
        assert_eq!(config.worker_count(), default_size());
    }

    #[test]
    fn test_worker_count_custom() {
        let mut config = Config::default();
        config.workers = Some(8);
        assert_eq!(config.worker_count(), 8);
    }

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.workers = Some(0);
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Workers"));
    }

    // ==================== Validación ====================

    #[test]
    fn test_validate_invalid_timeout() {
        let mut config = Config::default();
        config.recv_timeout_secs = 0;
        assert!(config.validate().unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn test_validate_invalid_host() {
        let mut config = Config::default();
        config.host = "localhost".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("IPv4"));
    }

    #[test]
    fn test_validate_root_not_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let mut config = Config::default();
        config.root = file;
        assert!(config.validate().unwrap_err().to_string().contains("Root"));

        config.root = dir.path().join("missing");
        assert!(config.validate().is_err());
    }

    // ==================== CLI ====================

    #[test]
    fn test_parse_cli_args() {
        let config = Config::try_parse_from([
            "file_server", "--port", "8039", "--root", "/srv/www", "--workers", "3",
        ])
        .unwrap();

        assert_eq!(config.port, 8039);
        assert_eq!(config.root, PathBuf::from("/srv/www"));
        assert_eq!(config.workers, Some(3));
        assert_eq!(config.host, "0.0.0.0");
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_non_utf8_root() {
        use std::ffi::OsString;
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let root = OsString::from_vec(b"/srv/caf\xe9".to_vec());
        let config = Config::try_parse_from([
            OsString::from("file_server"),
            OsString::from("--root"),
            root,
        ])
        .unwrap();

        assert_eq!(config.root.as_os_str().as_bytes(), b"/srv/caf\xe9");
    }

    #[test]
    fn test_config_print_summary() {
        // Should not panic
        Config::default().print_summary();
    }
}
