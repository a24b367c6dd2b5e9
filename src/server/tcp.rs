//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Abre el listener (IPv4, `SO_REUSEADDR`, backlog máximo), acepta
//! conexiones en un loop y encola cada una en el pool de workers. Cada
//! tarea atiende una conexión completa con [`handle_connection`].
//!
//! Un fallo de bind/listen es fatal; un fallo de accept se registra y el
//! loop sigue.

use super::connection::{handle_connection, ServeContext};
use crate::config::Config;
use crate::encoding::{native_text_to_path_text, path_text_to_native_text};
use crate::error::ServerError;
use crate::files::ServeRoot;
use crate::workers::WorkerPool;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// El kernel recorta el backlog a su máximo
const LISTEN_BACKLOG: i32 = i32::MAX;

/// Servidor de archivos: listener + pool + contexto compartido
pub struct Server {
    listener: TcpListener,
    context: Arc<ServeContext>,
    pool: WorkerPool,
}

impl Server {
    /// Valida la configuración, abre el listener y arranca el pool
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        config.validate()?;

        // La raíz llega por CLI en codificación nativa; se rechaza si no es
        // representable como path (ej: NUL interior)
        let native = path_text_to_native_text(config.root.as_os_str())?;
        let root = PathBuf::from(native_text_to_path_text(&native)?);
        let root = ServeRoot::new(root)?;
        let context = ServeContext::new(root)
            .with_recv_timeout(Duration::from_secs(config.recv_timeout_secs));

        let address = SocketAddrV4::new(config.ipv4_host()?, config.port);
        let listener = open_listener(address).map_err(|source| ServerError::Bind {
            address: address.to_string(),
            source,
        })?;

        let pool = WorkerPool::new(config.worker_count())?;

        info!(
            address = %listener.local_addr()?,
            root = %context.root.path().display(),
            workers = pool.size(),
            "server listening"
        );

        Ok(Self {
            listener,
            context: Arc::new(context),
            pool,
        })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Loop de accept; solo retorna si el pool deja de aceptar trabajo
    pub fn run(&self) -> Result<(), ServerError> {
        loop {
            match self.accept() {
                Ok(stream) => self.dispatch(stream)?,
                Err(e) => error!(error = %e, "accept failed"),
            }
        }
    }

    fn accept(&self) -> Result<TcpStream, ServerError> {
        let (stream, _) = self.listener.accept().map_err(ServerError::Accept)?;
        Ok(stream)
    }

    fn dispatch(&self, stream: TcpStream) -> Result<(), ServerError> {
        let context = Arc::clone(&self.context);
        self.pool
            .submit(move || handle_connection(stream, &context))?;
        Ok(())
    }
}

/// Socket IPv4 con `SO_REUSEADDR`, bind y listen con backlog máximo
fn open_listener(address: SocketAddrV4) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&SocketAddr::V4(address).into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::thread;

    fn test_config(root: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config.root = root.to_path_buf();
        config.workers = Some(2);
        config
    }

    fn get(addr: SocketAddr, target: &str) -> String {
        let mut client = TcpStream::connect(addr).unwrap();
        client
            .write_all(format!("GET {} HTTP/1.1\r\n\r\n", target).as_bytes())
            .unwrap();
        let mut buf = String::new();
        client.read_to_string(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_bind_and_serve() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "hi").unwrap();

        let server = Server::bind(&test_config(dir.path())).unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);

        thread::spawn(move || server.run());

        let text = get(addr, "/hello.txt");
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\nhi"));
    }

    #[test]
    fn test_bind_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir.path().join("nope"));
        assert!(matches!(Server::bind(&config), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_bind_port_in_use() {
        let dir = tempfile::tempdir().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();

        let mut config = test_config(dir.path());
        config.port = taken.local_addr().unwrap().port();

        assert!(matches!(Server::bind(&config), Err(ServerError::Bind { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_serves_non_utf8_root() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(OsStr::from_bytes(b"caf\xe9"));
        fs::create_dir(&root).unwrap();
        fs::write(root.join("hello.txt"), "hi").unwrap();

        let server = Server::bind(&test_config(&root)).unwrap();
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.run());

        let text = get(addr, "/hello.txt");
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\nhi"));
    }
}
