//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Cada conexión aceptada se atiende con una máquina de estados:
//!
//! ```text
//! Receiving ──► Parsing ──► Resolving ──► Responding ──► Closed
//!     │            │            │                          ▲
//!     └────────────┴────────────┴──► Error (404/405/414/500) ┘
//! ```
//!
//! - Una sola lectura de hasta 8192 bytes con timeout de recepción.
//! - Lectura de 0 bytes: el peer cerró, se cierra sin responder.
//! - Una sola respuesta por conexión.
//!
//! El cierre (half-close de escritura y luego close) vive en `Drop`, así se
//! ejecuta una vez por conexión en cualquier camino, incluso si algo entra
//! en pánico.

use crate::encoding::path_text_to_native_text;
use crate::files::{ResolvedTarget, ServeRoot};
use crate::http::{MimeTable, Request, Response, StatusCode};
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tamaño del buffer de recepción (una sola lectura)
pub const RECV_BUFFER_LEN: usize = 8192;

/// Timeout de recepción por defecto
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Todo lo que un handler necesita y que no cambia mientras corre el servidor
#[derive(Debug)]
pub struct ServeContext {
    pub root: ServeRoot,
    pub mime: MimeTable,
    pub recv_timeout: Duration,
}

impl ServeContext {
    pub fn new(root: ServeRoot) -> Self {
        Self {
            root,
            mime: MimeTable::new(),
            recv_timeout: DEFAULT_RECV_TIMEOUT,
        }
    }

    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = timeout;
        self
    }
}

/// Estados del handler
#[derive(Debug)]
enum State {
    /// Esperando los bytes del request
    Receiving,
    /// `n` bytes válidos en el buffer
    Parsing(usize),
    Resolving(Request),
    Responding(ResolvedTarget),
    /// Se responde con la página de error fija y se cierra
    Error(StatusCode),
    Closed,
}

/// Una conexión aceptada, propiedad exclusiva de su handler
pub struct Connection<'a> {
    stream: TcpStream,
    peer: String,
    buffer: Vec<u8>,
    context: &'a ServeContext,
}

impl<'a> Connection<'a> {
    pub fn new(stream: TcpStream, context: &'a ServeContext) -> Self {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            stream,
            peer,
            buffer: vec![0; RECV_BUFFER_LEN],
            context,
        }
    }

    /// Atiende la conexión hasta cerrarla
    pub fn run(mut self) {
        let mut state = State::Receiving;

        loop {
            state = match state {
                State::Receiving => self.receive(),
                State::Parsing(len) => self.parse(len),
                State::Resolving(request) => self.resolve(&request),
                State::Responding(target) => {
                    let response = self.build(target);
                    self.send(&response);
                    State::Closed
                }
                State::Error(status) => {
                    self.send(&Response::error_page(status));
                    State::Closed
                }
                State::Closed => break,
            };
        }
    }

    fn receive(&mut self) -> State {
        if let Err(e) = self.stream.set_read_timeout(Some(self.context.recv_timeout)) {
            warn!(peer = %self.peer, error = %e, "failed to set receive timeout");
            return State::Error(StatusCode::InternalServerError);
        }

        let read = loop {
            match self.stream.read(&mut self.buffer) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };

        match read {
            Ok(0) => {
                debug!(peer = %self.peer, "connection closed by peer before sending a request");
                State::Closed
            }
            Ok(len) => {
                debug!(peer = %self.peer, bytes = len, "request received");
                State::Parsing(len)
            }
            Err(e) => {
                warn!(peer = %self.peer, error = %e, "receive failed");
                State::Error(StatusCode::InternalServerError)
            }
        }
    }

    fn parse(&self, len: usize) -> State {
        match Request::parse(&self.buffer[..len]) {
            Ok(request) => State::Resolving(request),
            Err(e) => {
                info!(peer = %self.peer, error = %e, "rejected request");
                State::Error(e.status())
            }
        }
    }

    fn resolve(&self, request: &Request) -> State {
        debug!(peer = %self.peer, method = request.method().as_str(), target = %request.target_lossy(), "resolving");

        match self.context.root.resolve(request.target()) {
            Ok(target) => {
                info!(peer = %self.peer, target = %request.target_lossy(), resolved = %describe(&target), "GET");
                State::Responding(target)
            }
            Err(e) => {
                warn!(peer = %self.peer, target = %request.target_lossy(), error = %e, "target is not a valid path");
                State::Error(StatusCode::InternalServerError)
            }
        }
    }

    fn build(&self, target: ResolvedTarget) -> Response {
        match target {
            ResolvedTarget::File { path, extension, .. } => {
                Response::file(&path, self.context.mime.lookup(&extension))
            }
            ResolvedTarget::Directory { path, entries } => Response::directory(&path, &entries),
            ResolvedTarget::NotFound => Response::error_page(StatusCode::NotFound),
        }
    }

    fn send(&mut self, response: &Response) {
        let bytes = response.to_bytes();
        let result = self
            .stream
            .write_all(&bytes)
            .and_then(|_| self.stream.flush());

        match result {
            Ok(()) => debug!(peer = %self.peer, status = %response.status(), bytes = bytes.len(), "response sent"),
            Err(e) => warn!(peer = %self.peer, status = %response.status(), error = %e, "send failed"),
        }
    }
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        // Half-close de escritura; el close lo hace el drop de TcpStream
        if let Err(e) = self.stream.shutdown(Shutdown::Write) {
            debug!(peer = %self.peer, error = %e, "shutdown failed");
        }
    }
}

/// Atiende una conexión completa (lo que ejecuta cada tarea del pool)
pub fn handle_connection(stream: TcpStream, context: &ServeContext) {
    Connection::new(stream, context).run();
}

/// Texto del path resuelto para los logs, en codificación nativa
fn describe(target: &ResolvedTarget) -> String {
    match target {
        ResolvedTarget::File { path, size, .. } => format!("{} ({} bytes)", native_display(path), size),
        ResolvedTarget::Directory { path, .. } => format!("{}/", native_display(path)),
        ResolvedTarget::NotFound => "<not found>".to_string(),
    }
}

fn native_display(path: &Path) -> String {
    match path_text_to_native_text(path.as_os_str()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::WorkerPool;
    use std::fs;
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, ServeContext) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a b.txt"), "hello world").unwrap();
        fs::write(dir.path().join("page.html"), "<p>x</p>").unwrap();
        let context = ServeContext::new(ServeRoot::new(dir.path()).unwrap())
            .with_recv_timeout(Duration::from_millis(500));
        (dir, context)
    }

    /// Acepta una conexión, la atiende y devuelve lo que recibió el cliente
    fn exchange(context: ServeContext, request: &[u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &context);
        });

        let mut client = TcpStream::connect(addr).unwrap();
        if !request.is_empty() {
            client.write_all(request).unwrap();
        }

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        server.join().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_serves_percent_encoded_file() {
        let (_dir, context) = fixture();
        let text = exchange(context, b"GET /a%20b.txt HTTP/1.1\r\nHost: x\r\n\r\n");

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 11\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.ends_with("\r\n\r\nhello world"));
    }

    #[test]
    fn test_serves_root_listing() {
        let (_dir, context) = fixture();
        let text = exchange(context, b"GET / HTTP/1.1\r\n\r\n");

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(text.contains("<a href='page.html'>page.html</a>"));
    }

    #[test]
    fn test_missing_file_404() {
        let (_dir, context) = fixture();
        let text = exchange(context, b"GET /missing HTTP/1.1\r\n\r\n");

        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.ends_with("<html><h1>Not Found</h1></html>"));
    }

    #[test]
    fn test_method_not_allowed_405() {
        let (_dir, context) = fixture();
        let text = exchange(context, b"POST / HTTP/1.1\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    }

    #[test]
    fn test_uri_too_long_414() {
        let (_dir, context) = fixture();
        let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "x".repeat(2000));
        let text = exchange(context, raw.as_bytes());
        assert!(text.starts_with("HTTP/1.1 414 URI Too Long\r\n"));
    }

    #[test]
    fn test_missing_terminator_500() {
        let (_dir, context) = fixture();
        let text = exchange(context, b"GET / HTTP/1.1\r\nHost: x\r\n");
        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn test_invalid_utf8_target_500() {
        let (_dir, context) = fixture();
        let text = exchange(context, b"GET /%ff HTTP/1.1\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn test_peer_closed_without_request() {
        // Cubre la rama de lectura de 0 bytes: no se envía nada
        let (_dir, context) = fixture();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &context);
        });

        drop(TcpStream::connect(addr).unwrap());
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_served_with_requested_extension() {
        let (dir, context) = fixture();
        fs::write(dir.path().join("data.txt"), "<p>data</p>").unwrap();
        std::os::unix::fs::symlink(dir.path().join("data.txt"), dir.path().join("alias.html")).unwrap();

        let text = exchange(context, b"GET /alias.html HTTP/1.1\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html\r\n"));
        assert!(text.ends_with("\r\n\r\n<p>data</p>"));
    }

    #[test]
    fn test_connection_closed_when_task_panics() {
        let (_dir, context) = fixture();
        let context = Arc::new(context);
        let listener = Arc::new(TcpListener::bind("127.0.0.1:0").unwrap());
        let addr = listener.local_addr().unwrap();
        let pool = WorkerPool::new(1).unwrap();

        // La tarea entra en pánico con la conexión viva: el cliente igual ve EOF
        {
            let listener = Arc::clone(&listener);
            let context = Arc::clone(&context);
            pool.submit(move || {
                let (stream, _) = listener.accept().unwrap();
                let _connection = Connection::new(stream, &context);
                panic!("handler failed mid-request");
            })
            .unwrap();
        }

        let mut client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty());

        // El mismo worker atiende la conexión siguiente
        {
            let listener = Arc::clone(&listener);
            let context = Arc::clone(&context);
            pool.submit(move || {
                let (stream, _) = listener.accept().unwrap();
                handle_connection(stream, &context);
            })
            .unwrap();
        }

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"GET /a%20b.txt HTTP/1.1\r\n\r\n").unwrap();
        let mut text = String::new();
        client.read_to_string(&mut text).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("hello world"));
    }

    #[test]
    fn test_receive_timeout_500() {
        let (_dir, context) = fixture();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &context);
        });

        // El cliente conecta pero no envía nada: vence el timeout de 500ms
        let mut client = TcpStream::connect(addr).unwrap();
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        server.join().unwrap();

        assert!(String::from_utf8_lossy(&buf).starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }
}
