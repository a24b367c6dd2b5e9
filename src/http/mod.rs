//! # Módulo HTTP
//!
//! Implementa la parte mínima de HTTP/1.1 que necesita el servidor de
//! archivos, sin librerías de alto nivel:
//!
//! - Parsing de la request line (solo `GET`)
//! - Construcción de responses (errores fijos, archivos, listados)
//! - Códigos de estado
//! - Tabla de tipos MIME
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! Los headers del request no se interpretan. Cada conexión lleva una sola
//! respuesta y se cierra (`Connection: close`).

pub mod mime;      // Extensión → Content-Type
pub mod request;   // Parsing de la request line
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

pub use mime::MimeTable;
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
