//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser mínimo: solo interesa la request line. Los headers no se parsean,
//! pero el bloque completo tiene que estar en el buffer.
//!
//! ## Formato aceptado
//!
//! ```text
//! GET /a%20b.txt HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! \r\n
//! ```
//!
//! ## Reglas, en orden
//!
//! 1. El buffer contiene `\r\n\r\n` (si no → 500)
//! 2. La primera línea tiene un primer espacio (si no → 500)
//! 3. El método, sin distinguir mayúsculas, es `GET` (si no → 405)
//! 4. La primera línea tiene un segundo espacio (si no → 500)
//! 5. El target mide como máximo [`URI_MAX_LEN`] bytes (si no → 414)

use super::StatusCode;
use thiserror::Error;

/// Longitud máxima del target (todavía codificado)
pub const URI_MAX_LEN: usize = 1024;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";
const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un archivo o listado
    GET,
}

impl Method {
    /// Parsea el token del método sin distinguir mayúsculas
    fn from_token(token: &[u8]) -> Result<Self, ParseError> {
        if token.eq_ignore_ascii_case(b"GET") {
            Ok(Method::GET)
        } else {
            Err(ParseError::MethodNotAllowed(
                String::from_utf8_lossy(token).into_owned(),
            ))
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

/// Errores de protocolo: cada uno termina en una respuesta de error fija
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Falta `\r\n\r\n`: request truncado o no es HTTP
    #[error("header block terminator not found")]
    MissingTerminator,

    /// La request line no tiene los dos espacios
    #[error("malformed request line")]
    MalformedRequestLine,

    /// Método distinto de GET
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Target de más de URI_MAX_LEN bytes
    #[error("request target too long: {0} bytes")]
    TargetTooLong(usize),
}

impl ParseError {
    /// Código de estado con el que se responde a este error
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::MissingTerminator | ParseError::MalformedRequestLine => {
                StatusCode::InternalServerError
            }
            ParseError::MethodNotAllowed(_) => StatusCode::MethodNotAllowed,
            ParseError::TargetTooLong(_) => StatusCode::UriTooLong,
        }
    }
}

/// Request parseado: método y target crudo (con escapes `%XX`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    target: Vec<u8>,
}

impl Request {
    /// Parsea un request desde los bytes recibidos
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use file_server::http::Request;
    ///
    /// let raw = b"GET /a%20b.txt HTTP/1.1\r\nHost: x\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.target(), b"/a%20b.txt");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if find(buffer, HEADER_TERMINATOR).is_none() {
            return Err(ParseError::MissingTerminator);
        }

        // La request line termina en el primer \r\n (existe, porque hay terminador)
        let line_end = find(buffer, LINE_TERMINATOR).unwrap_or(buffer.len());
        let line = &buffer[..line_end];

        let first_space = line
            .iter()
            .position(|&b| b == b' ')
            .ok_or(ParseError::MalformedRequestLine)?;
        let method = Method::from_token(&line[..first_space])?;

        let rest = &line[first_space + 1..];
        let second_space = rest
            .iter()
            .position(|&b| b == b' ')
            .ok_or(ParseError::MalformedRequestLine)?;
        let target = &rest[..second_space];

        if target.len() > URI_MAX_LEN {
            return Err(ParseError::TargetTooLong(target.len()));
        }

        Ok(Request {
            method,
            target: target.to_vec(),
        })
    }

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Target crudo, sin decodificar
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// Target como texto, para logs
    pub fn target_lossy(&self) -> String {
        String::from_utf8_lossy(&self.target).into_owned()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = Request::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.target(), b"/");
    }

    #[test]
    fn test_parse_keeps_target_encoded() {
        let raw = b"GET /a%20b.txt HTTP/1.1\r\nHost: x\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.target(), b"/a%20b.txt");
        assert_eq!(request.target_lossy(), "/a%20b.txt");
    }

    #[test]
    fn test_parse_method_case_insensitive() {
        for raw in [&b"get / HTTP/1.1\r\n\r\n"[..], b"Get / HTTP/1.1\r\n\r\n", b"GET / HTTP/1.1\r\n\r\n"] {
            assert_eq!(Request::parse(raw).unwrap().method(), Method::GET);
        }
    }

    // ==================== Errores ====================

    #[test]
    fn test_missing_terminator() {
        let result = Request::parse(b"GET / HTTP/1.1\r\nHost: x\r\n");
        assert_eq!(result, Err(ParseError::MissingTerminator));
        assert_eq!(ParseError::MissingTerminator.status(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(Request::parse(b""), Err(ParseError::MissingTerminator));
    }

    #[test]
    fn test_no_spaces() {
        let result = Request::parse(b"GET\r\n\r\n");
        assert_eq!(result, Err(ParseError::MalformedRequestLine));
    }

    #[test]
    fn test_single_space() {
        let result = Request::parse(b"GET /index.html\r\n\r\n");
        assert_eq!(result, Err(ParseError::MalformedRequestLine));
    }

    #[test]
    fn test_spaces_outside_request_line_do_not_count() {
        let result = Request::parse(b"GET\r\nHost: a b\r\n\r\n");
        assert_eq!(result, Err(ParseError::MalformedRequestLine));
    }

    #[test]
    fn test_method_not_allowed() {
        let result = Request::parse(b"POST / HTTP/1.1\r\n\r\n");
        assert_eq!(result, Err(ParseError::MethodNotAllowed("POST".to_string())));
        assert_eq!(result.unwrap_err().status(), StatusCode::MethodNotAllowed);
    }

    #[test]
    fn test_method_checked_before_second_space() {
        let result = Request::parse(b"DELETE /x\r\n\r\n");
        assert!(matches!(result, Err(ParseError::MethodNotAllowed(_))));
    }

    #[test]
    fn test_target_at_limit() {
        let target = format!("/{}", "a".repeat(URI_MAX_LEN - 1));
        let raw = format!("GET {} HTTP/1.1\r\n\r\n", target);
        let request = Request::parse(raw.as_bytes()).unwrap();
        assert_eq!(request.target().len(), URI_MAX_LEN);
    }

    #[test]
    fn test_target_too_long() {
        let target = format!("/{}", "a".repeat(URI_MAX_LEN));
        let raw = format!("GET {} HTTP/1.1\r\n\r\n", target);
        let result = Request::parse(raw.as_bytes());

        assert_eq!(result, Err(ParseError::TargetTooLong(URI_MAX_LEN + 1)));
        assert_eq!(result.unwrap_err().status(), StatusCode::UriTooLong);
    }
}
