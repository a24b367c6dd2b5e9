//! # Listados de Directorio
//! src/files/listing.rs
//!
//! Genera la página HTML (UTF-8) de un directorio:
//!
//! ```text
//! <html><header><h1>file_server</h1></header><body>
//! Current dir: /srv/www<br><br>
//! <a href='docs/'>docs/</a><br>
//! <a href='a b.txt'>a b.txt</a>   11 Bytes <br>
//! </body></html>
//! ```

use super::Entry;
use crate::encoding::path_text_to_utf8;
use std::path::Path;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Tamaño legible en unidades binarias, sin decimales (división entera)
///
/// # Ejemplo
/// ```
/// use file_server::files::listing::format_size;
///
/// assert_eq!(format_size(1023), "1023 Bytes");
/// assert_eq!(format_size(1536), "1 KB");
/// ```
pub fn format_size(size: u64) -> String {
    if size < KIB {
        format!("{} Bytes", size)
    } else if size < MIB {
        format!("{} KB", size / KIB)
    } else if size < GIB {
        format!("{} MB", size / MIB)
    } else {
        format!("{} GB", size / GIB)
    }
}

/// Renderiza el listado de `dir` con sus entradas
pub fn render(dir: &Path, entries: &[Entry]) -> Vec<u8> {
    let mut body = Vec::with_capacity(256 + entries.len() * 64);

    body.extend_from_slice(b"<html><header><h1>");
    body.extend_from_slice(env!("CARGO_PKG_NAME").as_bytes());
    body.extend_from_slice(b"</h1></header><body>Current dir: ");
    push_escaped(&mut body, &path_text_to_utf8(dir.as_os_str()));
    body.extend_from_slice(b"<br><br>");

    for entry in entries {
        let name = path_text_to_utf8(&entry.name);

        body.extend_from_slice(b"<a href='");
        push_escaped(&mut body, &href_escaped(&name));
        if entry.is_dir {
            body.extend_from_slice(b"/'>");
            push_escaped(&mut body, &name);
            body.extend_from_slice(b"/</a><br>");
        } else {
            body.extend_from_slice(b"'>");
            push_escaped(&mut body, &name);
            body.extend_from_slice(b"</a>   ");
            body.extend_from_slice(format_size(entry.size).as_bytes());
            body.extend_from_slice(b" <br>");
        }
    }

    body.extend_from_slice(b"</body></html>");
    body
}

/// Escapa con `%XX` los bytes que el navegador no devolvería tal cual en la
/// ruta del link (`%`, `#`, `?`)
fn href_escaped(name: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len());
    for &byte in name {
        match byte {
            b'%' => out.extend_from_slice(b"%25"),
            b'#' => out.extend_from_slice(b"%23"),
            b'?' => out.extend_from_slice(b"%3F"),
            _ => out.push(byte),
        }
    }
    out
}

/// Copia `text` escapando los caracteres especiales de HTML
fn push_escaped(out: &mut Vec<u8>, text: &[u8]) {
    for &byte in text {
        match byte {
            b'&' => out.extend_from_slice(b"&amp;"),
            b'<' => out.extend_from_slice(b"&lt;"),
            b'>' => out.extend_from_slice(b"&gt;"),
            b'\'' => out.extend_from_slice(b"&#39;"),
            b'"' => out.extend_from_slice(b"&quot;"),
            _ => out.push(byte),
        }
    }
}
