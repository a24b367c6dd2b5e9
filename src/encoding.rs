//! # Conversión de Codificaciones
//! src/encoding.rs
//!
//! Puente entre las tres representaciones de texto que usa el servidor:
//!
//! - **Texto nativo**: bytes en la codificación "estrecha" de la plataforma
//!   (lo que llega por CLI o lo que se imprime en consola).
//! - **Texto de path**: [`OsString`], la forma con la que la plataforma
//!   nombra archivos.
//! - **UTF-8**: lo que viaja en la URI (ya decodificada) y en el HTML.
//!
//! En Unix el texto nativo y el de path son los mismos bytes; en otras
//! plataformas el texto nativo se exige UTF-8.
//!
//! `path_text_to_utf8` es un codificador manual por unidad de código:
//! nunca falla y deja pasar surrogates sueltos tal cual (puede producir
//! UTF-8 no canónico).

use crate::error::EncodingError;
use std::ffi::{OsStr, OsString};

/// Texto nativo (estrecho) → texto de path
pub fn native_text_to_path_text(text: &[u8]) -> Result<OsString, EncodingError> {
    if text.contains(&0) {
        return Err(EncodingError::InteriorNul);
    }

    #[cfg(unix)]
    let path = {
        use std::os::unix::ffi::OsStringExt;
        OsString::from_vec(text.to_vec())
    };

    #[cfg(not(unix))]
    let path = OsString::from(std::str::from_utf8(text).map_err(|_| EncodingError::InvalidUtf8)?);

    Ok(path)
}

/// Texto de path → texto nativo (inversa de [`native_text_to_path_text`])
pub fn path_text_to_native_text(path: &OsStr) -> Result<Vec<u8>, EncodingError> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_bytes().to_vec()
    };

    #[cfg(not(unix))]
    let bytes = path
        .to_str()
        .ok_or(EncodingError::Unrepresentable)?
        .as_bytes()
        .to_vec();

    if bytes.contains(&0) {
        return Err(EncodingError::InteriorNul);
    }
    Ok(bytes)
}

/// UTF-8 → texto de path
///
/// Se usa para convertir la URI decodificada en un componente de path.
pub fn utf8_to_path_text(text: &[u8]) -> Result<OsString, EncodingError> {
    let text = std::str::from_utf8(text).map_err(|_| EncodingError::InvalidUtf8)?;
    if text.contains('\0') {
        return Err(EncodingError::InteriorNul);
    }
    Ok(OsString::from(text))
}

/// Texto de path → UTF-8, para mostrar nombres de archivo en HTML
pub fn path_text_to_utf8(path: &OsStr) -> Vec<u8> {
    let mut out = Vec::with_capacity(path.len());
    for unit in code_units(path) {
        encode_code_unit(unit, &mut out);
    }
    out
}

#[cfg(windows)]
fn code_units(path: &OsStr) -> Vec<u32> {
    use std::os::windows::ffi::OsStrExt;
    path.encode_wide().map(u32::from).collect()
}

#[cfg(not(windows))]
fn code_units(path: &OsStr) -> Vec<u32> {
    path.to_string_lossy().chars().map(u32::from).collect()
}

/// Codifica una unidad de código con la regla de prefijos de longitud de UTF-8
///
/// | Rango             | Bytes |
/// |-------------------|-------|
/// | `< 0x80`          | 1     |
/// | `< 0x800`         | 2     |
/// | `< 0x10000`       | 3     |
/// | `< 0x200000`      | 4     |
/// | resto             | 5 (forma extendida antigua) |
pub fn encode_code_unit(unit: u32, out: &mut Vec<u8>) {
    let cont = |shift: u32| 0x80 | ((unit >> shift) & 0x3f) as u8;

    if unit < 0x80 {
        out.push(unit as u8);
    } else if unit < 0x800 {
        out.extend_from_slice(&[0xc0 | (unit >> 6) as u8, cont(0)]);
    } else if unit < 0x10000 {
        out.extend_from_slice(&[0xe0 | (unit >> 12) as u8, cont(6), cont(0)]);
    } else if unit < 0x200000 {
        out.extend_from_slice(&[0xf0 | (unit >> 18) as u8, cont(12), cont(6), cont(0)]);
    } else {
        out.extend_from_slice(&[
            0xf8 | (unit >> 24) as u8,
            cont(18),
            cont(12),
            cont(6),
            cont(0),
        ]);
    }
}

/// Decodifica los escapes `%XX` de una URI
///
/// - `%` seguido de al menos dos caracteres: se reemplaza por el byte que
///   forman esos dos dígitos hexadecimales.
/// - Un dígito que no es hexadecimal vale `-1`; el byte resultante es
///   `16*alto + bajo` truncado a 8 bits. No se rechaza ningún escape.
/// - `%` con menos de dos caracteres detrás se copia literal.
///
/// # Ejemplo
/// ```
/// use file_server::encoding::percent_decode;
///
/// assert_eq!(percent_decode(b"/a%20b.txt"), b"/a b.txt");
/// assert_eq!(percent_decode(b"/100%"), b"/100%");
/// ```
pub fn percent_decode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if input[i] == b'%' && i + 2 < input.len() {
            let hi = hex_value(input[i + 1]);
            let lo = hex_value(input[i + 2]);
            out.push((16 * hi + lo) as u8);
            i += 3;
        } else {
            out.push(input[i]);
            i += 1;
        }
    }

    out
}

fn hex_value(digit: u8) -> i32 {
    match digit {
        b'0'..=b'9' => i32::from(digit - b'0'),
        b'a'..=b'f' => i32::from(digit - b'a' + 10),
        b'A'..=b'F' => i32::from(digit - b'A' + 10),
        _ => -1,
    }
}
