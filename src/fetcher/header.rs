//! Response header parsing and body decoding.

use encoding_rs::Encoding;

use crate::app::{GemletError, Result};

/// Longest header accepted: two status characters, a space and 1024 bytes of meta.
pub const MAX_HEADER_BYTES: usize = 1029;

/// Split a header line (without its line terminator) into status and meta.
pub fn parse_header(line: &str) -> (String, String) {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.split_once(char::is_whitespace) {
        Some((status, meta)) => (status.to_string(), meta.trim().to_string()),
        None => (line.to_string(), String::new()),
    }
}

/// The `charset=` parameter of a MIME type, if any.
pub fn charset(meta: &str) -> Option<&str> {
    meta.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

/// Decode a body with the charset named in `meta` (UTF-8 by default) and
/// split it into lines.
pub fn decode_body(body: &[u8], meta: &str) -> Result<Vec<String>> {
    let encoding = match charset(meta) {
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| GemletError::UnknownCharset(label.to_string()))?,
        None => encoding_rs::UTF_8,
    };

    // A byte order mark overrides the declared charset and is not content
    let (encoding, body) = match Encoding::for_bom(body) {
        Some((bom_encoding, bom_len)) => (bom_encoding, &body[bom_len..]),
        None => (encoding, body),
    };

    let text = encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| GemletError::Decode(encoding.name().to_string()))?;

    Ok(text.lines().map(String::from).collect())
}
