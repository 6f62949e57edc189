//! `data:` URL encoding for stored file contents.

use std::io::Read;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{Error, Result};

pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Read everything from `reader` and wrap it as `data:<mime>;base64,<payload>`.
pub fn encode_reader<R: Read>(mut reader: R, name: &str, mime: &str) -> Result<(String, u64)> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|source| Error::FileEncoding {
            name: name.to_string(),
            source,
        })?;
    let len = buf.len() as u64;
    Ok((encode_bytes(&buf, mime), len))
}

pub fn encode_bytes(bytes: &[u8], mime: &str) -> String {
    let mime = if mime.trim().is_empty() {
        FALLBACK_MIME
    } else {
        mime.trim()
    };
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Decode a stored payload back into raw bytes.
pub fn decode(data_url: &str) -> Result<Vec<u8>> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidPayload("missing data: prefix".into()))?;
    let (meta, body) = rest
        .split_once(',')
        .ok_or_else(|| Error::InvalidPayload("missing ',' separator".into()))?;
    if !meta.ends_with(";base64") {
        return Err(Error::InvalidPayload(format!("unsupported encoding '{meta}'")));
    }
    BASE64
        .decode(body.trim())
        .map_err(|e| Error::InvalidPayload(e.to_string()))
}
