//! `data:` URI helpers for inline image content

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A decoded base64 `data:` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Encode bytes as `data:<mime>;base64,<payload>`
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    data_uri_from_base64(mime_type, &STANDARD.encode(bytes))
}

/// Wrap an already base64-encoded payload as a `data:` URI
pub fn data_uri_from_base64(mime_type: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, payload)
}

/// Decode a base64 `data:` URI.
///
/// Returns `Ok(None)` when the string is not a data URI at all (for example a
/// remote URL) and `Err` when it claims to be one but cannot be decoded.
pub fn parse_data_uri(uri: &str) -> Result<Option<DataUri>, String> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Ok(None);
    };

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URI has no payload separator".to_string())?;

    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| format!("unsupported data URI encoding '{}'", header))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid base64 payload: {}", e))?;

    Ok(Some(DataUri {
        mime_type: mime_type.to_string(),
        bytes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_then_parse() {
        let uri = encode_data_uri("image/png", b"\x89PNG fake");
        assert!(uri.starts_with("data:image/png;base64,"));
        let parsed = parse_data_uri(&uri).unwrap().unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.bytes, b"\x89PNG fake");
    }

    #[test]
    fn test_wrapped_payload_parses() {
        let payload = STANDARD.encode(b"jpeg bytes");
        let uri = data_uri_from_base64("image/jpeg", &payload);
        let parsed = parse_data_uri(&uri).unwrap().unwrap();
        assert_eq!(parsed.mime_type, "image/jpeg");
        assert_eq!(parsed.bytes, b"jpeg bytes");
    }

    #[test]
    fn test_remote_url_is_not_data_uri() {
        assert_eq!(parse_data_uri("https://example.com/a.png").unwrap(), None);
    }

    #[test]
    fn test_malformed_data_uri() {
        assert!(parse_data_uri("data:image/png;base64").is_err());
        assert!(parse_data_uri("data:text/plain,hello").is_err());
        assert!(parse_data_uri("data:image/png;base64,!!!").is_err());
    }
}
