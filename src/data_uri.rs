//! Data-URI handling
//!
//! Office hosts hand pictures around as base64 text. Paste and drop paths
//! produce a full `data:<mime>;base64,<payload>` string, while the host
//! selection APIs return the bare payload. Both forms are accepted here;
//! a missing prefix means the payload is assumed to be `image/png`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{InvertError, Result};

/// Media type assumed when the input carries no `data:` prefix
pub const DEFAULT_MIME: &str = "image/png";

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub payload: String,
}

impl DataUri {
    /// Split an input string into media type and base64 payload.
    ///
    /// Never fails: anything without a recognized prefix is taken as raw
    /// base64 and gets the default `image/png` media type.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match split_prefix(input) {
            Some((mime, payload)) => Self {
                mime: if mime.is_empty() {
                    DEFAULT_MIME.to_string()
                } else {
                    mime.to_ascii_lowercase()
                },
                payload: payload.to_string(),
            },
            None => Self {
                mime: DEFAULT_MIME.to_string(),
                payload: input.to_string(),
            },
        }
    }

    /// Whether `input` already starts with a recognized `data:...;base64,` prefix
    pub fn has_prefix(input: &str) -> bool {
        split_prefix(input.trim()).is_some()
    }

    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            mime: mime.to_string(),
            payload: STANDARD.encode(bytes),
        }
    }

    /// Decode the base64 payload. ASCII whitespace (line wrapping) is ignored.
    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        let compact: String = self
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        if compact.is_empty() {
            return Err(InvertError::Decode("empty image payload".to_string()));
        }

        STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| InvertError::Decode(format!("invalid base64 payload: {}", e)))
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", SCHEME, self.mime, BASE64_MARKER, self.payload)
    }
}

/// Returns `(mime, payload)` when the input is `data:<mime>[;params];base64,<payload>`
fn split_prefix(input: &str) -> Option<(&str, &str)> {
    // ASCII lowercasing keeps byte offsets identical to the original
    let lower = input.to_ascii_lowercase();
    if !lower.starts_with(SCHEME) {
        return None;
    }
    let marker = lower.find(BASE64_MARKER)?;
    let header = &input[SCHEME.len()..marker];
    let mime = header.split(';').next().unwrap_or("").trim();
    Some((mime, &input[marker + BASE64_MARKER.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_uri() {
        let uri = DataUri::parse("data:image/jpeg;base64,AAAA");
        assert_eq!(uri.mime, "image/jpeg");
        assert_eq!(uri.payload, "AAAA");
    }

    #[test]
    fn test_parse_without_prefix_defaults_to_png() {
        let uri = DataUri::parse("  iVBORw0KGgo=\n");
        assert_eq!(uri.mime, DEFAULT_MIME);
        assert_eq!(uri.payload, "iVBORw0KGgo=");
        assert!(!DataUri::has_prefix("iVBORw0KGgo="));
    }

    #[test]
    fn test_parse_uppercase_scheme_and_params() {
        let uri = DataUri::parse("DATA:Image/GIF;name=a.gif;BASE64,R0lG");
        assert_eq!(uri.mime, "image/gif");
        assert_eq!(uri.payload, "R0lG");
        assert!(DataUri::has_prefix("DATA:Image/GIF;BASE64,R0lG"));
    }

    #[test]
    fn test_parse_empty_mime_uses_default() {
        let uri = DataUri::parse("data:;base64,AAAA");
        assert_eq!(uri.mime, DEFAULT_MIME);
    }

    #[test]
    fn test_non_base64_data_uri_is_not_recognized() {
        // Percent-encoded data URIs are not a recognized prefix, so the whole
        // string is treated as a payload and later fails to decode.
        let uri = DataUri::parse("data:image/png,abc");
        assert_eq!(uri.payload, "data:image/png,abc");
        assert!(uri.decode_payload().unwrap_err().is_decode());
    }

    #[test]
    fn test_decode_ignores_line_wrapping() {
        let uri = DataUri::parse("data:text/plain;base64,aGVs\r\nbG8=");
        assert_eq!(uri.decode_payload().unwrap(), b"hello");
    }

    #[test]
    fn test_decode_empty_payload() {
        let err = DataUri::parse("data:image/png;base64,").decode_payload().unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_display_roundtrip() {
        let uri = DataUri::from_bytes("image/png", b"hello");
        let text = uri.to_string();
        assert_eq!(text, "data:image/png;base64,aGVsbG8=");
        assert_eq!(DataUri::parse(&text), uri);
    }
}
