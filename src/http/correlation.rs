//! Correlation ID resolution.
//!
//! Precedence, first non-blank wins:
//! 1. the outbound response's `X-Correlation-ID`
//! 2. the inbound request's `X-Correlation-ID`
//! 3. a freshly generated UUID v4
//!
//! The chosen value is always written back to the response header, so the
//! caller can read it from every response, success or failure. Header values
//! are echoed byte for byte, including bytes that are not visible ASCII.

use std::fmt;

use axum::http::{HeaderMap, HeaderValue};
use uuid::Uuid;

pub const X_CORRELATION_ID: &str = "x-correlation-id";

/// Correlation id of one request.
///
/// Keeps the raw header bytes for write-back and a lossy UTF-8 rendering for
/// log fields and the error body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId {
    value: HeaderValue,
    text: String,
}

impl CorrelationId {
    pub fn from_header(value: HeaderValue) -> Self {
        let text = String::from_utf8_lossy(value.as_bytes()).into_owned();
        Self { value, text }
    }

    pub fn from_static(value: &'static str) -> Self {
        Self::from_header(HeaderValue::from_static(value))
    }

    pub fn generate() -> Self {
        let text = Uuid::new_v4().to_string();
        // A hyphenated UUID is always a valid header value.
        let value = HeaderValue::from_str(&text).unwrap_or_else(|_| HeaderValue::from_static(""));
        Self { value, text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn header_value(&self) -> &HeaderValue {
        &self.value
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Resolve the correlation ID for a request. Never fails.
pub fn resolve(inbound: &HeaderMap, outbound: Option<&HeaderMap>) -> CorrelationId {
    outbound
        .and_then(header_value)
        .or_else(|| header_value(inbound))
        .map(CorrelationId::from_header)
        .unwrap_or_else(CorrelationId::generate)
}

/// Write the correlation ID to a header map, replacing any previous value.
pub fn propagate(headers: &mut HeaderMap, correlation_id: &CorrelationId) {
    headers.insert(X_CORRELATION_ID, correlation_id.header_value().clone());
}

fn header_value(headers: &HeaderMap) -> Option<HeaderValue> {
    headers
        .get(X_CORRELATION_ID)
        .filter(|v| !v.as_bytes().iter().all(u8::is_ascii_whitespace))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert("X-Correlation-ID", HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_inbound_value_is_used_verbatim() {
        assert_eq!(resolve(&headers("abc-123"), None).as_str(), "abc-123");
    }

    #[test]
    fn test_outbound_value_takes_precedence() {
        let outbound = headers("from-response");
        assert_eq!(
            resolve(&headers("from-request"), Some(&outbound)).as_str(),
            "from-response"
        );
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let outbound = headers("   ");
        assert_eq!(resolve(&headers("req"), Some(&outbound)).as_str(), "req");
    }

    #[test]
    fn test_generates_uuid_when_absent() {
        let id = resolve(&HeaderMap::new(), Some(&HeaderMap::new()));
        assert!(Uuid::parse_str(id.as_str()).is_ok());
        assert_eq!(id.header_value(), id.as_str());
        assert_ne!(id, resolve(&HeaderMap::new(), None));
    }

    #[test]
    fn test_non_ascii_bytes_are_echoed_verbatim() {
        let raw = HeaderValue::from_bytes(b"caf\xe9-1").unwrap();
        let mut inbound = HeaderMap::new();
        inbound.insert(X_CORRELATION_ID, raw.clone());

        let id = resolve(&inbound, None);
        assert_eq!(id.header_value().as_bytes(), b"caf\xe9-1");
        assert_eq!(id.as_str(), "caf\u{FFFD}-1");

        let mut outbound = HeaderMap::new();
        propagate(&mut outbound, &id);
        assert_eq!(outbound[X_CORRELATION_ID], raw);
    }

    #[test]
    fn test_propagate_overwrites() {
        let mut map = headers("old");
        propagate(&mut map, &CorrelationId::from_static("new"));
        assert_eq!(map.get_all(X_CORRELATION_ID).iter().count(), 1);
        assert_eq!(map.get(X_CORRELATION_ID).unwrap(), "new");
    }
}
