//! JSON codec for envelopes.

use thiserror::Error;

use crate::envelope::{RequestEnvelope, ResponseEnvelope};

/// Inbound payload is not a well-formed request envelope.
#[derive(Debug, Error)]
#[error("invalid HTTP request envelope: {source}")]
pub struct DecodeError {
    #[from]
    source: serde_json::Error,
}

impl DecodeError {
    /// Line of the payload where parsing stopped.
    pub fn line(&self) -> usize {
        self.source.line()
    }

    /// Column of the payload where parsing stopped.
    pub fn column(&self) -> usize {
        self.source.column()
    }
}

/// Decode a request envelope. Missing fields default to empty; unknown fields
/// are ignored.
pub fn decode_request(bytes: &[u8]) -> Result<RequestEnvelope, DecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode a response envelope.
pub fn encode_response(response: &ResponseEnvelope) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn decodes_full_request() {
        let payload = br#"{
            "id": "req-1",
            "method": "POST",
            "url": "http://example.test/items",
            "headers": {"Content-Type": ["application/json"], "X-Trace": ["a", "b"]},
            "cookies": {"session": "abc"},
            "body": "{\"name\":\"x\"}"
        }"#;

        let request = decode_request(payload).unwrap();
        assert_eq!(request.id, "req-1");
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "http://example.test/items");
        assert_eq!(request.headers["X-Trace"], vec!["a", "b"]);
        assert_eq!(request.cookies["session"], "abc");
        assert_eq!(request.body, r#"{"name":"x"}"#);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let request = decode_request(br#"{"id": "1", "method": "GET", "url": "http://x.test"}"#).unwrap();
        assert!(request.headers.is_empty());
        assert!(request.cookies.is_empty());
        assert!(request.body.is_empty());
    }

    #[test]
    fn null_fields_default_to_empty() {
        let request = decode_request(
            br#"{"id":"1","method":"GET","url":"http://x.test","headers":null,"cookies":null,"body":null}"#,
        )
        .unwrap();
        assert_eq!(request.id, "1");
        assert!(request.headers.is_empty());
        assert!(request.cookies.is_empty());
        assert!(request.body.is_empty());
    }

    #[test]
    fn header_order_follows_payload() {
        let request = decode_request(
            br#"{"headers": {"Zeta": ["1"], "Alpha": ["2"], "Mid": ["3", "4"]}}"#,
        )
        .unwrap();
        let names: Vec<&str> = request.headers.keys().map(String::as_str).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let err = decode_request(b"{not json").unwrap_err();
        assert!(err.to_string().starts_with("invalid HTTP request envelope"));
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn wrong_field_type_is_a_decode_error() {
        assert!(decode_request(br#"{"id": "1", "headers": {"X": "not-a-list"}}"#).is_err());
    }

    #[test]
    fn encodes_wire_field_names() {
        let request = RequestEnvelope {
            id: "7".into(),
            method: "GET".into(),
            url: "http://example.test/ok".into(),
            ..Default::default()
        };
        let mut response = ResponseEnvelope::for_request(&request, "host-a");
        response.status = "200 OK".into();
        response.status_code = 200;
        response.headers.insert("X-Trace".into(), vec!["a".into(), "b".into()]);
        response.body = "pong".into();

        let value: Value = serde_json::from_slice(&encode_response(&response).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "7",
                "workername": "host-a",
                "method": "GET",
                "status": "200 OK",
                "statuscode": 200,
                "url": "http://example.test/ok",
                "headers": {"X-Trace": ["a", "b"]},
                "body": "pong"
            })
        );
    }
}
