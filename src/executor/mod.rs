//! Outbound HTTP execution.
//!
//! # Responsibilities
//! - Own the single HTTP client shared by every worker
//! - Turn a [`RequestEnvelope`] into an outbound request (method, URL, body,
//!   headers copied verbatim with value order preserved)
//! - Read the full response and describe it as a [`ResponseEnvelope`]
//!
//! # Design Decisions
//! - No timeout unless configured on the client
//! - `cookies` on the envelope are not turned into a `Cookie` header
//! - Response header names are rendered in canonical MIME form
//!   (`content-type` → `Content-Type`)

mod headers;

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use thiserror::Error;
use url::Url;

use crate::config::HttpClientConfig;
use crate::envelope::{Headers, RequestEnvelope, ResponseEnvelope};
use crate::observability::metrics;

pub use headers::canonical_header_key;

/// Failure to complete an outbound HTTP call.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("invalid value for header '{0}'")]
    InvalidHeaderValue(String),

    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Executes request envelopes over a shared client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Build the shared client from configuration.
    pub fn new(config: &HttpClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects));

        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Perform the call described by `request` and describe its response.
    ///
    /// Any HTTP status, including 4xx and 5xx, is a successful execution.
    pub async fn execute(
        &self,
        request: &RequestEnvelope,
        worker_name: &str,
    ) -> Result<ResponseEnvelope, ExecutionError> {
        let method = parse_method(&request.method)?;
        let url = Url::parse(&request.url).map_err(|source| ExecutionError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;
        let headers = build_headers(&request.headers)?;

        let mut outbound = self.client.request(method.clone(), url).headers(headers);
        if !request.body.is_empty() {
            outbound = outbound.body(request.body.clone());
        }

        let start_time = Instant::now();
        let response = outbound.send().await.map_err(|source| ExecutionError::Request {
            url: request.url.clone(),
            source,
        })?;

        let status = response.status();
        let response_headers = collect_headers(response.headers());
        let body = response.bytes().await.map_err(|source| ExecutionError::Body {
            url: request.url.clone(),
            source,
        })?;
        metrics::record_http_call(method.as_str(), status.as_u16(), start_time);

        let mut envelope = ResponseEnvelope::for_request(request, worker_name);
        envelope.status = status_line(status);
        envelope.status_code = status.as_u16();
        envelope.headers = response_headers;
        envelope.body = String::from_utf8_lossy(&body).into_owned();
        Ok(envelope)
    }
}

/// Failure envelope sent to the caller when replies on execution errors are
/// enabled.
pub fn failure_response(
    request: &RequestEnvelope,
    worker_name: &str,
    error: &ExecutionError,
) -> ResponseEnvelope {
    let status = reqwest::StatusCode::BAD_GATEWAY;
    let mut envelope = ResponseEnvelope::for_request(request, worker_name);
    envelope.status = status_line(status);
    envelope.status_code = status.as_u16();
    envelope.body = error.to_string();
    envelope
}

/// An empty method means GET.
fn parse_method(method: &str) -> Result<Method, ExecutionError> {
    if method.is_empty() {
        return Ok(Method::GET);
    }
    Method::from_bytes(method.as_bytes()).map_err(|_| ExecutionError::InvalidMethod(method.to_string()))
}

fn build_headers(headers: &Headers) -> Result<HeaderMap, ExecutionError> {
    let mut map = HeaderMap::new();
    for (name, values) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ExecutionError::InvalidHeaderName(name.clone()))?;
        for value in values {
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ExecutionError::InvalidHeaderValue(name.clone()))?;
            map.append(header_name.clone(), header_value);
        }
    }
    Ok(map)
}

fn collect_headers(headers: &HeaderMap) -> Headers {
    let mut collected = Headers::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        collected.insert(canonical_header_key(name.as_str()), values);
    }
    collected
}

fn status_line(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_method_is_get() {
        assert_eq!(parse_method("").unwrap(), Method::GET);
        assert_eq!(parse_method("PATCH").unwrap(), Method::PATCH);
        assert_eq!(parse_method("PURGE").unwrap().as_str(), "PURGE");
        assert!(matches!(parse_method("BAD METHOD"), Err(ExecutionError::InvalidMethod(_))));
    }

    #[test]
    fn headers_keep_value_order() {
        let mut headers = Headers::new();
        headers.insert("X-Trace".into(), vec!["a".into(), "b".into()]);
        headers.insert("Accept".into(), vec!["text/plain".into()]);

        let map = build_headers(&headers).unwrap();
        let trace: Vec<&str> = map
            .get_all("x-trace")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(trace, ["a", "b"]);
        assert_eq!(map.get("accept").unwrap(), "text/plain");
    }

    #[test]
    fn rejects_unrepresentable_headers() {
        let mut headers = Headers::new();
        headers.insert("Bad Name".into(), vec!["x".into()]);
        assert!(matches!(build_headers(&headers), Err(ExecutionError::InvalidHeaderName(_))));

        let mut headers = Headers::new();
        headers.insert("X-Ok".into(), vec!["line\nbreak".into()]);
        assert!(matches!(build_headers(&headers), Err(ExecutionError::InvalidHeaderValue(_))));
    }

    #[test]
    fn collected_headers_are_canonical() {
        let mut map = HeaderMap::new();
        map.append("x-trace", HeaderValue::from_static("a"));
        map.append("x-trace", HeaderValue::from_static("b"));
        map.append("content-type", HeaderValue::from_static("text/plain"));

        let headers = collect_headers(&map);
        assert_eq!(headers["X-Trace"], vec!["a", "b"]);
        assert_eq!(headers["Content-Type"], vec!["text/plain"]);
    }

    #[test]
    fn status_lines() {
        assert_eq!(status_line(reqwest::StatusCode::OK), "200 OK");
        assert_eq!(status_line(reqwest::StatusCode::NOT_FOUND), "404 Not Found");
        assert_eq!(status_line(reqwest::StatusCode::from_u16(599).unwrap()), "599");
    }

    #[test]
    fn failure_response_is_correlated() {
        let request = RequestEnvelope {
            id: "abc".into(),
            method: "GET".into(),
            url: "http://unreachable.test".into(),
            ..Default::default()
        };
        let error = ExecutionError::InvalidMethod("X Y".into());
        let response = failure_response(&request, "host-a", &error);
        assert_eq!(response.id, "abc");
        assert_eq!(response.status_code, 502);
        assert_eq!(response.status, "502 Bad Gateway");
        assert_eq!(response.body, "invalid HTTP method 'X Y'");
    }

    #[tokio::test]
    async fn invalid_url_fails_before_sending() {
        let executor = HttpExecutor::new(&HttpClientConfig::default()).unwrap();
        let request = RequestEnvelope {
            id: "1".into(),
            method: "GET".into(),
            url: "not a url".into(),
            ..Default::default()
        };
        let err = executor.execute(&request, "host").await.unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidUrl { .. }));
    }
}
