// Plain-data HTTP types and the transport seam.
//
// The executor in `api` builds an `HttpRequest`, hands it to a `Transport`
// and classifies the returned `HttpResponse`. Keeping the network behind a
// trait lets tests count calls or script responses without a server.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt::Display;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// A fully built request: absolute URL, headers in insertion order and an
/// optional already-serialized JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Performs one round-trip. Must return any completed exchange as `Ok`,
/// including 4xx/5xx; `Err` is reserved for transport-level failures.
pub trait Transport {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, String>;
}

/// Blocking reqwest transport. One attempt per call, library timeouts.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder().build()?;
        Ok(ReqwestTransport { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, String> {
        let mut headers = HeaderMap::new();
        for (name, value) in &req.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| e.to_string())?;
            let value = HeaderValue::from_str(value).map_err(|e| e.to_string())?;
            headers.insert(name, value);
        }

        let builder = match req.method {
            HttpMethod::Get => self.client.get(&req.url),
            HttpMethod::Post => self.client.post(&req.url),
            HttpMethod::Put => self.client.put(&req.url),
        };
        let mut builder = builder.headers(headers);
        if let Some(body) = &req.body {
            builder = builder.body(body.clone());
        }

        let res = builder.send().map_err(|e| e.to_string())?;
        let status = res.status().as_u16();
        let body = body_or_empty(status, res.text());
        Ok(HttpResponse { status, body })
    }
}

// A body that fails mid-read still leaves a valid status behind.
fn body_or_empty<E: Display>(status: u16, read: Result<String, E>) -> String {
    read.unwrap_or_else(|err| {
        warn!(status, error = %err, "failed to read response body");
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://host/x".into(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: None,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn unreadable_body_falls_back_to_empty() {
        assert_eq!(body_or_empty(502, Err::<String, _>("connection reset")), "");
        assert_eq!(body_or_empty::<&str>(200, Ok("{}".to_string())), "{}");
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
    }
}
