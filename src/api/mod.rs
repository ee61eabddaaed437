//! HTTP plumbing between the screens and the REST backend.

mod service;
#[cfg(test)]
pub mod fake;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::trace;

use crate::error::ServiceError;

pub use service::EntityService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON, a plain string for non-JSON bodies, `Null` when empty.
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request, exactly once. Implementations never retry.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse, ServiceError>> + Send;
}

/// reqwest-backed transport with a per-request timeout.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse, ServiceError>> + Send {
        let client = self.client.clone();
        async move {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Delete => reqwest::Method::DELETE,
            };

            trace!(?method, url = %request.url, query = ?request.query, "sending request");

            let mut builder = client.request(method, &request.url).query(&request.query);
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let text = response.text().await?;

            Ok(ApiResponse {
                status,
                body: parse_body(&text),
            })
        }
    }
}

pub fn parse_body(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bodies_fall_back_to_plain_text() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("{\"id\": 1}"), json!({"id": 1}));
        assert_eq!(parse_body("Deleted"), json!("Deleted"));
    }

    #[test]
    fn request_builder_accumulates_query() {
        let request = ApiRequest::new(Method::Delete, "http://x/cliente/").query("id_cliente", 5);
        assert_eq!(request.query, vec![("id_cliente".to_string(), "5".to_string())]);
        assert_eq!(request.body, None);
    }
}
