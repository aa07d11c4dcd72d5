//! HTTP transport seam
//!
//! The request pipeline talks to the network only through [`HttpTransport`].
//! [`ReqwestTransport`] is the production implementation; tests plug in a
//! scripted transport instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use thiserror::Error;

/// A fully prepared request: URL, headers (including auth) and body
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Base URL joined with the request path
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    /// Serialized JSON body
    pub body: Option<String>,
    pub timeout: Duration,
}

/// Status, headers and raw body of a received response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// No response was obtained
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            message: format!("request timed out after {:?}", after),
            timed_out: true,
        }
    }
}

/// Sends one HTTP request and returns whatever response came back
///
/// Implementations must not interpret status codes; every received response,
/// successful or not, is returned as `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`HttpTransport`] backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(timeout)
            } else {
                TransportError::new(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| TransportError {
            message: format!("Failed to read response body: {}", e),
            timed_out: e.is_timeout(),
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
