//! Authenticated REST pipeline
//!
//! Every call goes through the same steps: sign, send, classify, and either
//! return, back off and try again, or surface the error. Each attempt gets a
//! fresh timestamp and signature.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use kalshi_core::{Environment, KalshiError, KalshiResult};

use crate::auth::{Credential, RequestSigner};
use crate::config::{self, ClientConfig, SIGNATURE_CLOCK_SKEW_TOLERANCE};
use crate::retry::{RetryDecision, RetryPolicy, RetryState};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

/// Query parameters as sent on the wire
pub type Query = [(String, String)];

/// Executes signed requests against one Kalshi environment
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn HttpTransport>,
    credential: Arc<Credential>,
    environment: Environment,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RestClient {
    /// Build a client that talks HTTP through `reqwest`
    ///
    /// Fails with `Config` for a zero timeout and `Authentication` if the key
    /// does not parse. Nothing is sent.
    pub fn new(config: &ClientConfig) -> KalshiResult<Self> {
        config.validate()?;
        let credential = Credential::new(&config.api_key_id, &config.private_key_pem)?;
        let transport = ReqwestTransport::new(config.timeout)
            .map_err(|e| KalshiError::config(e.to_string()))?;

        Ok(Self::from_parts(config, credential, Arc::new(transport)))
    }

    /// Build a client over a caller-supplied transport
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> KalshiResult<Self> {
        config.validate()?;
        let credential = Credential::new(&config.api_key_id, &config.private_key_pem)?;
        Ok(Self::from_parts(config, credential, transport))
    }

    fn from_parts(
        config: &ClientConfig,
        credential: Credential,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            credential: Arc::new(credential),
            environment: config.environment,
            base_url: config.base_url().to_string(),
            timeout: config.timeout,
            retry: config.retry,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key_id(&self) -> &str {
        self.credential.account_id()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Send a signed request and return the decoded JSON body
    ///
    /// Transient failures (429, 5xx, no response) are retried per the
    /// configured [`RetryPolicy`]. Dropping the returned future stops the
    /// call, including any pending backoff.
    #[instrument(skip(self, query, body), fields(method = %method))]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        body: Option<&Value>,
    ) -> KalshiResult<Value> {
        validate_path(path)?;

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| KalshiError::validation(format!("Failed to serialize body: {}", e)))?;
        let query = query.unwrap_or_default();

        let mut state = RetryState::new();
        loop {
            let error = match self.attempt(&method, path, query, body.as_deref()).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            match self.retry.decide(&error, &state) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        attempt = state.attempt,
                        kind = %error.kind(),
                        delay_ms = delay.as_millis() as u64,
                        "Kalshi request failed, retrying: {}",
                        error
                    );
                    tokio::time::sleep(delay).await;
                    state.advance();
                }
                RetryDecision::DoNotRetry => {
                    debug!(
                        attempts = state.attempt + 1,
                        kind = %error.kind(),
                        "Kalshi request failed: {}",
                        error
                    );
                    return Err(error);
                }
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Option<&Query>) -> KalshiResult<T> {
        let value = self.execute(Method::GET, path, query, None).await?;
        decode(value)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> KalshiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = to_json(body)?;
        let value = self.execute(Method::POST, path, None, Some(&body)).await?;
        decode(value)
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> KalshiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = to_json(body)?;
        let value = self.execute(Method::PUT, path, None, Some(&body)).await?;
        decode(value)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> KalshiResult<T> {
        let value = self.execute(Method::DELETE, path, None, None).await?;
        decode(value)
    }

    /// One sign + send + classify round
    async fn attempt(
        &self,
        method: &Method,
        path: &str,
        query: &Query,
        body: Option<&str>,
    ) -> KalshiResult<Value> {
        let request = self.build_request(method, path, query, body)?;

        debug!(url = %request.url, "Sending Kalshi request");

        let response = match tokio::time::timeout(self.timeout, self.transport.send(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(self.timeout)),
        }
        .map_err(|e| {
            debug!(timed_out = e.timed_out, "No response from Kalshi: {}", e);
            KalshiError::network(e.message)
        })?;

        classify(response)
    }

    fn build_request(
        &self,
        method: &Method,
        path: &str,
        query: &Query,
        body: Option<&str>,
    ) -> KalshiResult<HttpRequest> {
        let signed = RequestSigner::build_headers(method.as_str(), path, &self.credential, Utc::now())?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(config::USER_AGENT));

        // Signed headers overwrite any base header with the same name
        for (name, value) in signed.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| KalshiError::auth(format!("Invalid header name: {}", e)))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| KalshiError::auth(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        Ok(HttpRequest {
            method: method.clone(),
            url: format!("{}{}", self.base_url, path),
            query: query.to_vec(),
            headers,
            body: body.map(str::to_string),
            timeout: self.timeout,
        })
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Map a received response to a decoded body or an error classification
pub fn classify(response: HttpResponse) -> KalshiResult<Value> {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;

    let message = format!("API request failed: {}", status_line(status));

    match status {
        200..=299 => {
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&body).map_err(|e| KalshiError::Malformed {
                message: format!("Failed to decode response body: {}", e),
                status: Some(status),
                body: Some(body),
            })
        }
        429 => Err(KalshiError::RateLimited {
            message: "Rate limit exceeded".to_string(),
            status,
            body: Some(body),
            retry_after: parse_retry_after(&headers),
        }),
        401 | 403 => Err(KalshiError::Authentication {
            message: format!(
                "{} (check the API key id, the private key, and that the local clock is within {}s of exchange time)",
                message,
                SIGNATURE_CLOCK_SKEW_TOLERANCE.as_secs()
            ),
            status: Some(status),
            body: Some(body),
        }),
        400..=499 => Err(KalshiError::Client {
            message,
            status,
            body: Some(body),
        }),
        500..=599 => Err(KalshiError::Server {
            message,
            status,
            body: Some(body),
        }),
        _ => Err(KalshiError::Malformed {
            message: format!("Unexpected response status: {}", status_line(status)),
            status: Some(status),
            body: Some(body),
        }),
    }
}

/// The signed path must reach the wire byte for byte, so only characters
/// that URL parsing leaves untouched are accepted before the query
fn validate_path(path: &str) -> KalshiResult<()> {
    if !path.starts_with('/') {
        return Err(KalshiError::validation(format!(
            "Request path must start with '/': {}",
            path
        )));
    }

    let path_only = path.split('?').next().unwrap_or(path);
    let is_path_safe = |c: char| c.is_ascii_alphanumeric() || "-._~!$&'()*+,;=:@/%".contains(c);
    if let Some(bad) = path_only.chars().find(|c| !is_path_safe(*c)) {
        return Err(KalshiError::validation(format!(
            "Request path contains {:?}, which is not URL path-safe: {}",
            bad, path
        )));
    }
    Ok(())
}

fn status_line(status: u16) -> String {
    match StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("{} {}", status, reason),
        None => status.to_string(),
    }
}

/// `Retry-After` in delta-seconds form; HTTP-date values are ignored
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> KalshiResult<Value> {
    serde_json::to_value(body)
        .map_err(|e| KalshiError::validation(format!("Failed to serialize body: {}", e)))
}

fn decode<T: DeserializeOwned>(value: Value) -> KalshiResult<T> {
    let raw = value.to_string();
    serde_json::from_value(value).map_err(|e| KalshiError::Malformed {
        message: format!("Unexpected response shape: {}", e),
        status: None,
        body: Some(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_success() {
        let value = classify(HttpResponse::new(200, r#"{"value":1}"#)).unwrap();
        assert_eq!(value, json!({"value": 1}));

        assert_eq!(classify(HttpResponse::new(204, "")).unwrap(), Value::Null);
    }

    #[test]
    fn test_classify_malformed_success_body() {
        let err = classify(HttpResponse::new(200, "<html>oops</html>")).unwrap_err();
        match err {
            KalshiError::Malformed { status, body, .. } => {
                assert_eq!(status, Some(200));
                assert_eq!(body.as_deref(), Some("<html>oops</html>"));
            }
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_status_families() {
        let cases = [
            (429, kalshi_core::ErrorKind::RateLimited),
            (401, kalshi_core::ErrorKind::Authentication),
            (403, kalshi_core::ErrorKind::Authentication),
            (400, kalshi_core::ErrorKind::Client),
            (404, kalshi_core::ErrorKind::Client),
            (409, kalshi_core::ErrorKind::Client),
            (500, kalshi_core::ErrorKind::Server),
            (503, kalshi_core::ErrorKind::Server),
            (302, kalshi_core::ErrorKind::Malformed),
        ];

        for (status, kind) in cases {
            let err = classify(HttpResponse::new(status, "{}")).unwrap_err();
            assert_eq!(err.kind(), kind, "status {}", status);
            assert_eq!(err.status(), Some(status));
            assert_eq!(err.body(), Some("{}"));
        }
    }

    #[test]
    fn test_classify_rate_limit_reads_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

        let err = classify(HttpResponse::new(429, "slow down").with_headers(headers)).unwrap_err();
        match err {
            KalshiError::RateLimited {
                retry_after, body, ..
            } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
                assert_eq!(body.as_deref(), Some("slow down"));
            }
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[test]
    fn test_retry_after_ignores_http_dates() {
        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("/trade-api/v2/markets/KXBTC-25").is_ok());
        assert!(validate_path("/trade-api/v2/markets?status=open").is_ok());
        assert!(validate_path("/v2/a%20b").is_ok());

        for bad in ["v2/x", "/v2/a b", "/v2/x#frag", "/v2/märkte", "/v2/a\\b", "/v2/<x>"] {
            let err = validate_path(bad).unwrap_err();
            assert_eq!(err.kind(), kalshi_core::ErrorKind::Validation, "{}", bad);
        }
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(404), "404 Not Found");
        assert_eq!(status_line(599), "599");
    }
}
