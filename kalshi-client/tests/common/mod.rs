//! Shared fixtures: a scripted transport and a throwaway RSA key

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::pss::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use kalshi_client::auth::{HEADER_ACCESS_KEY, HEADER_ACCESS_SIGNATURE, HEADER_ACCESS_TIMESTAMP};
use kalshi_client::{
    ClientConfig, Environment, HttpRequest, HttpResponse, HttpTransport, RetryPolicy,
    TransportError,
};

pub const KEY_ID: &str = "test-key-id";

pub fn test_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        RsaPrivateKey::new(&mut rng, 2048).expect("failed to generate RSA key")
    })
}

pub fn test_pem() -> String {
    test_key()
        .to_pkcs8_pem(LineEnding::LF)
        .expect("failed to encode key")
        .to_string()
}

/// Demo config with the default retry policy but no jitter
pub fn test_config() -> ClientConfig {
    ClientConfig::new(KEY_ID, test_pem())
        .with_environment(Environment::Demo)
        .with_retry_policy(RetryPolicy::default().with_max_jitter(Duration::ZERO))
}

/// Check the auth headers of a captured request against the canonical message
pub fn assert_signed(request: &HttpRequest, method: &str, path: &str) {
    let header = |name: &str| {
        request
            .headers
            .get(name)
            .unwrap_or_else(|| panic!("missing header {}", name))
            .to_str()
            .unwrap()
            .to_string()
    };

    assert_eq!(header(HEADER_ACCESS_KEY), KEY_ID);
    let timestamp = header(HEADER_ACCESS_TIMESTAMP);
    assert!(timestamp.parse::<i64>().is_ok(), "timestamp {:?}", timestamp);

    let signature = BASE64.decode(header(HEADER_ACCESS_SIGNATURE)).unwrap();
    let signature = Signature::try_from(signature.as_slice()).unwrap();
    let verifying_key = VerifyingKey::<Sha256>::new(RsaPublicKey::from(test_key()));
    let message = format!("{}{}{}", timestamp, method, path);

    verifying_key
        .verify(message.as_bytes(), &signature)
        .unwrap_or_else(|e| panic!("signature does not verify for {:?}: {}", message, e));
}

type Scripted = Result<HttpResponse, TransportError>;

/// Replays queued responses in order, then repeats `fallback` forever
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Option<HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn always(response: HttpResponse) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(response),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(response) => Ok(response.clone()),
            None => Err(TransportError::new("script exhausted")),
        }
    }
}

/// Never answers
pub struct HangingTransport {
    pub calls: Mutex<usize>,
}

#[async_trait]
impl HttpTransport for HangingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        *self.calls.lock().unwrap() += 1;
        std::future::pending().await
    }
}
