//! Request authentication
//!
//! Kalshi authenticates every private request with three headers: the API
//! key id, a timestamp in milliseconds, and an RSA-PSS (SHA-256) signature
//! over `timestamp + METHOD + path`.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::BlindedSigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use tracing::debug;

use kalshi_core::{KalshiError, KalshiResult};

pub const HEADER_ACCESS_KEY: &str = "KALSHI-ACCESS-KEY";
pub const HEADER_ACCESS_SIGNATURE: &str = "KALSHI-ACCESS-SIGNATURE";
pub const HEADER_ACCESS_TIMESTAMP: &str = "KALSHI-ACCESS-TIMESTAMP";

// ============================================================================
// Credential
// ============================================================================

/// API key id plus the RSA private key that signs requests
///
/// The key is parsed once here; a `Credential` that exists always holds a
/// usable key.
pub struct Credential {
    account_id: String,
    signing_key: BlindedSigningKey<Sha256>,
}

impl Credential {
    /// Parse `key_material` and build a credential
    ///
    /// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1 (`BEGIN RSA PRIVATE KEY`)
    /// PEM, or the bare base64 body of either.
    pub fn new(account_id: impl Into<String>, key_material: &str) -> KalshiResult<Self> {
        let private_key = parse_private_key(key_material)?;

        Ok(Self {
            account_id: account_id.into(),
            // Salt length defaults to the digest length (32 bytes)
            signing_key: BlindedSigningKey::<Sha256>::new(private_key),
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Sign `message` with RSA-PSS
    ///
    /// The padding is randomized, so signing the same message twice yields
    /// different bytes. Both verify.
    pub fn sign(&self, message: &[u8]) -> KalshiResult<Vec<u8>> {
        let mut rng = rand::thread_rng();
        let signature = self
            .signing_key
            .try_sign_with_rng(&mut rng, message)
            .map_err(|e| KalshiError::auth(format!("Failed to sign message: {}", e)))?;

        Ok(signature.to_vec())
    }

    #[cfg(test)]
    pub(crate) fn verifying_key(&self) -> rsa::pss::VerifyingKey<Sha256> {
        use rsa::signature::Keypair;
        self.signing_key.verifying_key()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("account_id", &self.account_id)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

fn parse_private_key(key_material: &str) -> KalshiResult<RsaPrivateKey> {
    let key_material = key_material.trim();
    if key_material.is_empty() {
        return Err(KalshiError::auth("Failed to load private key: key material is empty"));
    }

    if key_material.contains("-----BEGIN") {
        // PEM - try PKCS#8 first, then PKCS#1
        return RsaPrivateKey::from_pkcs8_pem(key_material)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(key_material))
            .map_err(|e| KalshiError::auth(format!("Failed to load private key: {}", e)));
    }

    let clean_b64: String = key_material
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(&format_as_pem(&clean_b64, "PRIVATE KEY")) {
        return Ok(key);
    }

    RsaPrivateKey::from_pkcs1_pem(&format_as_pem(&clean_b64, "RSA PRIVATE KEY")).map_err(|e| {
        KalshiError::auth(format!(
            "Failed to load private key (tried PKCS#8 and PKCS#1): {}",
            e
        ))
    })
}

/// Wrap bare base64 in PEM armor with 64-column lines
fn format_as_pem(b64_content: &str, key_type: &str) -> String {
    let mut pem = format!("-----BEGIN {}-----\n", key_type);
    for chunk in b64_content.as_bytes().chunks(64) {
        pem.push_str(&String::from_utf8_lossy(chunk));
        pem.push('\n');
    }
    pem.push_str(&format!("-----END {}-----\n", key_type));
    pem
}

// ============================================================================
// Request Signer
// ============================================================================

/// The three authentication header values for one request
///
/// Built right before a send and dropped after it. Never reuse one across
/// attempts: the timestamp goes stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub access_key: String,
    pub timestamp_millis: i64,
    pub signature: String,
}

impl SignedHeaders {
    /// Header name/value pairs in wire form
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        [
            (HEADER_ACCESS_KEY, self.access_key.clone()),
            (HEADER_ACCESS_SIGNATURE, self.signature.clone()),
            (HEADER_ACCESS_TIMESTAMP, self.timestamp_millis.to_string()),
        ]
        .into_iter()
    }
}

/// Builds [`SignedHeaders`] from a method, a path and a timestamp
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSigner;

impl RequestSigner {
    /// Sign a request
    ///
    /// `path` is the request path as sent on the wire, starting with `/`.
    /// Anything from `?` onward is not part of the signed message.
    pub fn build_headers(
        method: &str,
        path: &str,
        credential: &Credential,
        now: DateTime<Utc>,
    ) -> KalshiResult<SignedHeaders> {
        let timestamp_millis = now.timestamp_millis();
        let message = canonical_message(timestamp_millis, method, path);

        let signature = credential.sign(message.as_bytes())?;

        debug!(
            method = %method.to_uppercase(),
            path = %signing_path(path),
            timestamp_millis,
            "Signed Kalshi request"
        );

        Ok(SignedHeaders {
            access_key: credential.account_id().to_string(),
            timestamp_millis,
            signature: BASE64.encode(signature),
        })
    }
}

/// `timestamp + METHOD + path`, with any query string removed from `path`
pub fn canonical_message(timestamp_millis: i64, method: &str, path: &str) -> String {
    format!(
        "{}{}{}",
        timestamp_millis,
        method.to_uppercase(),
        signing_path(path)
    )
}

/// Path portion of a request target, without the query string
pub fn signing_path(path: &str) -> &str {
    path.split_once('?').map_or(path, |(path, _)| path)
}
