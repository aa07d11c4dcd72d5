//! Kalshi REST client
//!
//! This crate provides an authenticated client for the Kalshi trading API.
//! Every request is signed with RSA-PSS, sent through a pluggable HTTP
//! transport, classified into a typed error, and retried with exponential
//! backoff when the failure is transient.

pub mod auth;
pub mod client;
pub mod config;
pub mod rest;
pub mod retry;
pub mod services;
pub mod transport;
pub mod types;

pub use auth::{canonical_message, Credential, RequestSigner, SignedHeaders};
pub use client::{ApiInfo, KalshiClient};
pub use config::ClientConfig;
pub use kalshi_core::{Environment, ErrorKind, KalshiError, KalshiResult};
pub use rest::RestClient;
pub use retry::{RetryDecision, RetryPolicy, RetryState};
pub use services::{MarketService, PortfolioService, TradeService};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
