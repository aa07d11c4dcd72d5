//! Kalshi API client
//!
//! Entry point that owns the credential and request pipeline and hands out
//! the market, trading and portfolio services.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use kalshi_core::{Environment, KalshiResult};

use crate::config::ClientConfig;
use crate::rest::RestClient;
use crate::services::{MarketService, PortfolioService, TradeService};
use crate::transport::HttpTransport;

pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Kalshi API client
///
/// ```no_run
/// use kalshi_client::{ClientConfig, Environment, KalshiClient};
///
/// # async fn run() -> kalshi_core::KalshiResult<()> {
/// let config = ClientConfig::new("your-api-key-id", std::fs::read_to_string("kalshi.pem").unwrap())
///     .with_environment(Environment::Demo);
/// let client = KalshiClient::new(config)?;
///
/// let balance = client.portfolio().get_balance().await?;
/// println!("Available balance: ${}", balance.available_balance_dollars());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KalshiClient {
    rest: RestClient,
    markets: MarketService,
    trading: TradeService,
    portfolio: PortfolioService,
}

/// Summary of a client's configuration, safe to log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiInfo {
    pub environment: Environment,
    pub base_url: String,
    pub api_key_id: String,
    pub sdk_version: String,
}

impl KalshiClient {
    /// Create a client; fails if the private key cannot be parsed
    pub fn new(config: ClientConfig) -> KalshiResult<Self> {
        let rest = RestClient::new(&config)?;
        info!(
            environment = %config.environment,
            "Created Kalshi client for {}",
            config.base_url()
        );
        Ok(Self::from_rest(rest))
    }

    /// Create a client from environment variables (see [`ClientConfig::from_env`])
    pub fn from_env() -> KalshiResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client that sends requests through `transport`
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> KalshiResult<Self> {
        let rest = RestClient::with_transport(&config, transport)?;
        Ok(Self::from_rest(rest))
    }

    fn from_rest(rest: RestClient) -> Self {
        Self {
            markets: MarketService::new(rest.clone()),
            trading: TradeService::new(rest.clone()),
            portfolio: PortfolioService::new(rest.clone()),
            rest,
        }
    }

    pub fn markets(&self) -> &MarketService {
        &self.markets
    }

    pub fn trading(&self) -> &TradeService {
        &self.trading
    }

    pub fn portfolio(&self) -> &PortfolioService {
        &self.portfolio
    }

    /// The underlying request pipeline, for endpoints without a wrapper
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub fn environment(&self) -> Environment {
        self.rest.environment()
    }

    /// Check the API with an authenticated balance request
    pub async fn test_connection(&self) -> bool {
        match self.portfolio.get_balance().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Kalshi connection test failed: {}", e);
                false
            }
        }
    }

    pub fn api_info(&self) -> ApiInfo {
        ApiInfo {
            environment: self.rest.environment(),
            base_url: self.rest.base_url().to_string(),
            api_key_id: self.rest.api_key_id().to_string(),
            sdk_version: SDK_VERSION.to_string(),
        }
    }
}

impl std::fmt::Debug for KalshiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KalshiClient")
            .field("environment", &self.rest.environment())
            .field("base_url", &self.rest.base_url())
            .finish()
    }
}
