//! Input validation for order and market parameters
//!
//! These checks run before a request is built, so a rejected input never
//! reaches the network.

use std::fmt;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{KalshiError, KalshiResult};

/// Contract side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

/// Order action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Limit,
    Market,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Yes => write!(f, "yes"),
            Side::No => write!(f, "no"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
        }
    }
}

/// Order request as supplied by a caller
#[derive(Debug, Clone, PartialEq)]
pub struct OrderParams {
    pub ticker: String,
    pub side: Side,
    pub action: Action,
    pub count: u32,
    pub order_type: OrderType,
    /// Cents (1-99) or a dollar fraction (0.01-0.99). Required for limit orders.
    pub price: Option<Decimal>,
    pub client_order_id: Option<String>,
}

impl OrderParams {
    /// Limit order with the given price
    pub fn limit(
        ticker: impl Into<String>,
        side: Side,
        action: Action,
        count: u32,
        price: Decimal,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            side,
            action,
            count,
            order_type: OrderType::Limit,
            price: Some(price),
            client_order_id: None,
        }
    }

    pub fn market(ticker: impl Into<String>, side: Side, action: Action, count: u32) -> Self {
        Self {
            ticker: ticker.into(),
            side,
            action,
            count,
            order_type: OrderType::Market,
            price: None,
            client_order_id: None,
        }
    }

    pub fn with_client_order_id(mut self, client_order_id: impl Into<String>) -> Self {
        self.client_order_id = Some(client_order_id.into());
        self
    }
}

/// Order body after validation, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedOrder {
    pub ticker: String,
    pub side: Side,
    pub action: Action,
    pub count: u32,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<u8>,
    pub client_order_id: String,
}

/// Trim, upper-case and check a market ticker
pub fn validate_ticker(ticker: &str) -> KalshiResult<String> {
    let normalized = ticker.trim().to_uppercase();

    if normalized.is_empty() {
        return Err(KalshiError::validation("Ticker must be a non-empty string"));
    }

    let well_formed = normalized
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
    if !well_formed {
        return Err(KalshiError::validation(format!(
            "Invalid ticker format: {}",
            ticker
        )));
    }

    Ok(normalized)
}

/// Convert a price to whole cents
///
/// Values strictly between 0 and 1 are read as dollars; anything else is
/// already in cents. The result must lie in 0..=100.
pub fn format_price(price: Decimal) -> KalshiResult<u8> {
    let cents = if price > Decimal::ZERO && price < Decimal::ONE {
        price * Decimal::ONE_HUNDRED
    } else {
        price
    };
    let cents = cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    if cents < Decimal::ZERO || cents > Decimal::ONE_HUNDRED {
        return Err(KalshiError::validation(format!(
            "Price must be between 0 and 100 cents: {}",
            cents
        )));
    }

    cents
        .to_u8()
        .ok_or_else(|| KalshiError::validation(format!("Invalid price: {}", price)))
}

/// Validate an order and fill in defaults
pub fn validate_order_params(params: &OrderParams) -> KalshiResult<ValidatedOrder> {
    let ticker = validate_ticker(&params.ticker)?;

    if params.count == 0 {
        return Err(KalshiError::validation(
            "Count must be a positive integer, got: 0",
        ));
    }

    let price = match params.order_type {
        OrderType::Limit => {
            let price = params
                .price
                .ok_or_else(|| KalshiError::validation("Price is required for limit orders"))?;
            Some(format_price(price)?)
        }
        OrderType::Market => None,
    };

    let client_order_id = params
        .client_order_id
        .clone()
        .unwrap_or_else(generate_client_order_id);

    Ok(ValidatedOrder {
        ticker,
        side: params.side,
        action: params.action,
        count: params.count,
        order_type: params.order_type,
        price,
        client_order_id,
    })
}

/// Client order id of the form `sdk-<millis>-<random>`
pub fn generate_client_order_id() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("sdk-{}-{}", Utc::now().timestamp_millis(), &random[..9])
}
