//! Kalshi API response types
//!
//! Read-only views over the JSON the API returns. Prices and amounts arrive
//! in cents; the `*_dollars` accessors convert. Fields not modelled here are
//! kept in `extra`.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use kalshi_core::{Action, OrderType, Side};

fn cents_to_dollars(cents: i64) -> Decimal {
    Decimal::from(cents) / Decimal::ONE_HUNDRED
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

// ============================================================================
// Markets
// ============================================================================

/// Response from GET /markets
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
    pub markets: Vec<Market>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Response from GET /markets/{ticker}
#[derive(Debug, Clone, Deserialize)]
pub struct MarketResponse {
    pub market: Market,
}

/// Response from GET /markets/{ticker}/orderbook
#[derive(Debug, Clone, Deserialize)]
pub struct OrderbookResponse {
    pub orderbook: Value,
}

/// Response from GET /markets/{ticker}/history
#[derive(Debug, Clone, Deserialize)]
pub struct MarketHistoryResponse {
    pub history: Value,
}

/// A Kalshi market
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Market {
    /// Market ticker (unique identifier)
    pub ticker: String,

    #[serde(default)]
    pub event_ticker: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub subtitle: Option<String>,

    /// open, closed, settled, ...
    #[serde(default)]
    pub status: Option<String>,

    /// YES price in cents (1-99)
    #[serde(default)]
    pub yes_price: Option<i64>,

    /// NO price in cents
    #[serde(default)]
    pub no_price: Option<i64>,

    #[serde(default)]
    pub volume: i64,

    #[serde(default)]
    pub open_interest: i64,

    #[serde(default)]
    pub close_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub settle_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Market {
    pub fn is_open(&self) -> bool {
        self.status.as_deref() == Some("open")
    }

    pub fn is_settled(&self) -> bool {
        self.status.as_deref() == Some("settled")
    }

    /// Absolute difference between the YES and NO prices, in cents
    pub fn spread(&self) -> Option<i64> {
        Some((self.yes_price? - self.no_price?).abs())
    }

    pub fn yes_price_dollars(&self) -> Option<Decimal> {
        self.yes_price.map(cents_to_dollars)
    }

    pub fn no_price_dollars(&self) -> Option<Decimal> {
        self.no_price.map(cents_to_dollars)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (Status: {})",
            self.ticker,
            self.title,
            self.status.as_deref().unwrap_or("unknown")
        )
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Response from endpoints returning a single order
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Order {
    pub order_id: String,

    #[serde(default)]
    pub client_order_id: Option<String>,

    pub ticker: String,
    pub side: Side,
    pub action: Action,

    #[serde(rename = "type", default)]
    pub order_type: OrderType,

    /// resting, pending, filled, canceled, ...
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub count: i64,

    /// Limit price in cents
    #[serde(default)]
    pub price: Option<i64>,

    #[serde(default)]
    pub filled_count: i64,

    #[serde(default)]
    pub remaining_count: i64,

    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_time: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Order {
    pub fn is_filled(&self) -> bool {
        self.status == "filled"
    }

    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }

    pub fn is_canceled(&self) -> bool {
        self.status == "canceled"
    }

    pub fn is_partially_filled(&self) -> bool {
        self.filled_count > 0 && self.remaining_count > 0
    }

    /// Filled share of the order, 0-100
    pub fn fill_percentage(&self) -> Decimal {
        percentage(Decimal::from(self.filled_count), Decimal::from(self.count))
    }

    pub fn price_dollars(&self) -> Option<Decimal> {
        self.price.map(cents_to_dollars)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {} {} @ ", self.order_id, self.action, self.count, self.ticker)?;
        match self.price {
            Some(cents) => write!(f, "{}¢", cents)?,
            None => write!(f, "market")?,
        }
        write!(f, " ({})", self.status)
    }
}

// ============================================================================
// Portfolio
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PositionsResponse {
    #[serde(alias = "market_positions")]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionResponse {
    pub position: Position,
}

/// A position in one market; negative `position` means net NO contracts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Position {
    pub ticker: String,

    #[serde(default)]
    pub side: Option<Side>,

    /// Contract count
    #[serde(default)]
    pub position: i64,

    /// Cents
    #[serde(default)]
    pub market_value: i64,

    /// Cents
    #[serde(default)]
    pub total_cost: i64,

    /// Cents
    #[serde(default)]
    pub unrealized_pnl: i64,

    /// Cents
    #[serde(default)]
    pub realized_pnl: i64,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Position {
    /// Cost per contract in cents
    pub fn average_cost(&self) -> Decimal {
        if self.position == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.total_cost) / Decimal::from(self.position.abs())
    }

    pub fn is_long(&self) -> bool {
        self.position > 0
    }

    pub fn is_short(&self) -> bool {
        self.position < 0
    }

    pub fn is_profitable(&self) -> bool {
        self.unrealized_pnl > 0
    }

    /// Realized plus unrealized, in cents
    pub fn total_pnl(&self) -> i64 {
        self.realized_pnl + self.unrealized_pnl
    }

    /// Unrealized P&L as a percentage of total cost
    pub fn return_percentage(&self) -> Decimal {
        percentage(
            Decimal::from(self.unrealized_pnl),
            Decimal::from(self.total_cost),
        )
    }

    pub fn market_value_dollars(&self) -> Decimal {
        cents_to_dollars(self.market_value)
    }
}

/// Response from GET /portfolio/balance
///
/// The API has returned both a bare cent amount and a detailed object under
/// `balance`; either is accepted.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = self
            .side
            .unwrap_or(if self.is_short() { Side::No } else { Side::Yes });
        let pnl = cents_to_dollars(self.unrealized_pnl);
        let sign = if pnl.is_sign_negative() { "-" } else { "" };
        write!(
            f,
            "{} {}: {} contracts, PnL: {}${:.2}",
            self.ticker,
            side,
            self.position,
            sign,
            pnl.abs()
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub balance: BalanceBody,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BalanceBody {
    Detailed(Balance),
    Cents(i64),
}

impl From<BalanceBody> for Balance {
    fn from(body: BalanceBody) -> Self {
        match body {
            BalanceBody::Detailed(balance) => balance,
            BalanceBody::Cents(cents) => Balance {
                balance: cents,
                available_balance: cents,
                ..Balance::default()
            },
        }
    }
}

/// Account balance, all amounts in cents
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Balance {
    #[serde(default)]
    pub balance: i64,

    #[serde(default)]
    pub payout: i64,

    #[serde(default)]
    pub fees: i64,

    #[serde(default)]
    pub available_balance: i64,

    #[serde(default)]
    pub pending_balance: i64,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Balance {
    pub fn balance_dollars(&self) -> Decimal {
        cents_to_dollars(self.balance)
    }

    pub fn available_balance_dollars(&self) -> Decimal {
        cents_to_dollars(self.available_balance)
    }

    pub fn pending_balance_dollars(&self) -> Decimal {
        cents_to_dollars(self.pending_balance)
    }

    pub fn payout_dollars(&self) -> Decimal {
        cents_to_dollars(self.payout)
    }

    pub fn fees_dollars(&self) -> Decimal {
        cents_to_dollars(self.fees)
    }

    /// Whether `amount_cents` can be covered by the available balance
    pub fn has_sufficient_balance(&self, amount_cents: i64) -> bool {
        self.available_balance >= amount_cents
    }

    pub fn available_percentage(&self) -> Decimal {
        percentage(
            Decimal::from(self.available_balance),
            Decimal::from(self.balance),
        )
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Balance: ${:.2} (Available: ${:.2})",
            self.balance_dollars(),
            self.available_balance_dollars()
        )
    }
}

// ============================================================================
// Query filters
// ============================================================================

/// Filters for GET /markets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketFilters {
    pub status: Option<String>,
    pub ticker: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for order and fill listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilters {
    pub status: Option<String>,
    pub ticker: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Filters for position and settlement listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionFilters {
    pub ticker: Option<String>,
    pub settlement_status: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}
