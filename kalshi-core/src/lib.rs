//! Core types for the Kalshi client
//!
//! This crate defines the pieces shared by every layer of the client: the
//! error taxonomy, the target environments, and pre-flight validation of
//! order and market parameters.

pub mod environment;
pub mod error;
pub mod validation;

pub use environment::{Environment, API_PREFIX, DEMO_BASE_URL, PRODUCTION_BASE_URL};
pub use error::{ErrorKind, KalshiError, KalshiResult};
pub use validation::{
    format_price, generate_client_order_id, validate_order_params, validate_ticker, Action,
    OrderParams, OrderType, Side, ValidatedOrder,
};
