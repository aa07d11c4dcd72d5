//! Endpoint catalogs built on top of [`RestClient`](crate::RestClient)
//!
//! Each service validates its inputs, picks a method and path, and decodes
//! the JSON result. Transport, signing and retries are left to the pipeline.

mod markets;
mod portfolio;
mod trading;

pub use markets::MarketService;
pub use portfolio::PortfolioService;
pub use trading::TradeService;

/// Append `key=value` to a query when the value is present
fn push_param(query: &mut Vec<(String, String)>, key: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        query.push((key.to_string(), value.to_string()));
    }
}
