//! Market data endpoints

use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use kalshi_core::{validate_ticker, KalshiError, KalshiResult, API_PREFIX};

use super::push_param;
use crate::rest::RestClient;
use crate::types::{
    Market, MarketFilters, MarketHistoryResponse, MarketResponse, MarketsResponse,
    OrderbookResponse,
};

const DEFAULT_LIMIT: u32 = 100;
const DEFAULT_SEARCH_LIMIT: u32 = 50;
const DEFAULT_TRENDING_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    categories: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MarketService {
    rest: RestClient,
}

impl MarketService {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// List markets matching `filters` (limit defaults to 100)
    #[instrument(skip(self))]
    pub async fn get_markets(&self, filters: &MarketFilters) -> KalshiResult<Vec<Market>> {
        let mut query = Vec::new();
        push_param(&mut query, "limit", Some(filters.limit.unwrap_or(DEFAULT_LIMIT)));
        push_param(&mut query, "status", filters.status.as_deref());
        if let Some(ticker) = filters.ticker.as_deref() {
            push_param(&mut query, "ticker", Some(validate_ticker(ticker)?));
        }
        push_param(&mut query, "category", filters.category.as_deref());
        push_param(&mut query, "cursor", filters.cursor.as_deref());

        let path = format!("{}/markets", API_PREFIX);
        let response: MarketsResponse = self.rest.get(&path, Some(&query)).await?;
        Ok(response.markets)
    }

    #[instrument(skip(self))]
    pub async fn get_market(&self, ticker: &str) -> KalshiResult<Market> {
        let ticker = validate_ticker(ticker)?;
        let path = format!("{}/markets/{}", API_PREFIX, ticker);
        let response: MarketResponse = self.rest.get(&path, None).await?;
        Ok(response.market)
    }

    /// Order book for a market, `depth` price levels per side
    #[instrument(skip(self))]
    pub async fn get_orderbook(&self, ticker: &str, depth: u32) -> KalshiResult<Value> {
        let ticker = validate_ticker(ticker)?;
        let path = format!("{}/markets/{}/orderbook", API_PREFIX, ticker);
        let query = vec![("depth".to_string(), depth.to_string())];

        let response: OrderbookResponse = self.rest.get(&path, Some(&query)).await?;
        Ok(response.orderbook)
    }

    #[instrument(skip(self))]
    pub async fn get_market_history(
        &self,
        ticker: &str,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> KalshiResult<Value> {
        let ticker = validate_ticker(ticker)?;
        let path = format!("{}/markets/{}/history", API_PREFIX, ticker);

        let mut query = Vec::new();
        push_param(&mut query, "limit", Some(limit.unwrap_or(DEFAULT_LIMIT)));
        push_param(&mut query, "cursor", cursor);

        let response: MarketHistoryResponse = self.rest.get(&path, Some(&query)).await?;
        Ok(response.history)
    }

    /// Free-text market search (limit defaults to 50)
    #[instrument(skip(self))]
    pub async fn search_markets(&self, query: &str, limit: Option<u32>) -> KalshiResult<Vec<Market>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(KalshiError::validation("Search query must not be empty"));
        }

        let params = vec![
            ("query".to_string(), query.to_string()),
            ("limit".to_string(), limit.unwrap_or(DEFAULT_SEARCH_LIMIT).to_string()),
        ];
        let path = format!("{}/markets/search", API_PREFIX);
        let response: MarketsResponse = self.rest.get(&path, Some(&params)).await?;
        Ok(response.markets)
    }

    #[instrument(skip(self))]
    pub async fn get_market_categories(&self) -> KalshiResult<Vec<String>> {
        let path = format!("{}/markets/categories", API_PREFIX);
        let response: CategoriesResponse = self.rest.get(&path, None).await?;
        Ok(response.categories)
    }

    #[instrument(skip(self))]
    pub async fn get_trending_markets(&self, limit: Option<u32>) -> KalshiResult<Vec<Market>> {
        let params = vec![(
            "limit".to_string(),
            limit.unwrap_or(DEFAULT_TRENDING_LIMIT).to_string(),
        )];
        let path = format!("{}/markets/trending", API_PREFIX);
        let response: MarketsResponse = self.rest.get(&path, Some(&params)).await?;
        Ok(response.markets)
    }

    pub async fn get_markets_by_category(
        &self,
        category: &str,
        limit: Option<u32>,
    ) -> KalshiResult<Vec<Market>> {
        let filters = MarketFilters {
            category: Some(category.to_string()),
            limit,
            ..MarketFilters::default()
        };
        self.get_markets(&filters).await
    }

    pub async fn get_open_markets(&self, limit: Option<u32>) -> KalshiResult<Vec<Market>> {
        self.markets_with_status("open", limit).await
    }

    pub async fn get_closed_markets(&self, limit: Option<u32>) -> KalshiResult<Vec<Market>> {
        self.markets_with_status("closed", limit).await
    }

    pub async fn get_settled_markets(&self, limit: Option<u32>) -> KalshiResult<Vec<Market>> {
        self.markets_with_status("settled", limit).await
    }

    async fn markets_with_status(&self, status: &str, limit: Option<u32>) -> KalshiResult<Vec<Market>> {
        let filters = MarketFilters {
            status: Some(status.to_string()),
            limit,
            ..MarketFilters::default()
        };
        self.get_markets(&filters).await
    }
}
