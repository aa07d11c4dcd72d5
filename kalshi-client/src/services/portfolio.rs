//! Portfolio endpoints

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use kalshi_core::{validate_ticker, KalshiResult, API_PREFIX};

use super::push_param;
use crate::rest::RestClient;
use crate::types::{Balance, BalanceResponse, Position, PositionFilters, PositionResponse, PositionsResponse};

const DEFAULT_PERFORMANCE_PERIOD: &str = "30d";
const DEFAULT_EXPORT_FORMAT: &str = "csv";

#[derive(Debug, Deserialize)]
struct TradesResponse {
    trades: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SettlementsResponse {
    settlements: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct PortfolioService {
    rest: RestClient,
}

impl PortfolioService {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    #[instrument(skip(self))]
    pub async fn get_balance(&self) -> KalshiResult<Balance> {
        let path = format!("{}/portfolio/balance", API_PREFIX);
        let response: BalanceResponse = self.rest.get(&path, None).await?;
        Ok(response.balance.into())
    }

    #[instrument(skip(self))]
    pub async fn get_positions(&self, filters: &PositionFilters) -> KalshiResult<Vec<Position>> {
        let path = format!("{}/portfolio/positions", API_PREFIX);
        let response: PositionsResponse =
            self.rest.get(&path, Some(&position_query(filters))).await?;
        Ok(response.positions)
    }

    /// Position in one market, or `None` if the account holds none
    ///
    /// A 404 from the exchange means "no position" here; every other error
    /// is passed through unchanged.
    #[instrument(skip(self))]
    pub async fn get_position_by_ticker(&self, ticker: &str) -> KalshiResult<Option<Position>> {
        let ticker = validate_ticker(ticker)?;
        let path = format!("{}/portfolio/positions/{}", API_PREFIX, ticker);

        match self.rest.get::<PositionResponse>(&path, None).await {
            Ok(response) => Ok(Some(response.position)),
            Err(e) if e.is_not_found() => {
                debug!("No Kalshi position for {}", ticker);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_trade_history(
        &self,
        ticker: Option<&str>,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> KalshiResult<Vec<Value>> {
        let mut query = Vec::new();
        if let Some(ticker) = ticker {
            push_param(&mut query, "ticker", Some(validate_ticker(ticker)?));
        }
        push_param(&mut query, "limit", limit);
        push_param(&mut query, "cursor", cursor);

        let path = format!("{}/portfolio/trades", API_PREFIX);
        let response: TradesResponse = self.rest.get(&path, Some(&query)).await?;
        Ok(response.trades)
    }

    /// Account-level summary as returned by the API
    #[instrument(skip(self))]
    pub async fn get_portfolio_summary(&self) -> KalshiResult<Value> {
        let path = format!("{}/portfolio/summary", API_PREFIX);
        self.rest.get(&path, None).await
    }

    /// Profit and loss between optional `YYYY-MM-DD` dates
    #[instrument(skip(self))]
    pub async fn get_pnl_summary(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> KalshiResult<Value> {
        let mut query = Vec::new();
        push_param(&mut query, "start_date", start_date);
        push_param(&mut query, "end_date", end_date);

        let path = format!("{}/portfolio/pnl", API_PREFIX);
        self.rest.get(&path, Some(&query)).await
    }

    /// Performance metrics over `period` (defaults to `30d`)
    #[instrument(skip(self))]
    pub async fn get_portfolio_performance(&self, period: Option<&str>) -> KalshiResult<Value> {
        let query = vec![(
            "period".to_string(),
            period.unwrap_or(DEFAULT_PERFORMANCE_PERIOD).to_string(),
        )];
        let path = format!("{}/portfolio/performance", API_PREFIX);
        self.rest.get(&path, Some(&query)).await
    }

    #[instrument(skip(self))]
    pub async fn export_portfolio_data(
        &self,
        format: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> KalshiResult<Value> {
        let mut query = vec![(
            "format".to_string(),
            format.unwrap_or(DEFAULT_EXPORT_FORMAT).to_string(),
        )];
        push_param(&mut query, "start_date", start_date);
        push_param(&mut query, "end_date", end_date);

        let path = format!("{}/portfolio/export", API_PREFIX);
        self.rest.get(&path, Some(&query)).await
    }

    #[instrument(skip(self))]
    pub async fn get_settlements(&self, filters: &PositionFilters) -> KalshiResult<Vec<Value>> {
        let path = format!("{}/portfolio/settlements", API_PREFIX);
        let response: SettlementsResponse =
            self.rest.get(&path, Some(&position_query(filters))).await?;
        Ok(response.settlements)
    }
}

fn position_query(filters: &PositionFilters) -> Vec<(String, String)> {
    let mut query = Vec::new();
    push_param(&mut query, "ticker", filters.ticker.as_deref());
    push_param(&mut query, "settlement_status", filters.settlement_status.as_deref());
    push_param(&mut query, "limit", filters.limit);
    push_param(&mut query, "cursor", filters.cursor.as_deref());
    query
}
