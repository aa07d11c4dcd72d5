//! Order management endpoints

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument};

use kalshi_core::{format_price, validate_order_params, KalshiError, KalshiResult, OrderParams, API_PREFIX};

use super::push_param;
use crate::rest::RestClient;
use crate::types::{Order, OrderFilters, OrderResponse, OrdersResponse};

#[derive(Debug, Deserialize)]
struct FillsResponse {
    fills: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct TradeService {
    rest: RestClient,
}

impl TradeService {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Validate and submit an order
    ///
    /// A retried submission is only deduplicated by the exchange through
    /// `client_order_id`; set one explicitly to make retries safe to reason about.
    #[instrument(skip(self))]
    pub async fn place_order(&self, params: &OrderParams) -> KalshiResult<Order> {
        let order = validate_order_params(params)?;
        let path = format!("{}/orders", API_PREFIX);

        let response: OrderResponse = self.rest.post(&path, &order).await?;
        info!(
            order_id = %response.order.order_id,
            client_order_id = %order.client_order_id,
            "Placed Kalshi order"
        );
        Ok(response.order)
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &str) -> KalshiResult<Order> {
        let path = format!("{}/orders/{}", API_PREFIX, validate_order_id(order_id)?);
        let response: OrderResponse = self.rest.delete(&path).await?;
        Ok(response.order)
    }

    #[instrument(skip(self))]
    pub async fn get_orders(&self, filters: &OrderFilters) -> KalshiResult<Vec<Order>> {
        let path = format!("{}/orders", API_PREFIX);
        let response: OrdersResponse = self.rest.get(&path, Some(&order_query(filters))).await?;
        Ok(response.orders)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> KalshiResult<Order> {
        let path = format!("{}/orders/{}", API_PREFIX, validate_order_id(order_id)?);
        let response: OrderResponse = self.rest.get(&path, None).await?;
        Ok(response.order)
    }

    /// Change the size and/or price of a resting order
    #[instrument(skip(self))]
    pub async fn modify_order(
        &self,
        order_id: &str,
        count: Option<u32>,
        price: Option<Decimal>,
    ) -> KalshiResult<Order> {
        let path = format!("{}/orders/{}", API_PREFIX, validate_order_id(order_id)?);

        let mut body = Map::new();
        if let Some(count) = count {
            if count == 0 {
                return Err(KalshiError::validation(
                    "Count must be a positive integer, got: 0",
                ));
            }
            body.insert("count".to_string(), json!(count));
        }
        if let Some(price) = price {
            body.insert("price".to_string(), json!(format_price(price)?));
        }
        if body.is_empty() {
            return Err(KalshiError::validation(
                "Order modification needs a count or a price",
            ));
        }

        let response: OrderResponse = self.rest.put(&path, &Value::Object(body)).await?;
        Ok(response.order)
    }

    #[instrument(skip(self))]
    pub async fn get_fills(&self, filters: &OrderFilters) -> KalshiResult<Vec<Value>> {
        let path = format!("{}/fills", API_PREFIX);
        let response: FillsResponse = self.rest.get(&path, Some(&order_query(filters))).await?;
        Ok(response.fills)
    }

    /// Submit several orders in one request; nothing is sent if any order is invalid
    #[instrument(skip(self, orders), fields(count = orders.len()))]
    pub async fn batch_place_orders(&self, orders: &[OrderParams]) -> KalshiResult<Vec<Order>> {
        let validated = orders
            .iter()
            .map(validate_order_params)
            .collect::<KalshiResult<Vec<_>>>()?;

        let path = format!("{}/orders/batch", API_PREFIX);
        let response: OrdersResponse = self
            .rest
            .post(&path, &json!({ "orders": validated }))
            .await?;
        Ok(response.orders)
    }
}

fn validate_order_id(order_id: &str) -> KalshiResult<&str> {
    let order_id = order_id.trim();
    if order_id.is_empty() || order_id.contains(['/', '?', '#']) {
        return Err(KalshiError::validation(format!(
            "Invalid order id: {:?}",
            order_id
        )));
    }
    Ok(order_id)
}

fn order_query(filters: &OrderFilters) -> Vec<(String, String)> {
    let mut query = Vec::new();
    push_param(&mut query, "status", filters.status.as_deref());
    push_param(&mut query, "ticker", filters.ticker.as_deref());
    push_param(&mut query, "limit", filters.limit);
    push_param(&mut query, "cursor", filters.cursor.as_deref());
    query
}
