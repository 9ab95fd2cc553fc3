//! REST implementation of the exchange adapter.
//!
//! Talks to a StandX-style perpetuals API: JSON envelopes with a
//! `code`/`message`/`data` triple, decimal values encoded as strings,
//! bearer-token auth.

use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use gridmm_core::{
    BalanceSnapshot, ClientOrderId, OpenOrder, OrderAck, OrderRequest, OrderSide, OrderStatus,
    OrderType, Position, PositionSide, Price, Size, Symbol, Ticker, TimeInForce,
};

use crate::error::{AdapterError, AdapterResult};
use crate::exchange::ExchangeAdapter;
use async_trait::async_trait;

fn default_base_url() -> String {
    "https://api.standx.io".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Connection settings for the REST adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// API root, e.g. `https://api.standx.io`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token. Usually left out of the file and supplied via the
    /// `GRIDMM_API_TOKEN` environment variable instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

/// REST client implementing [`ExchangeAdapter`].
pub struct RestAdapter {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl RestAdapter {
    pub fn new(config: &RestConfig) -> AdapterResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AdapterError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request, unwrap HTTP and envelope failures, return the envelope.
    async fn send_envelope<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> AdapterResult<ApiEnvelope<T>> {
        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| AdapterError::Http(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Http(format!("HTTP {status}: {body}")));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(format!("Failed to parse response: {e}")))?;

        if envelope.code != 0 {
            return Err(AdapterError::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }

        Ok(envelope)
    }

    /// Like `send_envelope`, but the endpoint must return a payload.
    async fn send_data<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> AdapterResult<T> {
        self.send_envelope(request)
            .await?
            .data
            .ok_or_else(|| AdapterError::Parse("Response missing data".to_string()))
    }
}

#[async_trait]
impl ExchangeAdapter for RestAdapter {
    async fn get_ticker(&self, symbol: &Symbol) -> AdapterResult<Ticker> {
        let request = self
            .client
            .get(self.url("/api/v1/ticker"))
            .query(&[("symbol", symbol.as_str())]);
        let wire: WireTicker = self.send_data(request).await?;
        wire.into_ticker()
    }

    async fn get_open_orders(&self, symbol: &Symbol) -> AdapterResult<Vec<OpenOrder>> {
        let request = self
            .client
            .get(self.url("/api/v1/orders/open"))
            .query(&[("symbol", symbol.as_str())]);
        let wire: Vec<WireOrder> = self.send_data(request).await?;

        let mut orders = Vec::with_capacity(wire.len());
        for entry in wire {
            match entry.into_open_order() {
                Some(order) => orders.push(order),
                None => debug!("Dropping malformed order entry from open-orders response"),
            }
        }
        Ok(orders)
    }

    async fn place_order(&self, request: &OrderRequest) -> AdapterResult<OrderAck> {
        let cl_ord_id = ClientOrderId::new();
        let body = NewOrderBody {
            symbol: request.symbol.as_str(),
            side: request.side,
            order_type: request.order_type,
            quantity: request.quantity.inner(),
            price: request.price.inner(),
            time_in_force: request.time_in_force,
            reduce_only: request.reduce_only,
            cl_ord_id: cl_ord_id.as_str(),
        };
        debug!(
            symbol = %request.symbol,
            side = %request.side,
            price = %request.price,
            quantity = %request.quantity,
            reduce_only = request.reduce_only,
            "Submitting order"
        );

        let request = self.client.post(self.url("/api/v1/orders")).json(&body);
        let wire: WireOrderAck = self.send_data(request).await?;
        Ok(OrderAck {
            order_id: wire.order_id.into_string(),
        })
    }

    async fn cancel_order(&self, order_id: u64) -> AdapterResult<()> {
        let body = CancelBody {
            order_id: order_id.to_string(),
        };
        let request = self
            .client
            .post(self.url("/api/v1/orders/cancel"))
            .json(&body);
        self.send_envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn cancel_orders_by_ids(&self, order_ids: &[u64]) -> AdapterResult<()> {
        let body = CancelBatchBody {
            order_ids: order_ids.iter().map(u64::to_string).collect(),
        };
        let request = self
            .client
            .post(self.url("/api/v1/orders/cancel-batch"))
            .json(&body);
        self.send_envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    async fn get_position(&self, symbol: &Symbol) -> AdapterResult<Option<Position>> {
        let request = self
            .client
            .get(self.url("/api/v1/position"))
            .query(&[("symbol", symbol.as_str())]);
        let envelope: ApiEnvelope<WirePosition> = self.send_envelope(request).await?;
        Ok(envelope.data.and_then(WirePosition::into_position))
    }

    async fn get_balances(&self) -> AdapterResult<Vec<BalanceSnapshot>> {
        let request = self.client.get(self.url("/api/v1/balances"));
        let wire: Vec<WireBalance> = self.send_data(request).await?;
        Ok(wire
            .into_iter()
            .filter_map(WireBalance::into_snapshot)
            .collect())
    }
}

// === Wire formats ===

/// Standard response envelope. `code` zero means success.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiEnvelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<T>,
}

/// Order id appears as a JSON number or string depending on endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Num(u64),
    Str(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireTicker {
    #[serde(default)]
    mark_price: Option<serde_json::Value>,
    #[serde(default)]
    mid_price: Option<serde_json::Value>,
    #[serde(default)]
    last_price: Option<serde_json::Value>,
}

impl WireTicker {
    fn into_ticker(self) -> AdapterResult<Ticker> {
        Ok(Ticker {
            mark_price: parse_price_field(self.mark_price.as_ref(), "mark_price")?,
            mid_price: parse_price_field(self.mid_price.as_ref(), "mid_price")?,
            last_price: parse_price_field(self.last_price.as_ref(), "last_price")?,
        })
    }
}

/// A present-but-unparseable ticker price is an error rather than a
/// silent `None`: quoting around a garbled reference is worse than
/// skipping the cycle.
fn parse_price_field(
    value: Option<&serde_json::Value>,
    field: &'static str,
) -> AdapterResult<Option<Price>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => decimal_from_value(v)
            .map(|d| Some(Price::new(d)))
            .ok_or_else(|| AdapterError::Parse(format!("Unparseable {field}: {v}"))),
    }
}

#[derive(Debug, Deserialize)]
struct WireOrder {
    #[serde(default)]
    order_id: Option<WireId>,
    #[serde(default)]
    side: Option<String>,
    #[serde(default)]
    price: Option<serde_json::Value>,
    #[serde(default)]
    quantity: Option<serde_json::Value>,
    #[serde(default)]
    status: Option<OrderStatus>,
    #[serde(default)]
    created_at: Option<serde_json::Value>,
}

impl WireOrder {
    /// `None` when the entry lacks an id or a recognizable side; an
    /// unparseable price is carried as `price: None` so the caller can
    /// decide what to do with it.
    fn into_open_order(self) -> Option<OpenOrder> {
        let order_id = self.order_id?.into_string();
        let side = OrderSide::from_label(self.side.as_deref()?)?;

        Some(OpenOrder {
            order_id,
            side,
            price: self
                .price
                .as_ref()
                .and_then(decimal_from_value)
                .map(Price::new),
            quantity: self
                .quantity
                .as_ref()
                .and_then(decimal_from_value)
                .map(Size::new)
                .unwrap_or(Size::ZERO),
            status: self.status.unwrap_or(OrderStatus::Unknown),
            created_at: self.created_at.as_ref().and_then(millis_from_value),
        })
    }
}

#[derive(Debug, Serialize)]
struct NewOrderBody<'a> {
    symbol: &'a str,
    side: OrderSide,
    order_type: OrderType,
    #[serde(with = "rust_decimal::serde::str")]
    quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    time_in_force: TimeInForce,
    reduce_only: bool,
    cl_ord_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireOrderAck {
    order_id: WireId,
}

#[derive(Debug, Serialize)]
struct CancelBody {
    order_id: String,
}

#[derive(Debug, Serialize)]
struct CancelBatchBody {
    order_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WirePosition {
    #[serde(default)]
    side: Option<String>,
    #[serde(default)]
    size: Option<serde_json::Value>,
    #[serde(default)]
    entry_price: Option<serde_json::Value>,
}

impl WirePosition {
    fn into_position(self) -> Option<Position> {
        let raw_size = self.size.as_ref().and_then(decimal_from_value)?;

        let side = match self
            .side
            .as_deref()
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("long") | Some("buy") => PositionSide::Long,
            Some("short") | Some("sell") => PositionSide::Short,
            // No label: fall back to the sign of the reported size.
            _ if raw_size.is_sign_negative() => PositionSide::Short,
            _ => PositionSide::Long,
        };

        Some(Position {
            side,
            size: Size::new(raw_size.abs()),
            entry_price: self
                .entry_price
                .as_ref()
                .and_then(decimal_from_value)
                .map(Price::new),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireBalance {
    #[serde(default)]
    asset: Option<String>,
    #[serde(default)]
    total: Option<Decimal>,
    #[serde(default)]
    available: Option<Decimal>,
    #[serde(default)]
    equity: Option<Decimal>,
    #[serde(default)]
    margin_used: Option<Decimal>,
}

impl WireBalance {
    fn into_snapshot(self) -> Option<BalanceSnapshot> {
        Some(BalanceSnapshot {
            asset: self.asset?,
            total: self.total.unwrap_or(Decimal::ZERO),
            available: self.available.unwrap_or(Decimal::ZERO),
            equity: self.equity,
            margin_used: self.margin_used,
        })
    }
}

/// Decode a decimal that may arrive as a JSON string or number.
fn decimal_from_value(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

/// Decode an epoch-milliseconds timestamp that may arrive as a JSON
/// number or string.
fn millis_from_value(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_envelope_success() {
        let json = r#"{"code":0,"message":"ok","data":{"mark_price":"100000"}}"#;
        let envelope: ApiEnvelope<WireTicker> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, 0);
        let ticker = envelope.data.unwrap().into_ticker().unwrap();
        assert_eq!(ticker.mark_price, Some(Price::new(dec!(100000))));
        assert_eq!(ticker.mid_price, None);
    }

    #[test]
    fn test_envelope_without_data() {
        let json = r#"{"code":0,"message":"ok"}"#;
        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.code, 0);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_ticker_numeric_fields() {
        let json = r#"{"mark_price":100000.5,"last_price":"99999"}"#;
        let wire: WireTicker = serde_json::from_str(json).unwrap();
        let ticker = wire.into_ticker().unwrap();
        assert_eq!(ticker.mark_price, Some(Price::new(dec!(100000.5))));
        assert_eq!(ticker.last_price, Some(Price::new(dec!(99999))));
    }

    #[test]
    fn test_ticker_garbled_price_is_error() {
        let json = r#"{"mark_price":"not-a-number"}"#;
        let wire: WireTicker = serde_json::from_str(json).unwrap();
        assert!(wire.into_ticker().is_err());
    }

    #[test]
    fn test_order_conversion() {
        let json = r#"{
            "order_id": 42,
            "side": "buy",
            "price": "99800",
            "quantity": "0.0001",
            "status": "open",
            "created_at": 1700000000000
        }"#;
        let wire: WireOrder = serde_json::from_str(json).unwrap();
        let order = wire.into_open_order().unwrap();
        assert_eq!(order.order_id, "42");
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.price, Some(Price::new(dec!(99800))));
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.created_at, Some(1_700_000_000_000));
    }

    #[test]
    fn test_order_missing_id_dropped() {
        let json = r#"{"side":"buy","price":"99800","status":"open"}"#;
        let wire: WireOrder = serde_json::from_str(json).unwrap();
        assert!(wire.into_open_order().is_none());
    }

    #[test]
    fn test_order_unknown_side_dropped() {
        let json = r#"{"order_id":"7","side":"hedge","price":"99800"}"#;
        let wire: WireOrder = serde_json::from_str(json).unwrap();
        assert!(wire.into_open_order().is_none());
    }

    #[test]
    fn test_order_garbled_price_becomes_none() {
        let json = r#"{"order_id":"7","side":"sell","price":"oops","status":"open"}"#;
        let wire: WireOrder = serde_json::from_str(json).unwrap();
        let order = wire.into_open_order().unwrap();
        assert_eq!(order.price, None);
    }

    #[test]
    fn test_order_long_short_labels() {
        let json = r#"{"order_id":"7","side":"short","price":"100200","status":"open"}"#;
        let wire: WireOrder = serde_json::from_str(json).unwrap();
        assert_eq!(wire.into_open_order().unwrap().side, OrderSide::Sell);
    }

    #[test]
    fn test_new_order_body_shape() {
        let body = NewOrderBody {
            symbol: "BTC-USD",
            side: OrderSide::Buy,
            order_type: OrderType::Limit,
            quantity: dec!(0.0001),
            price: dec!(99800),
            time_in_force: TimeInForce::GoodTilCancelled,
            reduce_only: false,
            cl_ord_id: "gridmm_1_abc",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["symbol"], "BTC-USD");
        assert_eq!(json["side"], "buy");
        assert_eq!(json["order_type"], "limit");
        assert_eq!(json["quantity"], "0.0001");
        assert_eq!(json["price"], "99800");
        assert_eq!(json["time_in_force"], "gtc");
        assert_eq!(json["reduce_only"], false);
    }

    #[test]
    fn test_position_sign_fallback() {
        let json = r#"{"size":"-0.5"}"#;
        let wire: WirePosition = serde_json::from_str(json).unwrap();
        let position = wire.into_position().unwrap();
        assert_eq!(position.side, PositionSide::Short);
        assert_eq!(position.size, Size::new(dec!(0.5)));
    }

    #[test]
    fn test_position_labelled() {
        let json = r#"{"side":"long","size":"0.25","entry_price":"98000"}"#;
        let wire: WirePosition = serde_json::from_str(json).unwrap();
        let position = wire.into_position().unwrap();
        assert_eq!(position.side, PositionSide::Long);
        assert_eq!(position.entry_price, Some(Price::new(dec!(98000))));
    }

    #[test]
    fn test_balance_conversion() {
        let json = r#"{"asset":"USDC","total":"1000.5","available":"900","margin_used":"100.5"}"#;
        let wire: WireBalance = serde_json::from_str(json).unwrap();
        let snapshot = wire.into_snapshot().unwrap();
        assert_eq!(snapshot.asset, "USDC");
        assert_eq!(snapshot.total, dec!(1000.5));
        assert_eq!(snapshot.equity, None);
    }
}
