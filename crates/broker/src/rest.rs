use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sessiondesk_core::broker::entity::{
    OrderKind, OrderReceipt, OrderSide, OrderTicket, PendingOrder, Position, SymbolId, SymbolInfo,
};
use sessiondesk_core::broker::error::BrokerError;
use sessiondesk_core::broker::port::BrokerGateway;
use sessiondesk_core::config::BrokerConfig;
use sessiondesk_core::market::entity::{Candle, TimeFrame};

/// # Summary
/// 通过 HTTP/JSON 桥接服务访问券商账户的网关实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端通讯，所有请求携带 Bearer Token。
/// - 所有路径都挂在 `/accounts/{account_id}` 之下。
#[derive(Clone)]
pub struct RestBrokerGateway {
    /// 内部使用的 HTTP 客户端
    client: Client,
    base_url: String,
    account_id: String,
    access_token: String,
}

impl RestBrokerGateway {
    /// # Summary
    /// 根据配置创建网关。
    ///
    /// # Logic
    /// 1. 校验账户 ID 非空。
    /// 2. 按配置的请求超时构建 `reqwest` 客户端。
    ///
    /// # Returns
    /// 成功返回网关，客户端构建失败返回 `BrokerError::Config`。
    pub fn new(config: &BrokerConfig) -> Result<Self, BrokerError> {
        if config.account_id.trim().is_empty() {
            return Err(BrokerError::Config("broker.account_id is not set".into()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| BrokerError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.trim().to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/accounts/{}/{}", self.base_url, self.account_id, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.access_token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.access_token)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, BrokerError> {
        let resp = self
            .authorize(self.client.get(self.url(path)).query(query))
            .send()
            .await
            .map_err(|e| BrokerError::Network(e.to_string()))?;

        Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| BrokerError::Parse(e.to_string()))
    }

    /// 非 2xx 响应转换为 `BrokerError::Api`，响应体作为错误信息
    async fn check(resp: Response) -> Result<Response, BrokerError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(BrokerError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

// ============================================================
//  桥接服务报文
// ============================================================

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireSymbol {
    symbol_id: i64,
    symbol_name: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireBar {
    /// 开盘时间 (Unix 毫秒)
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WirePosition {
    position_id: i64,
    symbol_id: i64,
    trade_side: OrderSide,
    volume: u64,
    entry_price: f64,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
    open_timestamp: Option<i64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireOrder {
    order_id: i64,
    symbol_id: i64,
    order_type: OrderKind,
    trade_side: OrderSide,
    volume: u64,
    limit_price: Option<f64>,
    stop_price: Option<f64>,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireNewOrder {
    symbol_id: i64,
    order_type: OrderKind,
    trade_side: OrderSide,
    volume: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    take_profit: Option<f64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireExecution {
    execution_type: String,
    order_id: Option<i64>,
    position_id: Option<i64>,
    description: Option<String>,
}

impl From<&OrderTicket> for WireNewOrder {
    fn from(t: &OrderTicket) -> Self {
        let (limit_price, stop_price) = match t.kind {
            OrderKind::Market => (None, None),
            OrderKind::Limit => (t.price, None),
            OrderKind::Stop => (None, t.price),
        };
        Self {
            symbol_id: t.symbol_id.0,
            order_type: t.kind,
            trade_side: t.side,
            volume: t.volume,
            limit_price,
            stop_price,
            stop_loss: t.stop_loss,
            take_profit: t.take_profit,
        }
    }
}

/// Unix 毫秒转 ISO-8601 (UTC, 秒精度)
fn millis_to_iso(ms: i64) -> Result<String, BrokerError> {
    DateTime::from_timestamp_millis(ms)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| BrokerError::Parse(format!("timestamp {} out of range", ms)))
}

#[async_trait]
impl BrokerGateway for RestBrokerGateway {
    async fn list_symbols(&self) -> Result<Vec<SymbolInfo>, BrokerError> {
        let symbols: Vec<WireSymbol> = self.get_json("symbols", &[]).await?;
        Ok(symbols
            .into_iter()
            .map(|s| SymbolInfo {
                symbol_id: SymbolId(s.symbol_id),
                name: s.symbol_name,
            })
            .collect())
    }

    async fn get_open_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let positions: Vec<WirePosition> = self.get_json("positions", &[]).await?;
        positions
            .into_iter()
            .map(|p| {
                Ok(Position {
                    position_id: p.position_id,
                    symbol_id: SymbolId(p.symbol_id),
                    side: p.trade_side,
                    volume: p.volume,
                    entry_price: p.entry_price,
                    stop_loss: p.stop_loss,
                    take_profit: p.take_profit,
                    open_time: p.open_timestamp.map(millis_to_iso).transpose()?,
                })
            })
            .collect()
    }

    /// # Logic
    /// 1. 以 `symbol_id / period / count` 查询 trendbars。
    /// 2. 毫秒时间戳转换为 ISO-8601 字符串。
    /// 3. 按时间升序返回。
    async fn get_ohlc_data(
        &self,
        symbol_id: SymbolId,
        timeframe: TimeFrame,
        num_bars: u32,
    ) -> Result<Vec<Candle>, BrokerError> {
        let mut bars: Vec<WireBar> = self
            .get_json(
                "trendbars",
                &[
                    ("symbol_id", symbol_id.to_string()),
                    ("period", timeframe.to_string()),
                    ("count", num_bars.to_string()),
                ],
            )
            .await?;
        bars.sort_by_key(|b| b.timestamp);
        debug!("Fetched {} {} bars for symbol {}", bars.len(), timeframe, symbol_id);

        bars.into_iter()
            .map(|b| {
                Ok(Candle {
                    time: millis_to_iso(b.timestamp)?,
                    open: b.open,
                    high: b.high,
                    low: b.low,
                    close: b.close,
                    volume: b.volume,
                })
            })
            .collect()
    }

    async fn get_pending_orders(&self) -> Result<Vec<PendingOrder>, BrokerError> {
        let orders: Vec<WireOrder> = self.get_json("orders", &[]).await?;
        Ok(orders
            .into_iter()
            .map(|o| PendingOrder {
                order_id: o.order_id,
                symbol_id: SymbolId(o.symbol_id),
                kind: o.order_type,
                side: o.trade_side,
                volume: o.volume,
                price: o.limit_price.or(o.stop_price),
                stop_loss: o.stop_loss,
                take_profit: o.take_profit,
            })
            .collect())
    }

    async fn place_order(&self, ticket: &OrderTicket) -> Result<OrderReceipt, BrokerError> {
        let body = WireNewOrder::from(ticket);
        let resp = self
            .authorize(self.client.post(self.url("orders")).json(&body))
            .send()
            .await
            .map_err(|e| BrokerError::Network(e.to_string()))?;

        let execution: WireExecution = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| BrokerError::Parse(e.to_string()))?;

        Ok(OrderReceipt {
            order_id: execution.order_id,
            position_id: execution.position_id,
            status: execution.execution_type,
            message: execution.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_to_iso() {
        assert_eq!(millis_to_iso(1_704_097_800_000).unwrap(), "2024-01-01T08:30:00Z");
        assert!(millis_to_iso(i64::MAX).is_err());
    }

    #[test]
    fn test_new_order_routes_price_by_kind() {
        let mut ticket = OrderTicket {
            symbol_id: SymbolId(1),
            symbol: "EURUSD".to_string(),
            kind: OrderKind::Stop,
            side: OrderSide::Sell,
            volume: 1000,
            price: Some(1.2),
            stop_loss: None,
            take_profit: Some(1.1),
        };
        let wire = WireNewOrder::from(&ticket);
        assert_eq!(wire.stop_price, Some(1.2));
        assert_eq!(wire.limit_price, None);

        ticket.kind = OrderKind::Limit;
        let json = serde_json::to_value(WireNewOrder::from(&ticket)).unwrap();
        assert_eq!(json["limitPrice"], 1.2);
        assert_eq!(json["orderType"], "LIMIT");
        assert_eq!(json["tradeSide"], "SELL");
        assert!(json.get("stopLoss").is_none());
    }

    #[test]
    fn test_requires_account_id() {
        let config = BrokerConfig::default();
        assert!(matches!(
            RestBrokerGateway::new(&config),
            Err(BrokerError::Config(_))
        ));
    }
}
