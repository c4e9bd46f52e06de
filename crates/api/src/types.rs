//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向调用方 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sessiondesk_core::broker::entity::{
    OrderIntent, OrderKind, OrderReceipt, OrderSide, PendingOrder, Position,
};
use sessiondesk_core::journal::entity::{JournalEntry, JournalReceipt};
use sessiondesk_core::market::entity::{Candle, Session, SessionCandle};

// ============================================================
//  系统 DTO
// ============================================================

/// 健康检查 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 券商连接状态 (Disconnected / Connecting / Ready)
    #[schema(example = "Ready")]
    pub state: String,
    /// 是否已就绪
    #[schema(example = true)]
    pub connected: bool,
    /// 已加载的交易品种数量
    #[schema(example = 120)]
    pub symbols_loaded: usize,
}

// ============================================================
//  行情相关 DTO
// ============================================================

/// 批量时段标注请求
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagSessionsRequest {
    /// 待标注的 K 线，顺序原样保留
    pub candles: Vec<Candle>,
}

fn default_timeframe() -> String {
    "M5".to_string()
}

/// 历史 K 线查询请求
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FetchDataRequest {
    /// 交易品种名称 (大小写不敏感)
    #[schema(example = "EURUSD")]
    pub symbol: String,
    /// K 线周期，默认 M5
    #[serde(default = "default_timeframe")]
    #[schema(example = "M5")]
    pub timeframe: String,
    /// 根数，缺省时按周期取默认值
    #[schema(example = 500)]
    pub num_bars: Option<u32>,
    /// 是否为每根 K 线附加交易时段
    #[serde(default)]
    pub with_sessions: bool,
}

/// K 线数据 DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CandleResponse {
    /// 开盘时间 (ISO 8601, UTC)
    #[schema(example = "2024-01-01T08:30:00Z")]
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 成交量 (券商原始单位)
    pub volume: u64,
    /// 交易时段，仅在请求 `with_sessions` 时出现
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

impl From<Candle> for CandleResponse {
    fn from(c: Candle) -> Self {
        Self {
            time: c.time,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            session: None,
        }
    }
}

impl From<SessionCandle> for CandleResponse {
    fn from(sc: SessionCandle) -> Self {
        Self {
            session: Some(sc.session),
            ..Self::from(sc.candle)
        }
    }
}

/// 历史 K 线查询结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FetchDataResponse {
    #[schema(example = "EURUSD")]
    pub symbol: String,
    #[schema(example = "M5")]
    pub timeframe: String,
    /// 实际请求的根数
    #[schema(example = 500)]
    pub num_bars: u32,
    /// 按时间升序排列的 K 线
    pub ohlc: Vec<CandleResponse>,
}

// ============================================================
//  交易相关 DTO
// ============================================================

/// 持仓明细 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PositionResponse {
    pub position_id: i64,
    /// 品种名称，符号表中找不到时为数字 ID
    #[schema(example = "EURUSD")]
    pub symbol: String,
    pub symbol_id: i64,
    pub direction: OrderSide,
    /// 持仓量 (券商原始单位)
    pub volume: u64,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub open_time: Option<String>,
}

impl PositionResponse {
    pub fn new(position: Position, symbol: String) -> Self {
        Self {
            position_id: position.position_id,
            symbol,
            symbol_id: position.symbol_id.0,
            direction: position.side,
            volume: position.volume,
            entry_price: position.entry_price,
            stop_loss: position.stop_loss,
            take_profit: position.take_profit,
            open_time: position.open_time,
        }
    }
}

/// 持仓列表
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PositionsResponse {
    pub positions: Vec<PositionResponse>,
}

/// 挂单 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingOrderResponse {
    pub order_id: i64,
    #[schema(example = "XAUUSD")]
    pub symbol: String,
    pub symbol_id: i64,
    pub order_type: OrderKind,
    pub direction: OrderSide,
    pub volume: u64,
    /// 限价或止损触发价
    pub price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl PendingOrderResponse {
    pub fn new(order: PendingOrder, symbol: String) -> Self {
        Self {
            order_id: order.order_id,
            symbol,
            symbol_id: order.symbol_id.0,
            order_type: order.kind,
            direction: order.side,
            volume: order.volume,
            price: order.price,
            stop_loss: order.stop_loss,
            take_profit: order.take_profit,
        }
    }
}

/// 下单请求
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    #[schema(example = "EURUSD")]
    pub symbol: String,
    /// MARKET / LIMIT / STOP
    pub order_type: OrderKind,
    /// BUY / SELL
    pub direction: OrderSide,
    /// 券商原始单位的下单量，必须为正整数
    #[schema(value_type = f64, example = 100000)]
    pub volume: Decimal,
    /// 限价单 / 止损单的触发价
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl From<PlaceOrderRequest> for OrderIntent {
    fn from(req: PlaceOrderRequest) -> Self {
        Self {
            symbol: req.symbol,
            kind: req.order_type,
            side: req.direction,
            volume: req.volume,
            entry_price: req.entry_price,
            stop_loss: req.stop_loss,
            take_profit: req.take_profit,
        }
    }
}

/// 下单结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceOrderResponse {
    /// 券商已确认接收
    pub submitted: bool,
    pub details: OrderReceipt,
}

// ============================================================
//  交易日志 DTO
// ============================================================

/// 交易日志写入请求，备注类字段缺省为空串
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JournalEntryRequest {
    #[schema(example = "EURUSD London sweep")]
    pub title: String,
    pub symbol: String,
    pub session: String,
    pub htf_bias: String,
    pub entry_type: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target_price: f64,
    pub order_type: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub checklist: String,
    #[serde(default)]
    pub news_events: String,
    /// 图表截图地址
    pub chart_url: Option<String>,
}

impl From<JournalEntryRequest> for JournalEntry {
    fn from(req: JournalEntryRequest) -> Self {
        Self {
            title: req.title,
            symbol: req.symbol,
            session: req.session,
            htf_bias: req.htf_bias,
            entry_type: req.entry_type,
            entry_price: req.entry_price,
            stop_loss: req.stop_loss,
            target_price: req.target_price,
            order_type: req.order_type,
            note: req.note,
            checklist: req.checklist,
            news_events: req.news_events,
            chart_url: req.chart_url,
        }
    }
}

/// 交易日志写入结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JournalEntryResponse {
    pub page_id: String,
    pub url: Option<String>,
}

impl From<JournalReceipt> for JournalEntryResponse {
    fn from(r: JournalReceipt) -> Self {
        Self {
            page_id: r.page_id,
            url: r.url,
        }
    }
}

// ============================================================
//  通用包装
// ============================================================

/// 统一成功响应包装
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_request_defaults() {
        let req: FetchDataRequest = serde_json::from_str(r#"{"symbol":"EURUSD"}"#).unwrap();
        assert_eq!(req.timeframe, "M5");
        assert_eq!(req.num_bars, None);
        assert!(!req.with_sessions);
    }

    #[test]
    fn test_candle_session_only_when_tagged() {
        let candle = Candle {
            time: "2024-01-01T08:30:00Z".to_string(),
            open: 1.0,
            high: 1.1,
            low: 0.9,
            close: 1.05,
            volume: 10,
        };
        let plain = serde_json::to_value(CandleResponse::from(candle.clone())).unwrap();
        assert!(plain.get("session").is_none());

        let tagged = CandleResponse::from(SessionCandle {
            candle,
            session: Session::London,
        });
        let json = serde_json::to_value(tagged).unwrap();
        assert_eq!(json["session"], "London");
        assert_eq!(json["volume"], 10);
    }

    #[test]
    fn test_journal_request_optional_fields_default_empty() {
        let req: JournalEntryRequest = serde_json::from_str(
            r#"{"title":"t","symbol":"EURUSD","session":"London","htf_bias":"Bullish",
                "entry_type":"FVG","entry_price":1.0,"stop_loss":0.9,"target_price":1.2,
                "order_type":"LIMIT"}"#,
        )
        .unwrap();
        let entry = JournalEntry::from(req);
        assert_eq!(entry.note, "");
        assert_eq!(entry.checklist, "");
        assert_eq!(entry.news_events, "");
        assert_eq!(entry.chart_url, None);
    }

    #[test]
    fn test_journal_request_requires_trade_fields() {
        let missing_bias = r#"{"title":"t","symbol":"EURUSD","session":"London",
            "entry_type":"FVG","entry_price":1.0,"stop_loss":0.9,"target_price":1.2,
            "order_type":"LIMIT"}"#;
        assert!(serde_json::from_str::<JournalEntryRequest>(missing_bias).is_err());
    }

    #[test]
    fn test_place_order_request_volume() {
        let req: PlaceOrderRequest = serde_json::from_str(
            r#"{"symbol":"EURUSD","order_type":"LIMIT","direction":"BUY","volume":100000,"entry_price":1.09}"#,
        )
        .unwrap();
        let intent = OrderIntent::from(req);
        assert_eq!(intent.kind, OrderKind::Limit);
        assert_eq!(intent.validate().unwrap(), 100_000);
    }
}
