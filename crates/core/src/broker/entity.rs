use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::broker::error::BrokerError;

/// # Summary
/// 券商侧的标的唯一标识 (symbolId)。
///
/// # Invariants
/// - 仅在同一券商账户的会话内有效，由符号表加载得到。
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SymbolId(pub i64);

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// # Summary
/// 符号表条目：标的名称与券商 ID 的映射。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol_id: SymbolId,
    pub name: String,
}

/// # Summary
/// 委托类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    /// 市价单
    Market,
    /// 限价单
    Limit,
    /// 止损触发单
    Stop,
}

/// # Summary
/// 交易方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// 买入 (做多)
    Buy,
    /// 卖出 (做空)
    Sell,
}

/// # Summary
/// 调用方提交的原始下单意图，尚未校验、尚未解析标的 ID。
///
/// # Invariants
/// - `volume` 使用券商原生整数单位 (raw units)，本层不做手数换算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub kind: OrderKind,
    pub side: OrderSide,
    pub volume: Decimal,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl OrderIntent {
    /// # Summary
    /// 校验下单意图并返回券商原生单位的整数数量。
    ///
    /// # Logic
    /// 1. 标的名称不能为空。
    /// 2. 数量必须为正整数且能放入 `u64`。
    /// 3. 所有价格字段若存在必须为有限正数。
    /// 4. LIMIT / STOP 单必须携带 `entry_price`。
    pub fn validate(&self) -> Result<u64, BrokerError> {
        if self.symbol.trim().is_empty() {
            return Err(BrokerError::InvalidOrder("symbol must not be empty".into()));
        }

        if self.volume <= Decimal::ZERO || !self.volume.fract().is_zero() {
            return Err(BrokerError::InvalidOrder(format!(
                "volume must be a positive whole number of raw units, got {}",
                self.volume
            )));
        }
        let volume = self.volume.to_u64().ok_or_else(|| {
            BrokerError::InvalidOrder(format!("volume {} is out of range", self.volume))
        })?;

        for (name, value) in [
            ("entry_price", self.entry_price),
            ("stop_loss", self.stop_loss),
            ("take_profit", self.take_profit),
        ] {
            match value {
                Some(v) if !v.is_finite() || v <= 0.0 => {
                    return Err(BrokerError::InvalidOrder(format!(
                        "{} must be a positive price, got {}",
                        name, v
                    )));
                }
                _ => {}
            }
        }

        if matches!(self.kind, OrderKind::Limit | OrderKind::Stop) && self.entry_price.is_none() {
            return Err(BrokerError::InvalidOrder(format!(
                "{:?} order requires entry_price",
                self.kind
            )));
        }

        Ok(volume)
    }

    /// # Summary
    /// 校验通过后绑定券商标的 ID，生成可直接提交的委托票据。
    ///
    /// 市价单不携带委托价。
    pub fn into_ticket(self, symbol_id: SymbolId) -> Result<OrderTicket, BrokerError> {
        let volume = self.validate()?;
        let price = match self.kind {
            OrderKind::Market => None,
            OrderKind::Limit | OrderKind::Stop => self.entry_price,
        };
        Ok(OrderTicket {
            symbol_id,
            symbol: self.symbol.trim().to_uppercase(),
            kind: self.kind,
            side: self.side,
            volume,
            price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
        })
    }
}

/// # Summary
/// 经过校验的委托票据，直接序列化后发往券商网关。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub symbol_id: SymbolId,
    pub symbol: String,
    pub kind: OrderKind,
    pub side: OrderSide,
    /// 券商原生整数单位
    pub volume: u64,
    pub price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

/// # Summary
/// 券商返回的持仓记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub position_id: i64,
    pub symbol_id: SymbolId,
    pub side: OrderSide,
    pub volume: u64,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    /// 开仓时间 (ISO-8601)
    pub open_time: Option<String>,
}

/// # Summary
/// 券商返回的挂单记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub order_id: i64,
    pub symbol_id: SymbolId,
    pub kind: OrderKind,
    pub side: OrderSide,
    pub volume: u64,
    pub price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

/// # Summary
/// 下单回执。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderReceipt {
    /// 券商订单 ID
    #[schema(example = 40213377)]
    pub order_id: Option<i64>,
    /// 成交后关联的持仓 ID (挂单为空)
    pub position_id: Option<i64>,
    /// 券商回报的执行状态
    #[schema(example = "ORDER_FILLED")]
    pub status: String,
    pub message: Option<String>,
}
