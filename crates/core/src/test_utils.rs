//! # 测试辅助
//!
//! 提供内存版的券商网关与日志网关，供各 crate 的集成测试注入使用。
//! 仅在启用 `test-utils` feature 时编译。

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use dashmap::DashMap;

use crate::broker::entity::{
    OrderKind, OrderReceipt, OrderTicket, PendingOrder, Position, SymbolId, SymbolInfo,
};
use crate::broker::error::BrokerError;
use crate::broker::port::BrokerGateway;
use crate::journal::entity::{JournalEntry, JournalReceipt};
use crate::journal::error::JournalError;
use crate::journal::port::JournalGateway;
use crate::market::entity::{Candle, TimeFrame};

/// 生成 K 线时使用的固定起点: 2024-01-01T00:00:00Z
const CANDLE_ANCHOR_SECS: i64 = 1_704_067_200;

/// 单根 K 线覆盖的秒数
fn bar_seconds(timeframe: TimeFrame) -> i64 {
    match timeframe {
        TimeFrame::M1 => 60,
        TimeFrame::M5 => 300,
        TimeFrame::M15 => 900,
        TimeFrame::M30 => 1800,
        TimeFrame::H1 => 3600,
        TimeFrame::H4 => 14_400,
        TimeFrame::D1 => 86_400,
        TimeFrame::W1 => 604_800,
    }
}

/// # Summary
/// 内存版券商网关。
///
/// # Logic
/// - 符号表在构造时给定，可配置前 N 次拉取失败以模拟连接抖动。
/// - K 线从固定起点按周期等距生成，价格随序号递增，便于断言。
/// - 市价单立即成交并生成持仓，限价/止损单进入挂单列表。
pub struct MockBroker {
    symbols: Vec<SymbolInfo>,
    symbol_failures: AtomicUsize,
    order_delay: Option<Duration>,
    next_id: AtomicI64,
    positions: DashMap<i64, Position>,
    pending: DashMap<i64, PendingOrder>,
    placed: DashMap<i64, OrderTicket>,
}

impl MockBroker {
    /// 使用 `(名称, ID)` 列表创建符号表
    pub fn new(symbols: &[(&str, i64)]) -> Self {
        Self {
            symbols: symbols
                .iter()
                .map(|(name, id)| SymbolInfo {
                    symbol_id: SymbolId(*id),
                    name: (*name).to_string(),
                })
                .collect(),
            symbol_failures: AtomicUsize::new(0),
            order_delay: None,
            next_id: AtomicI64::new(1000),
            positions: DashMap::new(),
            pending: DashMap::new(),
            placed: DashMap::new(),
        }
    }

    /// 前 `n` 次 `list_symbols` 调用返回网络错误
    pub fn with_symbol_failures(self, n: usize) -> Self {
        self.symbol_failures.store(n, Ordering::SeqCst);
        self
    }

    /// 每次下单前人为延迟，用于触发超时路径
    pub fn with_order_delay(mut self, delay: Duration) -> Self {
        self.order_delay = Some(delay);
        self
    }

    /// 预置一条持仓
    pub fn with_position(self, position: Position) -> Self {
        self.positions.insert(position.position_id, position);
        self
    }

    /// 已收到的全部委托 (按订单 ID 升序)
    pub fn placed_orders(&self) -> Vec<OrderTicket> {
        let mut orders: Vec<(i64, OrderTicket)> = self
            .placed
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        orders.sort_by_key(|(id, _)| *id);
        orders.into_iter().map(|(_, t)| t).collect()
    }

    fn known(&self, symbol_id: SymbolId) -> bool {
        self.symbols.iter().any(|s| s.symbol_id == symbol_id)
    }
}

#[async_trait]
impl BrokerGateway for MockBroker {
    async fn list_symbols(&self) -> Result<Vec<SymbolInfo>, BrokerError> {
        let remaining = self.symbol_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.symbol_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(BrokerError::Network("mock broker unreachable".into()));
        }
        Ok(self.symbols.clone())
    }

    async fn get_open_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let mut positions: Vec<Position> = self.positions.iter().map(|e| e.value().clone()).collect();
        positions.sort_by_key(|p| p.position_id);
        Ok(positions)
    }

    async fn get_ohlc_data(
        &self,
        symbol_id: SymbolId,
        timeframe: TimeFrame,
        num_bars: u32,
    ) -> Result<Vec<Candle>, BrokerError> {
        if !self.known(symbol_id) {
            return Err(BrokerError::Api {
                status: 404,
                message: format!("symbol {} not found", symbol_id),
            });
        }

        (0..num_bars)
            .map(|i| {
                let ts = CANDLE_ANCHOR_SECS + i64::from(i) * bar_seconds(timeframe);
                let time = DateTime::from_timestamp(ts, 0)
                    .ok_or_else(|| BrokerError::Parse(format!("timestamp {} out of range", ts)))?
                    .to_rfc3339_opts(SecondsFormat::Secs, true);
                let base = 1.0 + f64::from(i) * 0.001;
                Ok(Candle {
                    time,
                    open: base,
                    high: base + 0.002,
                    low: base - 0.002,
                    close: base + 0.001,
                    volume: 100 + u64::from(i),
                })
            })
            .collect()
    }

    async fn get_pending_orders(&self) -> Result<Vec<PendingOrder>, BrokerError> {
        let mut orders: Vec<PendingOrder> = self.pending.iter().map(|e| e.value().clone()).collect();
        orders.sort_by_key(|o| o.order_id);
        Ok(orders)
    }

    async fn place_order(&self, ticket: &OrderTicket) -> Result<OrderReceipt, BrokerError> {
        if let Some(delay) = self.order_delay {
            tokio::time::sleep(delay).await;
        }
        if !self.known(ticket.symbol_id) {
            return Err(BrokerError::Api {
                status: 400,
                message: format!("symbol {} not tradable", ticket.symbol_id),
            });
        }

        let order_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.placed.insert(order_id, ticket.clone());

        match ticket.kind {
            OrderKind::Market => {
                let position_id = self.next_id.fetch_add(1, Ordering::SeqCst);
                self.positions.insert(
                    position_id,
                    Position {
                        position_id,
                        symbol_id: ticket.symbol_id,
                        side: ticket.side,
                        volume: ticket.volume,
                        entry_price: 1.0,
                        stop_loss: ticket.stop_loss,
                        take_profit: ticket.take_profit,
                        open_time: None,
                    },
                );
                Ok(OrderReceipt {
                    order_id: Some(order_id),
                    position_id: Some(position_id),
                    status: "ORDER_FILLED".to_string(),
                    message: None,
                })
            }
            OrderKind::Limit | OrderKind::Stop => {
                self.pending.insert(
                    order_id,
                    PendingOrder {
                        order_id,
                        symbol_id: ticket.symbol_id,
                        kind: ticket.kind,
                        side: ticket.side,
                        volume: ticket.volume,
                        price: ticket.price,
                        stop_loss: ticket.stop_loss,
                        take_profit: ticket.take_profit,
                    },
                );
                Ok(OrderReceipt {
                    order_id: Some(order_id),
                    position_id: None,
                    status: "ORDER_ACCEPTED".to_string(),
                    message: None,
                })
            }
        }
    }
}

/// # Summary
/// 内存版日志网关，记录所有写入的条目。
pub struct MemoryJournal {
    entries: DashMap<String, JournalEntry>,
    failing: bool,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            failing: false,
        }
    }

    /// 所有写入均返回平台错误
    pub fn failing() -> Self {
        Self {
            entries: DashMap::new(),
            failing: true,
        }
    }

    pub fn get(&self, page_id: &str) -> Option<JournalEntry> {
        self.entries.get(page_id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryJournal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JournalGateway for MemoryJournal {
    async fn create_entry(&self, entry: &JournalEntry) -> Result<JournalReceipt, JournalError> {
        if self.failing {
            return Err(JournalError::Platform {
                status: 503,
                message: "memory journal offline".into(),
            });
        }
        let page_id = uuid::Uuid::new_v4().to_string();
        self.entries.insert(page_id.clone(), entry.clone());
        Ok(JournalReceipt { page_id, url: None })
    }
}
