use async_trait::async_trait;

use crate::broker::entity::{OrderReceipt, OrderTicket, PendingOrder, Position, SymbolId, SymbolInfo};
use crate::broker::error::BrokerError;
use crate::market::entity::{Candle, TimeFrame};

/// # Summary
/// 券商交易网关抽象接口。
/// 鉴权、下单执行、行情回溯等全部由外部券商完成，本系统只消费这些能力。
///
/// # Invariants
/// - 实现必须是 `Send + Sync`，同一实例被所有 HTTP Handler 并发共享。
/// - 所有方法均针对配置中绑定的单一券商账户。
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// # Summary
    /// 拉取账户可交易标的的完整符号表。
    ///
    /// # Returns
    /// 成功返回 `SymbolInfo` 列表，用于构建名称到 ID 的映射。
    async fn list_symbols(&self) -> Result<Vec<SymbolInfo>, BrokerError>;

    /// 查询当前全部未平仓持仓
    async fn get_open_positions(&self) -> Result<Vec<Position>, BrokerError>;

    /// # Summary
    /// 获取指定标的最近 `num_bars` 根 K 线。
    ///
    /// # Arguments
    /// * `symbol_id`: 券商标的 ID。
    /// * `timeframe`: K 线周期。
    /// * `num_bars`: 回溯根数。
    ///
    /// # Returns
    /// 按时间升序排列的 K 线列表。
    async fn get_ohlc_data(
        &self,
        symbol_id: SymbolId,
        timeframe: TimeFrame,
        num_bars: u32,
    ) -> Result<Vec<Candle>, BrokerError>;

    /// 查询当前全部挂单
    async fn get_pending_orders(&self) -> Result<Vec<PendingOrder>, BrokerError>;

    /// # Summary
    /// 提交一笔已校验的委托。
    ///
    /// # Returns
    /// * `Ok(OrderReceipt)` - 券商的执行回报
    /// * `Err(BrokerError)` - 网络失败或券商拒单
    async fn place_order(&self, ticket: &OrderTicket) -> Result<OrderReceipt, BrokerError>;
}
