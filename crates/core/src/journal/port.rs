use async_trait::async_trait;

use crate::journal::entity::{JournalEntry, JournalReceipt};
use crate::journal::error::JournalError;

/// # Summary
/// 交易日志写入接口，对接外部笔记数据库。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync` 以支持并发调用。
/// - 每次调用最多创建一条外部记录，失败时不得留下部分写入。
#[async_trait]
pub trait JournalGateway: Send + Sync {
    /// # Summary
    /// 将一条交易日志写入外部数据库。
    ///
    /// # Logic
    /// 1. 将条目映射为目标平台的结构化属性。
    /// 2. 调用平台的创建页面接口。
    /// 3. 返回平台分配的页面 ID。
    ///
    /// # Returns
    /// * 成功返回 `Ok(JournalReceipt)`。
    /// * 失败返回 `Err(JournalError)`。
    async fn create_entry(&self, entry: &JournalEntry) -> Result<JournalReceipt, JournalError>;
}
