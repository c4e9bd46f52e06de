use serde::{Deserialize, Serialize};

/// # Summary
/// 交易日志条目，一次性写入外部笔记数据库，本地不保留副本。
///
/// # Invariants
/// - 文本字段允许为空字符串，但 `title` 为空时拒绝写入。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub title: String,
    pub symbol: String,
    pub session: String,
    pub htf_bias: String,
    pub entry_type: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target_price: f64,
    pub order_type: String,
    pub note: String,
    pub checklist: String,
    pub news_events: String,
    /// 图表截图链接，空字符串视为未提供
    pub chart_url: Option<String>,
}

impl JournalEntry {
    /// 返回非空的图表链接
    pub fn chart_url(&self) -> Option<&str> {
        self.chart_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// # Summary
/// 日志写入成功后的回执。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalReceipt {
    /// 外部笔记系统分配的页面 ID
    pub page_id: String,
    /// 页面访问链接 (若外部系统返回)
    pub url: Option<String>,
}
