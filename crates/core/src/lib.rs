//! # `sessiondesk-core` - 领域核心
//!
//! 定义行情、交易、日志三个领域的实体、错误与端口 (Port) 契约，
//! 以及系统中唯一的原创逻辑：按 UTC 小时为 K 线标注交易时段。
//!
//! 本 crate 不包含任何 I/O 实现，具体的券商与笔记服务适配器位于
//! `sessiondesk-broker` 与 `sessiondesk-journal`。

pub mod broker;
pub mod config;
pub mod journal;
pub mod market;

#[cfg(feature = "test-utils")]
pub mod test_utils;
