//! # `sessiondesk-journal` - 交易日志适配层
//!
//! 将交易日志条目写入 Notion 数据库。

pub mod notion;
