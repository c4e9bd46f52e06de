use thiserror::Error;

/// # Summary
/// 交易日志服务错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    /// 网络连接或传输错误
    #[error("Network error: {0}")]
    Network(String),

    /// 配置错误 (如缺少 Token 或数据库 ID)
    #[error("Configuration error: {0}")]
    Config(String),

    /// 笔记平台返回的错误
    #[error("Platform error ({status}): {message}")]
    Platform { status: u16, message: String },

    /// 平台响应无法解析
    #[error("Parse error: {0}")]
    Parse(String),

    /// 条目内容不合法
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
}
