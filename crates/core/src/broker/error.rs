use thiserror::Error;

/// # Summary
/// 券商网关错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// 网络连接或传输错误
    #[error("Network error: {0}")]
    Network(String),

    /// 券商接口返回非成功状态
    #[error("Broker API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 响应体无法解析
    #[error("Parse error: {0}")]
    Parse(String),

    /// 委托参数不合法，未发往券商
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// 客户端配置错误
    #[error("Configuration error: {0}")]
    Config(String),
}
