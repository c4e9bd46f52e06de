use thiserror::Error;

/// # Summary
/// 行情域错误枚举，覆盖时间戳解析与请求参数校验。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - `Parse` 不是瞬时故障，调用方不得重试或以默认时段兜底。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    // 时间戳无法解析为带时区的日期时间
    #[error("Parse error: invalid timestamp '{input}': {reason}")]
    Parse { input: String, reason: String },
    // 不支持的 K 线周期
    #[error("Unknown timeframe: {0}")]
    UnknownTimeFrame(String),
    // 请求的 K 线根数越界
    #[error("Invalid bar count {requested}, expected 1..={max}")]
    InvalidBarCount { requested: u32, max: u32 },
}
