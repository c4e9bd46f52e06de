use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::market::error::MarketError;

/// 单次历史请求允许的最大 K 线根数
pub const MAX_BARS: u32 = 5000;

/// # Summary
/// 单根 K 线数据实体，记录特定时段内的行情波动。
///
/// # Invariants
/// - `time` 为 ISO-8601 字符串，约定为 UTC。
/// - 构造后不可变，由券商网关产出或由调用方直接提交。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Candle {
    // K 线开始时间 (ISO-8601, UTC)
    #[schema(example = "2024-01-01T08:30:00Z")]
    pub time: String,
    // 开盘价
    #[schema(example = 1.0945)]
    pub open: f64,
    // 最高价
    #[schema(example = 1.0951)]
    pub high: f64,
    // 最低价
    #[schema(example = 1.0940)]
    pub low: f64,
    // 收盘价
    #[schema(example = 1.0948)]
    pub close: f64,
    // 成交量 (tick volume)
    #[schema(example = 1250)]
    pub volume: u64,
}

/// # Summary
/// 交易时段标签，按 UTC 小时划分交易日。
///
/// # Invariants
/// - 取值集合固定，`Unknown` 仅作为越界小时的兜底，合法时间不会落入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Session {
    /// [00:00, 07:00)
    Asia,
    /// [07:00, 12:00)
    London,
    /// [12:00, 17:00)
    NewYork,
    /// [17:00, 24:00)
    PostNY,
    Unknown,
}

impl Session {
    /// # Summary
    /// 根据 UTC 小时映射交易时段。
    ///
    /// # Arguments
    /// * `hour`: UTC 小时，合法范围 `0..24`。
    ///
    /// # Returns
    /// 对应的时段，越界小时返回 `Unknown`。
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..7 => Session::Asia,
            7..12 => Session::London,
            12..17 => Session::NewYork,
            17..24 => Session::PostNY,
            _ => Session::Unknown,
        }
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Session::Asia => write!(f, "Asia"),
            Session::London => write!(f, "London"),
            Session::NewYork => write!(f, "NewYork"),
            Session::PostNY => write!(f, "PostNY"),
            Session::Unknown => write!(f, "Unknown"),
        }
    }
}

/// # Summary
/// 带交易时段标签的 K 线，由 `Candle` 派生。
///
/// # Invariants
/// - `candle` 的全部字段与输入保持一致。
/// - `session` 仅由 `candle.time` 的 UTC 小时决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionCandle {
    #[serde(flatten)]
    pub candle: Candle,
    #[schema(example = "London")]
    pub session: Session,
}

/// # Summary
/// K 线周期枚举，与券商侧的 trendbar period 一一对应。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum TimeFrame {
    M1,
    #[default]
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
    W1,
}

impl TimeFrame {
    /// 未指定 `num_bars` 时各周期的默认回溯根数
    pub fn default_bars(&self) -> u32 {
        match self {
            TimeFrame::M1 => 1500,
            TimeFrame::M5
            | TimeFrame::M15
            | TimeFrame::M30
            | TimeFrame::H1
            | TimeFrame::H4 => 500,
            TimeFrame::D1 => 300,
            TimeFrame::W1 => 100,
        }
    }

    /// # Summary
    /// 解析最终请求的 K 线根数。
    ///
    /// # Logic
    /// 1. 调用方未指定时使用周期默认值。
    /// 2. 指定值必须落在 `1..=MAX_BARS`。
    pub fn resolve_bars(&self, requested: Option<u32>) -> Result<u32, MarketError> {
        match requested {
            None => Ok(self.default_bars()),
            Some(n) if (1..=MAX_BARS).contains(&n) => Ok(n),
            Some(n) => Err(MarketError::InvalidBarCount {
                requested: n,
                max: MAX_BARS,
            }),
        }
    }
}

impl FromStr for TimeFrame {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "M1" => Ok(TimeFrame::M1),
            "M5" => Ok(TimeFrame::M5),
            "M15" => Ok(TimeFrame::M15),
            "M30" => Ok(TimeFrame::M30),
            "H1" => Ok(TimeFrame::H1),
            "H4" => Ok(TimeFrame::H4),
            "D1" => Ok(TimeFrame::D1),
            "W1" => Ok(TimeFrame::W1),
            _ => Err(MarketError::UnknownTimeFrame(s.to_string())),
        }
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeFrame::M1 => write!(f, "M1"),
            TimeFrame::M5 => write!(f, "M5"),
            TimeFrame::M15 => write!(f, "M15"),
            TimeFrame::M30 => write!(f, "M30"),
            TimeFrame::H1 => write!(f, "H1"),
            TimeFrame::H4 => write!(f, "H4"),
            TimeFrame::D1 => write!(f, "D1"),
            TimeFrame::W1 => write!(f, "W1"),
        }
    }
}
