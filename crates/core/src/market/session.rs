//! # 交易时段标注
//!
//! 将 K 线的开始时间按 UTC 小时归入 Asia / London / NewYork / PostNY 时段。
//! 全部函数均为纯函数，无共享状态，可被任意并发调用。

use chrono::{DateTime, Timelike, Utc};

use crate::market::entity::{Candle, Session, SessionCandle};
use crate::market::error::MarketError;

/// # Summary
/// 为单个时间戳标注交易时段。
///
/// # Logic
/// 1. 按 RFC 3339 解析时间戳，`Z` 视为 UTC 零偏移。
/// 2. 带数值偏移的时间先归一化到 UTC。
/// 3. 读取 UTC 小时并查表得到时段。
///
/// # Arguments
/// * `timestamp`: ISO-8601 时间字符串，必须携带时区标识。
///
/// # Returns
/// 成功返回时段；无法解析或缺少时区时返回 `MarketError::Parse`。
pub fn label_session(timestamp: &str) -> Result<Session, MarketError> {
    let parsed = DateTime::parse_from_rfc3339(timestamp.trim()).map_err(|e| MarketError::Parse {
        input: timestamp.to_string(),
        reason: e.to_string(),
    })?;
    let hour = parsed.with_timezone(&Utc).hour();
    Ok(Session::from_hour(hour))
}

/// # Summary
/// 为单根 K 线标注交易时段，其余字段原样保留。
pub fn tag_candle(candle: &Candle) -> Result<SessionCandle, MarketError> {
    let session = label_session(&candle.time)?;
    Ok(SessionCandle {
        candle: candle.clone(),
        session,
    })
}

/// # Summary
/// 批量标注交易时段。
///
/// # Logic
/// 1. 按输入顺序逐根标注。
/// 2. 任意一根解析失败即整体失败，不返回部分结果。
///
/// # Arguments
/// * `candles`: 有序 K 线序列，可以为空。
///
/// # Returns
/// 与输入等长、同序的 `SessionCandle` 列表。
pub fn tag_sessions(candles: &[Candle]) -> Result<Vec<SessionCandle>, MarketError> {
    candles.iter().map(tag_candle).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(time: &str, close: f64) -> Candle {
        Candle {
            time: time.to_string(),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 42,
        }
    }

    #[test]
    fn test_every_hour_maps_to_a_trading_session() {
        for hour in 0..24 {
            let ts = format!("2024-03-15T{:02}:00:00Z", hour);
            let session = label_session(&ts).unwrap();
            assert_ne!(session, Session::Unknown, "hour {} fell through", hour);
            // 日期与分秒不影响结果
            let other = format!("2019-11-02T{:02}:37:12Z", hour);
            assert_eq!(label_session(&other).unwrap(), session);
        }
    }

    #[test]
    fn test_session_boundaries() {
        let cases = [
            ("2024-01-01T00:00:00Z", Session::Asia),
            ("2024-01-01T06:59:59Z", Session::Asia),
            ("2024-01-01T07:00:00Z", Session::London),
            ("2024-01-01T11:59:59Z", Session::London),
            ("2024-01-01T12:00:00Z", Session::NewYork),
            ("2024-01-01T16:59:59Z", Session::NewYork),
            ("2024-01-01T17:00:00Z", Session::PostNY),
            ("2024-01-01T23:59:59Z", Session::PostNY),
        ];
        for (ts, expected) in cases {
            assert_eq!(label_session(ts).unwrap(), expected, "{}", ts);
        }
    }

    #[test]
    fn test_documented_examples() {
        assert_eq!(label_session("2024-01-01T08:30:00Z").unwrap(), Session::London);
        assert_eq!(label_session("2024-01-01T23:00:00Z").unwrap(), Session::PostNY);
        assert_eq!(label_session("2024-01-01T00:00:00Z").unwrap(), Session::Asia);
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        // 09:30+02:00 == 07:30Z
        assert_eq!(
            label_session("2024-01-01T09:30:00+02:00").unwrap(),
            Session::London
        );
        assert_eq!(
            label_session("2024-01-01T08:30:00.250+00:00").unwrap(),
            Session::London
        );
    }

    #[test]
    fn test_invalid_timestamps_are_rejected() {
        for bad in ["", "not-a-date", "2024-01-01T08:30:00", "2024-13-01T08:30:00Z"] {
            match label_session(bad) {
                Err(MarketError::Parse { input, .. }) => assert_eq!(input, bad),
                other => panic!("expected parse error for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_out_of_range_hour_is_unknown() {
        assert_eq!(Session::from_hour(24), Session::Unknown);
        assert_eq!(Session::from_hour(99), Session::Unknown);
    }

    #[test]
    fn test_labeling_is_idempotent() {
        let c = candle("2024-06-01T13:45:00Z", 10.0);
        let first = tag_candle(&c).unwrap();
        let second = tag_candle(&c).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.session, Session::NewYork);
    }

    #[test]
    fn test_batch_preserves_length_order_and_fields() {
        let input = vec![
            candle("2024-01-01T03:00:00Z", 1.0),
            candle("2024-01-01T09:00:00Z", 2.0),
            candle("2024-01-01T14:00:00Z", 3.0),
            candle("2024-01-01T20:00:00Z", 4.0),
        ];
        let tagged = tag_sessions(&input).unwrap();

        assert_eq!(tagged.len(), input.len());
        for (original, out) in input.iter().zip(&tagged) {
            assert_eq!(&out.candle, original);
        }
        let sessions: Vec<Session> = tagged.iter().map(|s| s.session).collect();
        assert_eq!(
            sessions,
            vec![Session::Asia, Session::London, Session::NewYork, Session::PostNY]
        );
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let input = vec![
            candle("2024-01-01T03:00:00Z", 1.0),
            candle("garbage", 2.0),
            candle("2024-01-01T20:00:00Z", 3.0),
        ];
        let err = tag_sessions(&input).unwrap_err();
        assert!(matches!(err, MarketError::Parse { ref input, .. } if input == "garbage"));
    }

    #[test]
    fn test_empty_batch() {
        assert!(tag_sessions(&[]).unwrap().is_empty());
    }
}
