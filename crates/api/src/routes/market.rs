//! # 行情路由控制器
//!
//! 实现 `/api/v1/market` 路径下的 REST 接口：交易时段标注与历史 K 线查询。

use axum::Json;
use axum::extract::State;

use sessiondesk_core::market::entity::{Candle, SessionCandle, TimeFrame};
use sessiondesk_core::market::session::tag_sessions;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, CandleResponse, FetchDataRequest, FetchDataResponse, TagSessionsRequest};

/// 为一批 K 线标注交易时段
///
/// 纯计算接口，不依赖券商连接。任意一根 K 线的时间戳无法解析时整批失败。
#[utoipa::path(
    post,
    path = "/api/v1/market/sessions",
    tag = "行情 (Market)",
    request_body = TagSessionsRequest,
    responses(
        (status = 200, description = "标注成功，顺序与输入一致", body = ApiResponse<Vec<SessionCandle>>),
        (status = 400, description = "存在无法解析的时间戳")
    )
)]
pub async fn tag_candle_sessions(
    Json(req): Json<TagSessionsRequest>,
) -> Result<Json<ApiResponse<Vec<SessionCandle>>>, ApiError> {
    let tagged = tag_sessions(&req.candles)?;
    tracing::debug!("Tagged {} candles with sessions", tagged.len());
    Ok(Json(ApiResponse::ok(tagged)))
}

/// 为券商返回的 K 线标注时段，时间戳非法属于上游错误
fn tag_broker_candles(candles: &[Candle]) -> Result<Vec<CandleResponse>, ApiError> {
    let tagged = tag_sessions(candles).map_err(|e| ApiError::BadGateway(e.to_string()))?;
    Ok(tagged.into_iter().map(CandleResponse::from).collect())
}

/// 查询历史 K 线
///
/// # Logic
/// 1. 解析周期并确定根数 (缺省按周期取默认值，上限 5000)。
/// 2. 等待券商连接就绪并解析品种。
/// 3. 拉取 K 线，按需附加交易时段。
#[utoipa::path(
    post,
    path = "/api/v1/market/ohlc",
    tag = "行情 (Market)",
    request_body = FetchDataRequest,
    responses(
        (status = 200, description = "查询成功", body = ApiResponse<FetchDataResponse>),
        (status = 400, description = "周期或根数非法"),
        (status = 404, description = "品种不存在"),
        (status = 502, description = "券商返回错误"),
        (status = 503, description = "券商连接未就绪")
    )
)]
pub async fn fetch_ohlc(
    State(state): State<AppState>,
    Json(req): Json<FetchDataRequest>,
) -> Result<Json<ApiResponse<FetchDataResponse>>, ApiError> {
    let timeframe: TimeFrame = req.timeframe.parse()?;
    let num_bars = timeframe.resolve_bars(req.num_bars)?;

    state
        .broker
        .wait_ready(state.app_config.broker.ready_timeout())
        .await?;
    let symbol_id = state.broker.resolve_symbol(&req.symbol)?;

    let candles = state
        .broker
        .gateway()
        .get_ohlc_data(symbol_id, timeframe, num_bars)
        .await?;

    let ohlc: Vec<CandleResponse> = if req.with_sessions {
        tag_broker_candles(&candles)?
    } else {
        candles.into_iter().map(CandleResponse::from).collect()
    };

    Ok(Json(ApiResponse::ok(FetchDataResponse {
        symbol: req.symbol.trim().to_uppercase(),
        timeframe: timeframe.to_string(),
        num_bars,
        ohlc,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use sessiondesk_core::market::entity::Session;

    fn candle(time: &str) -> Candle {
        Candle {
            time: time.to_string(),
            open: 1.0,
            high: 1.1,
            low: 0.9,
            close: 1.05,
            volume: 10,
        }
    }

    #[test]
    fn test_broker_candles_tagged() {
        let tagged = tag_broker_candles(&[candle("2024-01-01T13:00:00Z")]).unwrap();
        assert_eq!(tagged[0].session, Some(Session::NewYork));
    }

    #[test]
    fn test_bad_broker_timestamp_is_bad_gateway() {
        let err = tag_broker_candles(&[candle("2024-01-01T13:00:00Z"), candle("garbage")])
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
