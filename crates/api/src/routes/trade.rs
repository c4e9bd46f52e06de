//! # 交易路由控制器
//!
//! 实现 `/api/v1/trade` 路径下的持仓、挂单查询与下单接口。

use axum::Json;
use axum::extract::State;
use tracing::info;

use sessiondesk_core::broker::entity::{OrderIntent, SymbolId};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{
    ApiResponse, PendingOrderResponse, PlaceOrderRequest, PlaceOrderResponse, PositionResponse,
    PositionsResponse,
};

/// 将品种 ID 反查为名称，找不到时退回数字 ID
fn symbol_label(state: &AppState, symbol_id: SymbolId) -> String {
    state
        .broker
        .symbol_name(symbol_id)
        .unwrap_or_else(|| symbol_id.to_string())
}

/// 查询当前持仓
#[utoipa::path(
    get,
    path = "/api/v1/trade/positions",
    tag = "订单交易 (Trade)",
    responses(
        (status = 200, description = "持仓列表", body = ApiResponse<PositionsResponse>),
        (status = 502, description = "券商返回错误"),
        (status = 503, description = "券商连接未就绪")
    )
)]
pub async fn get_positions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PositionsResponse>>, ApiError> {
    state
        .broker
        .wait_ready(state.app_config.broker.ready_timeout())
        .await?;

    let positions = state.broker.gateway().get_open_positions().await?;
    let positions = positions
        .into_iter()
        .map(|p| {
            let symbol = symbol_label(&state, p.symbol_id);
            PositionResponse::new(p, symbol)
        })
        .collect();

    Ok(Json(ApiResponse::ok(PositionsResponse { positions })))
}

/// 查询未成交挂单
#[utoipa::path(
    get,
    path = "/api/v1/trade/orders",
    tag = "订单交易 (Trade)",
    responses(
        (status = 200, description = "挂单列表", body = ApiResponse<Vec<PendingOrderResponse>>),
        (status = 502, description = "券商返回错误"),
        (status = 503, description = "券商连接未就绪")
    )
)]
pub async fn get_pending_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PendingOrderResponse>>>, ApiError> {
    state
        .broker
        .wait_ready(state.app_config.broker.ready_timeout())
        .await?;

    let orders = state.broker.gateway().get_pending_orders().await?;
    let orders = orders
        .into_iter()
        .map(|o| {
            let symbol = symbol_label(&state, o.symbol_id);
            PendingOrderResponse::new(o, symbol)
        })
        .collect();

    Ok(Json(ApiResponse::ok(orders)))
}

/// 提交新订单
///
/// # Logic
/// 1. 校验下单量与价格，非法请求直接返回 400。
/// 2. 等待券商连接就绪 (超时返回 503)，解析品种。
/// 3. 在订单超时内等待券商确认，超时返回 504。
#[utoipa::path(
    post,
    path = "/api/v1/trade/orders",
    tag = "订单交易 (Trade)",
    request_body = PlaceOrderRequest,
    responses(
        (status = 200, description = "券商已确认", body = ApiResponse<PlaceOrderResponse>),
        (status = 400, description = "下单参数非法"),
        (status = 404, description = "品种不存在"),
        (status = 502, description = "券商拒绝或返回错误"),
        (status = 503, description = "券商连接未就绪"),
        (status = 504, description = "券商未在限定时间内确认")
    )
)]
pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<ApiResponse<PlaceOrderResponse>>, ApiError> {
    let intent = OrderIntent::from(req);
    intent.validate()?;

    let broker_config = &state.app_config.broker;
    state.broker.wait_ready(broker_config.ready_timeout()).await?;
    let symbol_id = state.broker.resolve_symbol(&intent.symbol)?;
    let ticket = intent.into_ticket(symbol_id)?;

    info!(
        "Submitting {:?} {:?} order: {} volume {}",
        ticket.kind, ticket.side, ticket.symbol, ticket.volume
    );

    let order_timeout = broker_config.order_timeout();
    let receipt = tokio::time::timeout(order_timeout, state.broker.gateway().place_order(&ticket))
        .await
        .map_err(|_| {
            ApiError::GatewayTimeout(format!(
                "order for {} not confirmed within {:?}",
                ticket.symbol, order_timeout
            ))
        })??;

    info!("Order for {} acknowledged: {}", ticket.symbol, receipt.status);
    Ok(Json(ApiResponse::ok(PlaceOrderResponse {
        submitted: true,
        details: receipt,
    })))
}
