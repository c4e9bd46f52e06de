//! # 系统路由控制器

use axum::Json;
use axum::extract::State;

use crate::server::AppState;
use crate::types::{ApiResponse, HealthResponse};

/// 健康检查
///
/// 返回券商连接状态与符号表大小，不等待连接就绪。
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务存活", body = ApiResponse<HealthResponse>)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let connection_state = state.broker.state();
    Json(ApiResponse::ok(HealthResponse {
        state: connection_state.to_string(),
        connected: state.broker.is_ready(),
        symbols_loaded: state.broker.symbols_loaded(),
    }))
}
