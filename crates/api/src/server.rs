//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 持有状态并调用。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use sessiondesk_broker::connection::BrokerConnection;
use sessiondesk_core::config::AppConfig;
use sessiondesk_core::journal::port::JournalGateway;

use crate::routes::{journal, market, system, trade};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有字段在服务启动前注入，生命周期与进程等同。
/// - `broker` 是进程内唯一的券商连接，Handler 只通过它访问券商。
#[derive(Clone)]
pub struct AppState {
    /// 券商连接 (状态机 + 符号表)
    pub broker: Arc<BrokerConnection>,
    /// 交易日志写入端口
    pub journal: Arc<dyn JournalGateway>,
    /// 全局配置 (超时等)
    pub app_config: Arc<AppConfig>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "sessiondesk API",
        version = "0.1.0",
        description = "交易时段标注、券商行情与下单、交易日志写入的 RESTful API 门面。",
        license(name = "MIT")
    ),
    tags(
        (name = "系统 (System)", description = "健康检查与连接状态"),
        (name = "行情 (Market)", description = "交易时段标注与历史 K 线"),
        (name = "订单交易 (Trade)", description = "持仓、挂单查询与下单"),
        (name = "交易日志 (Journal)", description = "交易日志写入")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 构建完整的 axum 应用路由树 (含 Swagger UI 与 CORS)。
///
/// # Arguments
/// * `state` - 由 `app` 注入的共享状态
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(system::health))
        .routes(routes!(market::tag_candle_sessions))
        .routes(routes!(market::fetch_ohlc))
        .routes(routes!(trade::get_positions))
        .routes(routes!(trade::get_pending_orders, trade::place_order))
        .routes(routes!(journal::create_journal_entry))
        .with_state(state)
        .split_for_parts();

    // 允许所有来源，供图表前端跨域调用
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// 绑定端口并启动 HTTP 监听，直到 `shutdown` 完成后优雅退出。
///
/// # Arguments
/// * `state` - 共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8000"`
/// * `shutdown` - 完成时触发优雅停机的 Future
///
/// # Returns
/// 绑定失败或服务异常退出时返回 IO 错误。
pub async fn start_server<F>(state: AppState, bind_addr: &str, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("sessiondesk API listening on {}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
