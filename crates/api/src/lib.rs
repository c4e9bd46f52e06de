//! # `sessiondesk-api` - HTTP API 网关
//!
//! 本 crate 是 sessiondesk 交易与日志门面的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收来自图表前端或脚本的 HTTP 请求
//! - 为 K 线打交易时段标签，调用下层 `BrokerConnection` 与 `JournalGateway`
//! - 将领域模型转换为 DTO 返回给调用方

pub mod types;
pub mod error;
pub mod routes;
pub mod server;
