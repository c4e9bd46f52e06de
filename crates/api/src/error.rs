//! # API 统一错误处理
//!
//! 将下层各 crate 的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use sessiondesk_broker::connection::ConnectionError;
use sessiondesk_core::broker::error::BrokerError;
use sessiondesk_core::journal::error::JournalError;
use sessiondesk_core::market::error::MarketError;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求参数错误 (400)
    #[error("请求参数错误: {0}")]
    BadRequest(String),

    /// 资源未找到 (404)
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 上游服务返回错误或不可达 (502)
    #[error("上游服务错误: {0}")]
    BadGateway(String),

    /// 券商连接未就绪 (503)
    #[error("服务暂不可用: {0}")]
    ServiceUnavailable(String),

    /// 上游在限定时间内未确认 (504)
    #[error("上游响应超时: {0}")]
    GatewayTimeout(String),

    /// 下层内部错误 (500)
    #[error("内部服务错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 错误对应的 HTTP 状态码
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!("内部服务错误: {}", msg);
                "服务器内部错误".to_string()
            }
            ApiError::BadGateway(msg) => {
                tracing::warn!("上游服务错误: {}", msg);
                msg
            }
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::GatewayTimeout(msg) => msg,
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

/// 从 `MarketError` 转换：时间戳、周期、根数错误均属调用方输入问题
impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// 从 `BrokerError` 转换
impl From<BrokerError> for ApiError {
    fn from(err: BrokerError) -> Self {
        match &err {
            BrokerError::InvalidOrder(_) => ApiError::BadRequest(err.to_string()),
            BrokerError::Config(_) => ApiError::Internal(err.to_string()),
            BrokerError::Network(_) | BrokerError::Api { .. } | BrokerError::Parse(_) => {
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}

/// 从 `ConnectionError` 转换
impl From<ConnectionError> for ApiError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::NotReady { .. } => ApiError::ServiceUnavailable(err.to_string()),
            ConnectionError::SymbolNotFound(_) => ApiError::NotFound(err.to_string()),
            ConnectionError::Broker(inner) => ApiError::from(inner),
        }
    }
}

/// 从 `JournalError` 转换
impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        match &err {
            JournalError::InvalidEntry(_) => ApiError::BadRequest(err.to_string()),
            JournalError::Config(_) => ApiError::Internal(err.to_string()),
            JournalError::Network(_) | JournalError::Platform { .. } | JournalError::Parse(_) => {
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}
