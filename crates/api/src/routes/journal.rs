//! # 交易日志路由控制器

use axum::Json;
use axum::extract::State;

use sessiondesk_core::journal::entity::JournalEntry;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, JournalEntryRequest, JournalEntryResponse};

/// 写入一条交易日志
///
/// 写入失败时不重试，上游错误以 502 返回。
#[utoipa::path(
    post,
    path = "/api/v1/journal/entries",
    tag = "交易日志 (Journal)",
    request_body = JournalEntryRequest,
    responses(
        (status = 200, description = "写入成功", body = ApiResponse<JournalEntryResponse>),
        (status = 400, description = "标题为空"),
        (status = 502, description = "日志平台返回错误")
    )
)]
pub async fn create_journal_entry(
    State(state): State<AppState>,
    Json(req): Json<JournalEntryRequest>,
) -> Result<Json<ApiResponse<JournalEntryResponse>>, ApiError> {
    let entry = JournalEntry::from(req);
    let receipt = state.journal.create_entry(&entry).await?;
    Ok(Json(ApiResponse::ok(JournalEntryResponse::from(receipt))))
}
