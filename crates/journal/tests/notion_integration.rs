use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use sessiondesk_core::config::JournalConfig;
use sessiondesk_core::journal::entity::JournalEntry;
use sessiondesk_core::journal::error::JournalError;
use sessiondesk_core::journal::port::JournalGateway;
use sessiondesk_journal::notion::NotionJournal;
use std::env;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Captured = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

/// 在随机端口启动一个模拟的 Notion `/v1/pages` 接口
async fn spawn_fake_notion() -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let app = Router::new().route(
        "/v1/pages",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                if body["parent"]["database_id"] != "db-123" {
                    return (
                        StatusCode::NOT_FOUND,
                        Json(json!({ "object": "error", "code": "object_not_found" })),
                    );
                }
                sink.lock().unwrap().push((headers, body));
                (
                    StatusCode::OK,
                    Json(json!({ "object": "page", "id": "page-abc", "url": "https://notion.so/page-abc" })),
                )
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, captured)
}

fn journal(api_base: &str, database_id: &str) -> NotionJournal {
    let _ = rustls::crypto::ring::default_provider().install_default();
    NotionJournal::new(&JournalConfig {
        api_base: api_base.to_string(),
        secret: "secret_test".to_string(),
        database_id: database_id.to_string(),
        ..JournalConfig::default()
    })
    .unwrap()
}

fn sample_entry() -> JournalEntry {
    JournalEntry {
        title: "XAUUSD NY reversal".to_string(),
        symbol: "XAUUSD".to_string(),
        session: "NewYork".to_string(),
        htf_bias: "Bullish".to_string(),
        entry_type: "Breaker".to_string(),
        entry_price: 2031.5,
        stop_loss: 2024.0,
        target_price: 2050.0,
        order_type: "MARKET".to_string(),
        note: "clean displacement".to_string(),
        checklist: String::new(),
        news_events: String::new(),
        chart_url: Some("https://charts.example/xau.png".to_string()),
    }
}

#[tokio::test]
async fn test_create_entry_posts_page() {
    let (addr, captured) = spawn_fake_notion().await;

    let receipt = journal(&addr, "db-123")
        .create_entry(&sample_entry())
        .await
        .unwrap();
    assert_eq!(receipt.page_id, "page-abc");
    assert_eq!(receipt.url.as_deref(), Some("https://notion.so/page-abc"));

    let captured = captured.lock().unwrap();
    let (headers, body) = &captured[0];
    assert_eq!(headers["authorization"], "Bearer secret_test");
    assert_eq!(headers["notion-version"], "2022-06-28");
    assert_eq!(body["properties"]["Symbol"]["rich_text"][0]["text"]["content"], "XAUUSD");
    assert_eq!(body["properties"]["Files & media"]["url"], "https://charts.example/xau.png");
}

#[tokio::test]
async fn test_platform_error_is_surfaced() {
    let (addr, captured) = spawn_fake_notion().await;

    let err = journal(&addr, "missing-db")
        .create_entry(&sample_entry())
        .await
        .unwrap_err();
    match err {
        JournalError::Platform { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("object_not_found"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(captured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_title_is_rejected_locally() {
    let (addr, captured) = spawn_fake_notion().await;
    let mut entry = sample_entry();
    entry.title = "  ".to_string();

    let err = journal(&addr, "db-123").create_entry(&entry).await.unwrap_err();
    assert!(matches!(err, JournalError::InvalidEntry(_)));
    assert!(captured.lock().unwrap().is_empty());
}

/// # Summary
/// 集成测试：写入真实的 Notion 数据库。
///
/// # Logic
/// 1. 加载 .env 环境变量。
/// 2. 从环境变量获取 Integration Secret 与数据库 ID。
/// 3. 写入一条测试日志并断言返回页面 ID。
#[tokio::test]
#[ignore] // 默认忽略，仅在手动测试时通过环境变量开启
async fn test_real_notion_entry() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _ = rustls::crypto::ring::default_provider().install_default();
    let secret = env::var("SESSIONDESK__JOURNAL__SECRET")?;
    let database_id = env::var("SESSIONDESK__JOURNAL__DATABASE_ID")?;

    let journal = NotionJournal::new(&JournalConfig {
        secret,
        database_id,
        ..JournalConfig::default()
    })?;
    let receipt = journal.create_entry(&sample_entry()).await?;
    assert!(!receipt.page_id.is_empty());
    Ok(())
}
