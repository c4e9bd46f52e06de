use sessiondesk_broker::connection::{BrokerConnection, ConnectionError, ConnectionState};
use sessiondesk_core::broker::entity::SymbolId;
use sessiondesk_core::test_utils::MockBroker;
use std::sync::Arc;
use std::time::Duration;

fn connection(broker: MockBroker) -> Arc<BrokerConnection> {
    Arc::new(BrokerConnection::new(Arc::new(broker)))
}

/// # Summary
/// 连接成功后进入 Ready，符号查找大小写不敏感。
#[tokio::test]
async fn test_connect_loads_symbols() {
    let conn = connection(MockBroker::new(&[("EURUSD", 1), ("xauusd", 41)]));
    assert_eq!(conn.state(), ConnectionState::Disconnected);

    let loaded = conn.connect().await.unwrap();
    assert_eq!(loaded, 2);
    assert_eq!(conn.state(), ConnectionState::Ready);
    assert_eq!(conn.symbols_loaded(), 2);

    assert_eq!(conn.resolve_symbol("eurusd").unwrap(), SymbolId(1));
    assert_eq!(conn.resolve_symbol(" XAUUSD ").unwrap(), SymbolId(41));
    assert_eq!(conn.symbol_name(SymbolId(41)).as_deref(), Some("XAUUSD"));
    assert!(matches!(
        conn.resolve_symbol("GBPJPY"),
        Err(ConnectionError::SymbolNotFound(name)) if name == "GBPJPY"
    ));
}

/// # Summary
/// 连接失败回到 Disconnected 并返回券商错误。
#[tokio::test]
async fn test_failed_connect_returns_to_disconnected() {
    let conn = connection(MockBroker::new(&[("EURUSD", 1)]).with_symbol_failures(1));

    let err = conn.connect().await.unwrap_err();
    assert!(matches!(err, ConnectionError::Broker(_)));
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert_eq!(conn.symbols_loaded(), 0);

    conn.connect().await.unwrap();
    assert!(conn.is_ready());
}

/// # Summary
/// 未就绪时 wait_ready 在超时后返回带等待时长的类型化错误。
#[tokio::test]
async fn test_wait_ready_times_out() {
    let conn = connection(MockBroker::new(&[("EURUSD", 1)]));
    let waited = Duration::from_millis(50);

    match conn.wait_ready(waited).await {
        Err(ConnectionError::NotReady { waited: w }) => assert_eq!(w, waited),
        other => panic!("expected NotReady, got {:?}", other),
    }
}

/// # Summary
/// 后台连接任务在重试后就绪，等待方被唤醒而不是轮询。
#[tokio::test]
async fn test_spawned_connect_wakes_waiters() {
    let conn = connection(MockBroker::new(&[("EURUSD", 1)]).with_symbol_failures(2));

    let waiter = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move { conn.wait_ready(Duration::from_secs(5)).await })
    };

    let handle = conn.spawn_connect(Duration::from_millis(20));
    waiter.await.unwrap().unwrap();
    handle.await.unwrap();

    assert!(conn.is_ready());
    assert_eq!(conn.symbols_loaded(), 1);
}

/// # Summary
/// 已就绪时 wait_ready 立即返回；断开后清空符号表。
#[tokio::test]
async fn test_disconnect_clears_state() {
    let conn = connection(MockBroker::new(&[("EURUSD", 1)]));
    conn.connect().await.unwrap();
    conn.wait_ready(Duration::from_millis(1)).await.unwrap();

    let mut rx = conn.subscribe();
    conn.disconnect();
    assert_eq!(*rx.borrow_and_update(), ConnectionState::Disconnected);
    assert_eq!(conn.symbols_loaded(), 0);
    assert!(conn.resolve_symbol("EURUSD").is_err());
}
