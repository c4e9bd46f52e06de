//! # 券商连接生命周期
//!
//! 以显式对象管理 `Disconnected -> Connecting -> Ready` 三态，
//! 状态变化通过 `tokio::sync::watch` 广播，等待方使用有界超时阻塞直到就绪。

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use sessiondesk_core::broker::entity::SymbolId;
use sessiondesk_core::broker::error::BrokerError;
use sessiondesk_core::broker::port::BrokerGateway;

/// # Summary
/// 券商连接状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// 尚未连接，或连接失败 / 已主动断开
    Disconnected,
    /// 正在加载符号表
    Connecting,
    /// 符号表已就绪，可以下单
    Ready,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Ready => write!(f, "Ready"),
        }
    }
}

/// # Summary
/// 连接层错误。
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// 在给定时间内未进入 Ready
    #[error("Broker connection not ready after {waited:?}")]
    NotReady { waited: Duration },

    /// 符号表中不存在该标的
    #[error("Symbol '{0}' not found")]
    SymbolNotFound(String),

    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// # Summary
/// 券商连接对象，持有网关、连接状态与标的符号表。
///
/// # Invariants
/// - 进程内唯一，以 `Arc` 在所有 Handler 之间共享。
/// - 状态为 `Ready` 时符号表一定已完成加载。
/// - 符号表以大写名称为键，查找大小写不敏感。
pub struct BrokerConnection {
    gateway: Arc<dyn BrokerGateway>,
    state: watch::Sender<ConnectionState>,
    symbols: DashMap<String, SymbolId>,
    names: DashMap<SymbolId, String>,
}

impl BrokerConnection {
    /// 创建处于 `Disconnected` 状态的连接对象
    pub fn new(gateway: Arc<dyn BrokerGateway>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            gateway,
            state,
            symbols: DashMap::new(),
            names: DashMap::new(),
        }
    }

    /// 底层券商网关
    pub fn gateway(&self) -> &Arc<dyn BrokerGateway> {
        &self.gateway
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// 已加载的标的数量
    pub fn symbols_loaded(&self) -> usize {
        self.symbols.len()
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// # Summary
    /// 建立连接并加载符号表。
    ///
    /// # Logic
    /// 1. 切换到 `Connecting`。
    /// 2. 拉取符号表，成功后整体替换本地映射并切换到 `Ready`。
    /// 3. 失败时回到 `Disconnected` 并返回错误。
    ///
    /// # Returns
    /// 成功返回加载的标的数量。
    pub async fn connect(&self) -> Result<usize, ConnectionError> {
        self.state.send_replace(ConnectionState::Connecting);

        let symbols = match self.gateway.list_symbols().await {
            Ok(symbols) => symbols,
            Err(e) => {
                self.state.send_replace(ConnectionState::Disconnected);
                return Err(e.into());
            }
        };

        self.symbols.clear();
        self.names.clear();
        for info in symbols {
            let name = info.name.trim().to_uppercase();
            self.names.insert(info.symbol_id, name.clone());
            self.symbols.insert(name, info.symbol_id);
        }

        let loaded = self.symbols.len();
        self.state.send_replace(ConnectionState::Ready);
        info!("Broker connection ready, {} symbols loaded", loaded);
        Ok(loaded)
    }

    /// # Summary
    /// 在后台任务中连接券商，失败后按固定间隔重试直到 `Ready`。
    ///
    /// # Arguments
    /// * `retry_delay`: 两次尝试之间的等待时间。
    ///
    /// # Returns
    /// 后台任务句柄，关闭服务时可 `abort`。
    pub fn spawn_connect(self: &Arc<Self>, retry_delay: Duration) -> JoinHandle<()> {
        let conn = Arc::clone(self);
        tokio::spawn(async move {
            let mut attempt: u32 = 0;
            loop {
                attempt = attempt.saturating_add(1);
                match conn.connect().await {
                    Ok(_) => return,
                    Err(e) => {
                        warn!(
                            attempt,
                            error = %e,
                            "Broker connection failed, retrying in {:?}",
                            retry_delay
                        );
                        tokio::time::sleep(retry_delay).await;
                    }
                }
            }
        })
    }

    /// # Summary
    /// 等待连接进入 `Ready`。
    ///
    /// # Logic
    /// 1. 已就绪时立即返回。
    /// 2. 否则挂起等待状态广播，超过 `timeout` 返回 `NotReady`。
    pub async fn wait_ready(&self, timeout: Duration) -> Result<(), ConnectionError> {
        let mut rx = self.state.subscribe();
        let ready = async move {
            rx.wait_for(|s| *s == ConnectionState::Ready)
                .await
                .map(|_| ())
        };

        match tokio::time::timeout(timeout, ready).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) | Err(_) => Err(ConnectionError::NotReady { waited: timeout }),
        }
    }

    /// 将标的名称解析为券商 ID (大小写不敏感)
    pub fn resolve_symbol(&self, name: &str) -> Result<SymbolId, ConnectionError> {
        let key = name.trim().to_uppercase();
        self.symbols
            .get(&key)
            .map(|e| *e.value())
            .ok_or(ConnectionError::SymbolNotFound(key))
    }

    /// 将券商 ID 反查为标的名称
    pub fn symbol_name(&self, symbol_id: SymbolId) -> Option<String> {
        self.names.get(&symbol_id).map(|e| e.value().clone())
    }

    /// 主动断开：清空符号表并回到 `Disconnected`
    pub fn disconnect(&self) {
        self.symbols.clear();
        self.names.clear();
        self.state.send_replace(ConnectionState::Disconnected);
        info!("Broker connection closed");
    }
}
