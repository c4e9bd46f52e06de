use std::path::Path;
use std::sync::Arc;

use config::{Config, ConfigError, Environment, File};
use sessiondesk_api::server::{AppState, start_server};
use sessiondesk_broker::connection::BrokerConnection;
use sessiondesk_broker::rest::RestBrokerGateway;
use sessiondesk_core::config::{AppConfig, LoggingConfig};
use sessiondesk_core::journal::port::JournalGateway;
use sessiondesk_journal::notion::NotionJournal;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// 配置文件名 (不含扩展名)，文件不存在时仅使用默认值与环境变量
const CONFIG_FILE: &str = "sessiondesk";

/// 环境变量前缀，如 `SESSIONDESK__BROKER__ACCOUNT_ID`
const ENV_PREFIX: &str = "SESSIONDESK";

/// # Summary
/// 分层加载配置。
///
/// # Logic
/// 1. `AppConfig::default()` 提供全部默认值。
/// 2. 叠加可选的配置文件。
/// 3. 叠加 `SESSIONDESK__SECTION__KEY` 形式的环境变量。
fn load_config(file: &Path) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 初始化全局日志：标准输出 + 按天滚动的文件。
///
/// # Returns
/// 文件写入器的 guard，必须持有到进程退出，否则缓冲中的日志会丢失。
fn init_tracing(logging: &LoggingConfig) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))?;

    let file_appender = tracing_appender::rolling::daily(&logging.dir, "sessiondesk.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()?;

    Ok(guard)
}

/// 等待 Ctrl-C，作为 HTTP 服务的优雅停机信号
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

/// # Summary
/// 应用启动入口，纯粹的组装容器。
///
/// # Logic
/// 1. 加载配置并初始化日志。
/// 2. 实例化券商网关，在后台建立连接 (失败自动重试)。
/// 3. 实例化日志网关。
/// 4. 启动 HTTP 服务，收到退出信号后断开券商连接。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let app_config = load_config(Path::new(&format!("{}.toml", CONFIG_FILE)))?;
    let _log_guard = init_tracing(&app_config.logging)?;
    info!("sessiondesk starting...");

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    // 2. 券商连接 (后台连接，HTTP 服务无需等待)
    let gateway = Arc::new(RestBrokerGateway::new(&app_config.broker)?);
    let broker = Arc::new(BrokerConnection::new(gateway));
    let connect_task = broker.spawn_connect(app_config.broker.reconnect_delay());

    // 3. 交易日志
    let journal: Arc<dyn JournalGateway> = Arc::new(NotionJournal::new(&app_config.journal)?);

    // 4. HTTP 服务
    let bind_addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let state = AppState {
        broker: broker.clone(),
        journal,
        app_config: Arc::new(app_config),
    };
    start_server(state, &bind_addr, shutdown_signal()).await?;

    connect_task.abort();
    broker.disconnect();
    info!("sessiondesk stopped");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.broker.order_timeout_secs, 10);
        assert_eq!(config.journal.api_version, "2022-06-28");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessiondesk.toml");
        fs::write(
            &path,
            r#"
[server]
port = 9100

[broker]
account_id = "4242"
ready_timeout_secs = 3

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.broker.account_id, "4242");
        assert_eq!(config.broker.ready_timeout_secs, 3);
        assert_eq!(config.broker.order_timeout_secs, 10);
        assert_eq!(config.logging.level, "debug");
    }
}
