use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub journal: JournalConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 券商桥接服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub base_url: String,
    pub account_id: String,
    pub access_token: String,
    /// 单次 HTTP 请求超时
    pub request_timeout_secs: u64,
    /// 下单前等待连接就绪的最长时间
    pub ready_timeout_secs: u64,
    /// 等待下单回报的最长时间
    pub order_timeout_secs: u64,
    /// 连接失败后的重试间隔
    pub reconnect_delay_secs: u64,
}

impl BrokerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn order_timeout(&self) -> Duration {
        Duration::from_secs(self.order_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

/// 笔记数据库 (Notion) 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub api_base: String,
    pub api_version: String,
    pub secret: String,
    pub database_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 未设置 RUST_LOG 时使用的默认过滤级别
    pub level: String,
    /// 滚动日志文件目录
    pub dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5100".to_string(),
            account_id: String::new(),
            access_token: String::new(),
            request_timeout_secs: 15,
            ready_timeout_secs: 10,
            order_timeout_secs: 10,
            reconnect_delay_secs: 5,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.notion.com".to_string(),
            api_version: "2022-06-28".to_string(),
            secret: String::new(),
            database_id: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.broker.ready_timeout(), Duration::from_secs(10));
        assert_eq!(config.broker.order_timeout(), Duration::from_secs(10));
        assert_eq!(config.journal.api_version, "2022-06-28");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "server": { "port": 9100 }, "broker": { "account_id": "123456" } }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.broker.account_id, "123456");
        assert_eq!(config.broker.order_timeout_secs, 10);
        assert_eq!(config.journal.api_base, "https://api.notion.com");
    }
}
