//! # `sessiondesk-broker` - 券商网关适配层
//!
//! - [`connection`]: 连接生命周期与符号表，替代进程级全局状态。
//! - [`rest`]: 通过 HTTP/JSON 桥接服务访问券商账户的 `BrokerGateway` 实现。

pub mod connection;
pub mod rest;
