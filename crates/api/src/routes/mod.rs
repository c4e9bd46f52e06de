//! # 路由控制器
//!
//! 每个子模块对应一组 `/api/v1/...` 路径。

pub mod journal;
pub mod market;
pub mod system;
pub mod trade;
