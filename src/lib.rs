//! # 用户资源服务
//!
//! 通过 HTTP 暴露单一的用户资源，数据保存在关系型数据库中：
//! - `infrastructure`：配置、日志与持久化网关
//! - `core`：错误处理、提取器、中间件
//! - `app`：用户模型、业务服务与路由
//! - `client`：驱动同一套 API 的交互式命令行客户端

pub mod app;
pub mod client;
pub mod core;
pub mod infrastructure;

pub use app::{create_routes, AppState};
pub use infrastructure::{
    config::{Config, ConfigError},
    database::{Gateway, PersistenceError},
};
