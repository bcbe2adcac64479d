//! 核心层：错误处理、提取器、中间件与通用响应

pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
