//! 用户资源：模型、业务服务与 HTTP 处理器

pub mod handler;
pub mod model;
pub mod service;

pub use model::{DeletedUser, NewUser, User, UserId, UserUpdate};
pub use service::{ServiceError, UserService};
