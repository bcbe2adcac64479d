//! 用户数据模型

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

pub const MIN_USER_ID: i64 = 1;
pub const MAX_USER_ID: i64 = 99;
pub const MAX_NAME_LEN: u64 = 99;
pub const MAX_AGE: i64 = 200;

/// 用户记录，id 作为 URL 键而不出现在消息体中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub age: i64,
}

/// 用户主键，取值 1..=99
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(i64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("user_id must be between 1 and 99, got {0}")]
pub struct InvalidUserId(pub i64);

impl UserId {
    pub fn new(value: i64) -> Result<Self, InvalidUserId> {
        if (MIN_USER_ID..=MAX_USER_ID).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidUserId(value))
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 创建用户请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 99, message = "Name must be between 1 and 99 characters"))]
    pub name: String,

    #[validate(range(min = 0, max = 200, message = "Age must be between 0 and 200"))]
    pub age: i64,
}

impl From<NewUser> for User {
    fn from(new_user: NewUser) -> Self {
        Self {
            name: new_user.name,
            age: new_user.age,
        }
    }
}

/// 更新用户请求
///
/// 字段省略（或为 `null`）表示保持不变。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 99, message = "Name must be between 1 and 99 characters"))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 200, message = "Age must be between 0 and 200"))]
    pub age: Option<i64>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none()
    }
}

/// 删除用户的响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedUser {
    pub message: String,
    pub deleted_user: User,
}

// 查询参数
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: Option<String>,
}
