//! 用户业务服务
//!
//! 每个修改操作先做存在性检查，再执行写语句。写语句都限定 `WHERE id`，
//! 受影响行数为 0 时说明记录在检查之后被删除，按不存在处理；
//! 创建时的唯一键冲突同样视为已存在。

use std::collections::BTreeMap;
use tracing::{debug, info};

use super::model::{DeletedUser, NewUser, User, UserId, UserUpdate};
use crate::infrastructure::database::{Gateway, PersistenceError, SqlParam};

pub const DELETED_MESSAGE: &str = "User has been deleted";

/// 服务层错误
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("User not found")]
    NotFound,
    #[error("User already exists")]
    Conflict,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Clone, Debug)]
pub struct UserService {
    gateway: Gateway,
}

impl UserService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, ServiceError> {
        let rows: Vec<(String, i64)> = self
            .gateway
            .fetch(
                "SELECT name, age FROM users WHERE id = $1",
                &[SqlParam::Int(id.get())],
            )
            .await?;

        rows.into_iter()
            .next()
            .map(|(name, age)| User { name, age })
            .ok_or(ServiceError::NotFound)
    }

    pub async fn create_user(&self, id: UserId, new_user: NewUser) -> Result<User, ServiceError> {
        if self.exists(id).await? {
            return Err(ServiceError::Conflict);
        }

        self.gateway
            .execute(
                "INSERT INTO users (id, name, age) VALUES ($1, $2, $3)",
                &[
                    SqlParam::Int(id.get()),
                    SqlParam::Text(new_user.name.clone()),
                    SqlParam::Int(new_user.age),
                ],
            )
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ServiceError::Conflict
                } else {
                    ServiceError::Persistence(e)
                }
            })?;

        info!("Created user {}", id);
        Ok(new_user.into())
    }

    /// 逐个字段独立更新，未提供的字段保持不变，返回更新后的记录
    pub async fn update_user(&self, id: UserId, changes: UserUpdate) -> Result<User, ServiceError> {
        if !self.exists(id).await? {
            return Err(ServiceError::NotFound);
        }
        if changes.is_empty() {
            debug!("Nothing to update for user {}", id);
            return self.get_user(id).await;
        }

        if let Some(name) = changes.name {
            self.update_field("UPDATE users SET name = $1 WHERE id = $2", name.into(), id)
                .await?;
        }
        if let Some(age) = changes.age {
            self.update_field("UPDATE users SET age = $1 WHERE id = $2", age.into(), id)
                .await?;
        }

        info!("Updated user {}", id);
        self.get_user(id).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<DeletedUser, ServiceError> {
        let snapshot = self.get_user(id).await?;

        let affected = self
            .gateway
            .execute("DELETE FROM users WHERE id = $1", &[SqlParam::Int(id.get())])
            .await?;
        if affected == 0 {
            return Err(ServiceError::NotFound);
        }

        info!("Deleted user {}", id);
        Ok(DeletedUser {
            message: DELETED_MESSAGE.to_string(),
            deleted_user: snapshot,
        })
    }

    /// 按名称查找；同名时取 id 最小的记录
    pub async fn search_by_name(&self, name: Option<&str>) -> Result<User, ServiceError> {
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(ServiceError::BadRequest(
                    "Name parameter is required".to_string(),
                ))
            }
        };

        let rows: Vec<(i64,)> = self
            .gateway
            .fetch(
                "SELECT id FROM users WHERE name = $1 ORDER BY id LIMIT 1",
                &[SqlParam::from(name)],
            )
            .await?;
        let (raw_id,) = rows.into_iter().next().ok_or(ServiceError::NotFound)?;

        debug!("Resolved name {:?} to user {}", name, raw_id);
        // 存储中的 id 总是由 UserId 写入，越界只可能来自外部写入
        let id = UserId::new(raw_id).map_err(|_| ServiceError::NotFound)?;
        self.get_user(id).await
    }

    pub async fn list_users(&self) -> Result<BTreeMap<i64, User>, ServiceError> {
        let rows: Vec<(i64, String, i64)> = self
            .gateway
            .fetch("SELECT id, name, age FROM users", &[])
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, age)| (id, User { name, age }))
            .collect())
    }

    async fn exists(&self, id: UserId) -> Result<bool, ServiceError> {
        let rows: Vec<(i64,)> = self
            .gateway
            .fetch("SELECT id FROM users WHERE id = $1", &[SqlParam::Int(id.get())])
            .await?;
        Ok(!rows.is_empty())
    }

    async fn update_field(&self, query: &str, value: SqlParam, id: UserId) -> Result<(), ServiceError> {
        let affected = self
            .gateway
            .execute(query, &[value, SqlParam::Int(id.get())])
            .await?;
        if affected == 0 {
            return Err(ServiceError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::DatabaseConfig;

    async fn service() -> UserService {
        let gateway = Gateway::connect(&DatabaseConfig::in_memory()).await.unwrap();
        UserService::new(gateway)
    }

    fn id(value: i64) -> UserId {
        UserId::new(value).unwrap()
    }

    fn new_user(name: &str, age: i64) -> NewUser {
        NewUser {
            name: name.to_string(),
            age,
        }
    }

    fn user(name: &str, age: i64) -> User {
        User {
            name: name.to_string(),
            age,
        }
    }

    #[tokio::test]
    async fn test_get_absent_is_not_found() {
        let service = service().await;
        for raw in [1, 50, 99] {
            assert!(matches!(
                service.get_user(id(raw)).await,
                Err(ServiceError::NotFound)
            ));
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service().await;

        let created = service.create_user(id(3), new_user("Ann", 41)).await.unwrap();
        assert_eq!(created, user("Ann", 41));
        assert_eq!(service.get_user(id(3)).await.unwrap(), user("Ann", 41));
    }

    #[tokio::test]
    async fn test_create_twice_conflicts_and_keeps_first() {
        let service = service().await;

        service.create_user(id(1), new_user("A", 10)).await.unwrap();
        let second = service.create_user(id(1), new_user("Z", 99)).await;
        assert!(matches!(second, Err(ServiceError::Conflict)));
        assert_eq!(service.get_user(id(1)).await.unwrap(), user("A", 10));
    }

    #[tokio::test]
    async fn test_update_name_only_keeps_age() {
        let service = service().await;
        service.create_user(id(1), new_user("A", 10)).await.unwrap();

        let updated = service
            .update_user(
                id(1),
                UserUpdate {
                    name: Some("B".to_string()),
                    age: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated, user("B", 10));
    }

    #[tokio::test]
    async fn test_update_age_only_keeps_name() {
        let service = service().await;
        service.create_user(id(1), new_user("A", 10)).await.unwrap();

        let updated = service
            .update_user(
                id(1),
                UserUpdate {
                    name: None,
                    age: Some(11),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated, user("A", 11));
    }

    #[tokio::test]
    async fn test_empty_update_returns_record_unchanged() {
        let service = service().await;
        service.create_user(id(1), new_user("A", 10)).await.unwrap();

        let updated = service.update_user(id(1), UserUpdate::default()).await.unwrap();
        assert_eq!(updated, user("A", 10));

        assert!(matches!(
            service.update_user(id(2), UserUpdate::default()).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_leaves_other_rows_untouched() {
        let service = service().await;
        service.create_user(id(1), new_user("A", 10)).await.unwrap();
        service.create_user(id(2), new_user("B", 20)).await.unwrap();

        service
            .update_user(
                id(1),
                UserUpdate {
                    name: Some("C".to_string()),
                    age: Some(30),
                },
            )
            .await
            .unwrap();

        assert_eq!(service.get_user(id(1)).await.unwrap(), user("C", 30));
        assert_eq!(service.get_user(id(2)).await.unwrap(), user("B", 20));
    }

    #[tokio::test]
    async fn test_update_absent_is_not_found() {
        let service = service().await;
        let result = service
            .update_user(
                id(4),
                UserUpdate {
                    name: Some("X".to_string()),
                    age: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
        assert!(service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_returns_snapshot_then_absent() {
        let service = service().await;
        service.create_user(id(5), new_user("E", 50)).await.unwrap();
        let before = service.get_user(id(5)).await.unwrap();

        let deleted = service.delete_user(id(5)).await.unwrap();
        assert_eq!(deleted.message, DELETED_MESSAGE);
        assert_eq!(deleted.deleted_user, before);
        assert!(matches!(
            service.get_user(id(5)).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_absent_is_not_found() {
        let service = service().await;
        assert!(matches!(
            service.delete_user(id(9)).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_id_reusable_after_delete() {
        let service = service().await;
        service.create_user(id(8), new_user("H", 8)).await.unwrap();
        service.delete_user(id(8)).await.unwrap();

        service.create_user(id(8), new_user("H", 8)).await.unwrap();
        assert_eq!(service.get_user(id(8)).await.unwrap(), user("H", 8));
    }

    #[tokio::test]
    async fn test_list_users() {
        let service = service().await;
        assert!(service.list_users().await.unwrap().is_empty());

        service.create_user(id(1), new_user("A", 10)).await.unwrap();
        service.create_user(id(2), new_user("B", 20)).await.unwrap();

        let all = service.list_users().await.unwrap();
        let expected: BTreeMap<i64, User> = [(1, user("A", 10)), (2, user("B", 20))].into();
        assert_eq!(all, expected);
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let service = service().await;
        service.create_user(id(1), new_user("A", 10)).await.unwrap();
        service.create_user(id(2), new_user("B", 20)).await.unwrap();

        assert_eq!(service.search_by_name(Some("A")).await.unwrap(), user("A", 10));
        assert!(matches!(
            service.search_by_name(Some("nonexistent")).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_search_duplicate_names_picks_lowest_id() {
        let service = service().await;
        service.create_user(id(7), new_user("Sam", 70)).await.unwrap();
        service.create_user(id(3), new_user("Sam", 30)).await.unwrap();
        service.create_user(id(5), new_user("Sam", 50)).await.unwrap();

        assert_eq!(
            service.search_by_name(Some("Sam")).await.unwrap(),
            user("Sam", 30)
        );
    }

    #[tokio::test]
    async fn test_search_without_name_is_bad_request() {
        let service = service().await;
        assert!(matches!(
            service.search_by_name(None).await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            service.search_by_name(Some("")).await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_store_fault_is_persistence_error() {
        let service = service().await;
        service.gateway.close().await;

        assert!(matches!(
            service.get_user(id(1)).await,
            Err(ServiceError::Persistence(_))
        ));
    }
}
