//! 交互式客户端
//!
//! 读取命令名，调用对应的 HTTP 接口并打印结果。

pub mod prompt;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use tracing::debug;

use crate::app::users::model::{DeletedUser, NewUser, User, UserUpdate};
use crate::core::response::MessageResponse;
use prompt::{parse_age, parse_id, parse_name, Prompter};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// 接口调用结果：成功时解码响应体，失败时保留 `detail`
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success(T),
    Failure { detail: String },
}

/// 客户端支持的命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Root,
    GetUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
    SearchByName,
    GetAllUsers,
    Exit,
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(Command::Root),
            "get_user" => Ok(Command::GetUser),
            "create_user" => Ok(Command::CreateUser),
            "update_user" => Ok(Command::UpdateUser),
            "delete_user" => Ok(Command::DeleteUser),
            "search_by_name" => Ok(Command::SearchByName),
            "get_all_users" => Ok(Command::GetAllUsers),
            "exit" => Ok(Command::Exit),
            _ => Err(()),
        }
    }
}

/// 从错误响应体中提取说明文字
pub fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("detail")
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        Err(_) => body.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn root(&self) -> Result<ApiOutcome<MessageResponse>, ClientError> {
        self.send(Method::GET, "/", None::<&()>, StatusCode::OK).await
    }

    pub async fn get_user(&self, id: i64) -> Result<ApiOutcome<User>, ClientError> {
        self.send(Method::GET, &format!("/users/{}", id), None::<&()>, StatusCode::OK)
            .await
    }

    pub async fn create_user(&self, id: i64, user: &NewUser) -> Result<ApiOutcome<User>, ClientError> {
        self.send(Method::POST, &format!("/users/{}", id), Some(user), StatusCode::CREATED)
            .await
    }

    pub async fn update_user(
        &self,
        id: i64,
        changes: &UserUpdate,
    ) -> Result<ApiOutcome<User>, ClientError> {
        self.send(Method::PUT, &format!("/users/{}", id), Some(changes), StatusCode::OK)
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<ApiOutcome<DeletedUser>, ClientError> {
        self.send(Method::DELETE, &format!("/users/{}", id), None::<&()>, StatusCode::OK)
            .await
    }

    pub async fn search_by_name(&self, name: &str) -> Result<ApiOutcome<User>, ClientError> {
        let response = self
            .http
            .get(format!("{}/users/search/", self.base_url))
            .query(&[("name", name)])
            .send()
            .await?;
        Self::decode(response, StatusCode::OK).await
    }

    pub async fn get_all_users(&self) -> Result<ApiOutcome<BTreeMap<i64, User>>, ClientError> {
        self.send(Method::GET, "/users/all/", None::<&()>, StatusCode::OK)
            .await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        expected: StatusCode,
    ) -> Result<ApiOutcome<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::decode(response, expected).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        expected: StatusCode,
    ) -> Result<ApiOutcome<T>, ClientError> {
        let status = response.status();
        if status == expected {
            return Ok(ApiOutcome::Success(response.json().await?));
        }

        let body = response.text().await?;
        debug!("Unexpected status {} (expected {})", status, expected);
        Ok(ApiOutcome::Failure {
            detail: extract_detail(&body),
        })
    }
}

/// 一次交互会话
pub struct Session<R, W> {
    client: ApiClient,
    prompter: Prompter<R, W>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(client: ApiClient, prompter: Prompter<R, W>) -> Self {
        Self { client, prompter }
    }

    /// 先等待一次回车，然后循环读取命令直到 `exit` 或输入结束
    pub async fn run(&mut self) -> Result<(), ClientError> {
        match self.prompter.read_line("") {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        loop {
            let line = match self.prompter.read_line("API call: ") {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
                Err(e) => return Err(e.into()),
            };

            let command = match line.parse::<Command>() {
                Ok(Command::Exit) => return Ok(()),
                Ok(command) => command,
                Err(()) => {
                    self.prompter.say("Invalid API call.")?;
                    continue;
                }
            };

            match self.dispatch(command).await {
                Ok(()) => {}
                Err(ClientError::Http(e)) => self.prompter.say(format!("Request failed: {}", e))?,
                Err(e) => return Err(e),
            }
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<(), ClientError> {
        match command {
            Command::Root => match self.client.root().await? {
                ApiOutcome::Success(body) => self.prompter.say(body.message)?,
                ApiOutcome::Failure { detail } => self.prompter.say(detail)?,
            },
            Command::GetUser => {
                let id = self.prompter.ask("User ID: ", parse_id)?;
                match self.client.get_user(id).await? {
                    ApiOutcome::Success(user) => self
                        .prompter
                        .say(format!("Name: {}, Age: {}", user.name, user.age))?,
                    ApiOutcome::Failure { detail } => self.prompter.say(detail)?,
                }
            }
            Command::CreateUser => {
                let id = self.prompter.ask("User ID: ", parse_id)?;
                let name = self.prompter.ask("Name: ", |s| parse_name(s, false))?;
                let age = self.prompter.ask("Age: ", |s| parse_age(s, false))?;
                let user = NewUser {
                    name: name.unwrap_or_default(),
                    age: age.unwrap_or_default(),
                };
                match self.client.create_user(id, &user).await? {
                    ApiOutcome::Success(_) => self.prompter.say("User was created successfully")?,
                    ApiOutcome::Failure { detail } => self.prompter.say(detail)?,
                }
            }
            Command::UpdateUser => {
                let id = self.prompter.ask("User ID: ", parse_id)?;
                let name = self.prompter.ask("Name: ", |s| parse_name(s, true))?;
                let age = self.prompter.ask("Age: ", |s| parse_age(s, true))?;
                let changes = UserUpdate { name, age };
                match self.client.update_user(id, &changes).await? {
                    ApiOutcome::Success(_) => self.prompter.say("User was updated successfully")?,
                    ApiOutcome::Failure { detail } => self.prompter.say(detail)?,
                }
            }
            Command::DeleteUser => {
                let id = self.prompter.ask("User ID: ", parse_id)?;
                match self.client.delete_user(id).await? {
                    ApiOutcome::Success(_) => self.prompter.say("User successfully deleted")?,
                    ApiOutcome::Failure { detail } => self.prompter.say(detail)?,
                }
            }
            Command::SearchByName => {
                let name = self
                    .prompter
                    .ask("Name: ", |s| parse_name(s, false))?
                    .unwrap_or_default();
                match self.client.search_by_name(&name).await? {
                    ApiOutcome::Success(user) => self
                        .prompter
                        .say(format!("User: {} found, age: {}", name, user.age))?,
                    ApiOutcome::Failure { detail } => self.prompter.say(detail)?,
                }
            }
            Command::GetAllUsers => match self.client.get_all_users().await? {
                ApiOutcome::Success(users) => {
                    for (id, user) in users {
                        self.prompter
                            .say(format!("ID: {}, Name: {}, Age: {}", id, user.name, user.age))?;
                    }
                }
                ApiOutcome::Failure { detail } => {
                    self.prompter.say(detail)?;
                    self.prompter.say("Could not get all users")?;
                }
            },
            Command::Exit => {}
        }
        Ok(())
    }
}
