//! 交互式输入：读取一行并校验，校验失败时重新询问

use std::io::{self, BufRead, Write};

use crate::app::users::model::{MAX_AGE, MAX_NAME_LEN, MAX_USER_ID, MIN_USER_ID};

/// 输入校验错误，`Blank` 不打印提示直接重新询问
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("")]
    Blank,
    #[error("user_id must be int")]
    IdNotInt,
    #[error("user_id must be between 1 and 99")]
    IdOutOfRange,
    #[error("Name is too long")]
    NameTooLong,
    #[error("Age must be int")]
    AgeNotInt,
    #[error("Age must be between 0 and 200")]
    AgeOutOfRange,
}

pub fn parse_id(input: &str) -> Result<i64, InputError> {
    let id: i64 = input.trim().parse().map_err(|_| InputError::IdNotInt)?;
    if !(MIN_USER_ID..=MAX_USER_ID).contains(&id) {
        return Err(InputError::IdOutOfRange);
    }
    Ok(id)
}

/// `optional` 为真时空输入表示不修改，返回 `None`
pub fn parse_name(input: &str, optional: bool) -> Result<Option<String>, InputError> {
    if input.is_empty() {
        return if optional { Ok(None) } else { Err(InputError::Blank) };
    }
    if input.chars().count() as u64 > MAX_NAME_LEN {
        return Err(InputError::NameTooLong);
    }
    Ok(Some(input.to_string()))
}

pub fn parse_age(input: &str, optional: bool) -> Result<Option<i64>, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return if optional { Ok(None) } else { Err(InputError::Blank) };
    }
    let age: i64 = trimmed.parse().map_err(|_| InputError::AgeNotInt)?;
    if !(0..=MAX_AGE).contains(&age) {
        return Err(InputError::AgeOutOfRange);
    }
    Ok(Some(age))
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// 打印提示并读取一行（去掉行尾换行），输入结束时返回 `UnexpectedEof`
    pub fn read_line(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    pub fn ask<T>(
        &mut self,
        label: &str,
        parse: impl Fn(&str) -> Result<T, InputError>,
    ) -> io::Result<T> {
        loop {
            let line = self.read_line(label)?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(InputError::Blank) => continue,
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
    }

    pub fn say(&mut self, message: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}
