use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::TimeError;

/// 時刻（分解能は分）。表示・保存は常に zero-padded の `HH:MM`。
///
/// 入力は `([01]?[0-9]|2[0-3]):[0-5][0-9]` を全体一致で受け付ける（`9:05` も可）。
/// zero-padding されているので、文字列の辞書順 = 時系列順になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskTime {
    hour: u8,
    minute: u8,
}

impl TaskTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, TimeError> {
        if hour > 23 || minute > 59 {
            return Err(TimeError::Invalid(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Truncates seconds; used by the reminder scanner to compare against "now".
    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl FromStr for TaskTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeError::Invalid(s.to_string());

        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        // hour: 1-2 digits, minute: exactly 2 digits
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for TaskTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for TaskTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskTime> for String {
    fn from(value: TaskTime) -> Self {
        value.to_string()
    }
}

/// 1 行分の Task。
///
/// `(name, date)` が事実上のキーだが、ストレージ側で一意制約はかけていない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub time: TaskTime,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub completed: bool,
}

/// 作成時の入力。`completed` は常に false で作られる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub time: TaskTime,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, date: NaiveDate, time: TaskTime) -> Self {
        Self {
            name: name.into(),
            time,
            date,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn into_task(self) -> Task {
        Task {
            name: self.name,
            time: self.time,
            date: self.date,
            description: self.description,
            completed: false,
        }
    }
}
