//! Errors - エラー型と分類
//!
//! - `DateError` / `TimeError`: 入力値の検証エラー
//! - `StoreError`: TaskStore port のエラー（`Unavailable` と「該当なし」を区別する）
//! - `PlannerError`: 対話レイヤーに返すエラー

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("invalid display date {0:?}, expected MM/DD/YY")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("invalid time {0:?}, expected HH:MM (24-hour)")]
    Invalid(String),
}

/// StoreError は TaskStore 実装が返すエラー
///
/// - Unavailable: 接続・I/O・blocking task の失敗（リトライすれば直る可能性あり）
/// - Constraint: NOT NULL などの制約違反
/// - Corrupt: 保存済みの行が読めない（time/date の形式が壊れている）
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation) {
            return StoreError::Constraint(err.to_string());
        }
        match err {
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..) => StoreError::Corrupt(err.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    InvalidDate(#[from] DateError),

    #[error(transparent)]
    InvalidTime(#[from] TimeError),

    #[error("task name must not be empty")]
    EmptyName,

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<StoreError> for PlannerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) | StoreError::Corrupt(msg) => PlannerError::Unavailable(msg),
            StoreError::Constraint(msg) => PlannerError::Constraint(msg),
        }
    }
}
