//! TaskStore port - tasks テーブルの正本（source of truth）
//!
//! TaskStore はスキーマの唯一の持ち主で、ストレージへの接続を開いてよいのはここだけ。
//!
//! # 実装
//! - **SqliteTaskStore**: 本番用（1 呼び出し = 1 接続）
//! - **InMemoryTaskStore**: テスト・デモ用
//!
//! display date の変換はここでは行わない（`app::Planner` が境界で行う）。
//! port 自体は全エラーを `StoreError` として返す。握りつぶすかどうかは呼び出し側の方針。

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{NewTask, StoreError, Task};

/// Durable CRUD for task rows, keyed by (name, date).
///
/// # 設計原則
/// - `(name, date)` で一致する行は 0 件・1 件・複数件のいずれもありうる。
///   `set_completion` / `delete` は一致した全行に作用し、0 件でもエラーにしない。
/// - `list_by_date` は `time` 昇順（zero-padded なので辞書順 = 時系列順）。
/// - 行が更新されるのは completion flag だけ。
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Ensure the `tasks` table exists. Idempotent.
    async fn init(&self) -> Result<(), StoreError>;

    /// Append one row with `completed = false`. No duplicate check.
    async fn insert(&self, task: NewTask) -> Result<(), StoreError>;

    /// All rows on `date`, ascending by time. Unreadable rows are skipped.
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Task>, StoreError>;

    /// Returns the number of rows updated.
    async fn set_completion(
        &self,
        name: &str,
        date: NaiveDate,
        completed: bool,
    ) -> Result<usize, StoreError>;

    /// Returns the number of rows deleted.
    async fn delete(&self, name: &str, date: NaiveDate) -> Result<usize, StoreError>;

    /// First row (insertion order) named `name`; restricted to `date` when given.
    async fn find_first(
        &self,
        name: &str,
        date: Option<NaiveDate>,
    ) -> Result<Option<Task>, StoreError>;
}
