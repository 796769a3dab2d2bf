//! Planner - 対話レイヤー（GUI / CLI）が呼ぶ境界
//!
//! display date（`MM/DD/YY`）の変換と、エラーの伝播方針をここで決める。
//!
//! | 操作 | 失敗時 |
//! |------|--------|
//! | `add` | `PlannerError` を返す（行は書かない） |
//! | `list` | ログに残して空の Vec |
//! | `set_completion` / `delete` | ログに残して no-op |
//! | `describe` | ログに残して None |
//! | `initialize` | ログに残して続行（best-effort bootstrap） |
//!
//! 「該当なし」と「ストレージ停止」を区別したい呼び出し側は `try_list` を使う。

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::domain::date::to_canonical;
use crate::domain::{NewTask, PlannerError, Task, TaskTime};
use crate::ports::{Clock, TaskStore};

pub const NO_TASKS_TODAY: &str = "No tasks for today.";

#[derive(Clone)]
pub struct Planner {
    store: Arc<dyn TaskStore>,
}

impl Planner {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn TaskStore> {
        Arc::clone(&self.store)
    }

    /// Create the schema if needed. Never fails the caller.
    pub async fn initialize(&self) {
        match self.store.init().await {
            Ok(()) => info!("task store initialized"),
            Err(e) => error!(error = %e, "task store initialization failed"),
        }
    }

    /// Validate and insert one task.
    ///
    /// 日付・時刻・名前のどれかが不正なら何も書かずに `Err` を返す。
    pub async fn add(
        &self,
        name: &str,
        display_date: &str,
        time: &str,
        description: Option<&str>,
    ) -> Result<(), PlannerError> {
        let name = name.trim();
        if name.is_empty() {
            warn!("rejected task with empty name");
            return Err(PlannerError::EmptyName);
        }
        let date = to_canonical(display_date).inspect_err(|e| {
            warn!(task = name, error = %e, "rejected task with invalid date");
        })?;
        let time = time.trim().parse::<TaskTime>().inspect_err(|e| {
            warn!(task = name, error = %e, "rejected task with invalid time");
        })?;

        let mut task = NewTask::new(name, date, time);
        task.description = description.map(str::to_string);

        match self.store.insert(task).await {
            Ok(()) => {
                info!(task = name, %date, %time, "task added");
                Ok(())
            }
            Err(e) => {
                error!(task = name, %date, error = %e, "failed to add task");
                Err(e.into())
            }
        }
    }

    /// Tasks on `display_date`, ascending by time.
    ///
    /// 不正な日付・ストレージ障害のどちらでも空の Vec を返す。
    pub async fn list(&self, display_date: &str) -> Vec<Task> {
        match self.try_list(display_date).await {
            Ok(tasks) => tasks,
            Err(PlannerError::InvalidDate(e)) => {
                debug!(error = %e, "list with unparseable date");
                Vec::new()
            }
            Err(e) => {
                error!(date = display_date, error = %e, "failed to list tasks");
                Vec::new()
            }
        }
    }

    pub async fn try_list(&self, display_date: &str) -> Result<Vec<Task>, PlannerError> {
        let date = to_canonical(display_date)?;
        let tasks = self.store.list_by_date(date).await?;
        debug!(%date, count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    /// Set the flag on every row matching (name, date). Zero matches is silent.
    pub async fn set_completion(&self, name: &str, display_date: &str, completed: bool) {
        let date = match to_canonical(display_date) {
            Ok(date) => date,
            Err(e) => {
                warn!(task = name, error = %e, "completion change ignored");
                return;
            }
        };
        match self.store.set_completion(name, date, completed).await {
            Ok(rows) => info!(task = name, %date, completed, rows, "completion updated"),
            Err(e) => error!(task = name, %date, error = %e, "failed to update completion"),
        }
    }

    /// Delete every row matching (name, date). Zero matches is silent.
    pub async fn delete(&self, name: &str, display_date: &str) {
        let date = match to_canonical(display_date) {
            Ok(date) => date,
            Err(e) => {
                warn!(task = name, error = %e, "delete ignored");
                return;
            }
        };
        match self.store.delete(name, date).await {
            Ok(rows) => info!(task = name, %date, rows, "task deleted"),
            Err(e) => error!(task = name, %date, error = %e, "failed to delete task"),
        }
    }

    /// Description of the first task named `name` on *any* date.
    ///
    /// 選択中の日付で絞り込まない（既存の挙動）。日付で絞りたい場合は `describe_on`。
    pub async fn describe(&self, name: &str) -> Option<String> {
        self.describe_scoped(name, None).await
    }

    pub async fn describe_on(&self, name: &str, display_date: &str) -> Option<String> {
        let date = match to_canonical(display_date) {
            Ok(date) => date,
            Err(e) => {
                debug!(task = name, error = %e, "describe with unparseable date");
                return None;
            }
        };
        self.describe_scoped(name, Some(date)).await
    }

    async fn describe_scoped(&self, name: &str, date: Option<NaiveDate>) -> Option<String> {
        match self.store.find_first(name, date).await {
            Ok(task) => task.and_then(|t| t.description),
            Err(e) => {
                error!(task = name, error = %e, "failed to read description");
                None
            }
        }
    }

    /// Today's tasks as `HH:MM: name` lines, for the tray menu.
    pub async fn today_summary(&self, clock: &dyn Clock) -> String {
        let today = clock.today();
        let tasks = match self.store.list_by_date(today).await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!(date = %today, error = %e, "failed to list today's tasks");
                Vec::new()
            }
        };
        if tasks.is_empty() {
            return NO_TASKS_TODAY.to_string();
        }
        tasks
            .iter()
            .map(|t| format!("{}: {}", t.time, t.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
