//! InMemoryTaskStore - 開発・テスト用の TaskStore
//!
//! SqliteTaskStore と同じ並び順・一致条件を Vec の上で再現する。
//! 挿入順が rowid の代わり。

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::domain::{NewTask, StoreError, Task};
use crate::ports::TaskStore;

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    rows: Mutex<Vec<Task>>,
    /// true の間は全操作が `StoreError::Unavailable` を返す
    offline: AtomicBool,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a storage outage (or recovery).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn init(&self) -> Result<(), StoreError> {
        self.check_online()
    }

    async fn insert(&self, task: NewTask) -> Result<(), StoreError> {
        self.check_online()?;
        self.rows.lock().await.push(task.into_task());
        Ok(())
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Task>, StoreError> {
        self.check_online()?;
        let rows = self.rows.lock().await;
        let mut tasks: Vec<Task> = rows.iter().filter(|t| t.date == date).cloned().collect();
        // stable sort: 同じ時刻なら挿入順
        tasks.sort_by_key(|t| t.time);
        Ok(tasks)
    }

    async fn set_completion(
        &self,
        name: &str,
        date: NaiveDate,
        completed: bool,
    ) -> Result<usize, StoreError> {
        self.check_online()?;
        let mut rows = self.rows.lock().await;
        let mut n = 0;
        for task in rows.iter_mut().filter(|t| t.name == name && t.date == date) {
            task.completed = completed;
            n += 1;
        }
        Ok(n)
    }

    async fn delete(&self, name: &str, date: NaiveDate) -> Result<usize, StoreError> {
        self.check_online()?;
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|t| !(t.name == name && t.date == date));
        Ok(before - rows.len())
    }

    async fn find_first(
        &self,
        name: &str,
        date: Option<NaiveDate>,
    ) -> Result<Option<Task>, StoreError> {
        self.check_online()?;
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|t| t.name == name && date.is_none_or(|d| t.date == d))
            .cloned())
    }
}
