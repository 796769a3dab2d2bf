//! SqliteTaskStore - SQLite による TaskStore 実装
//!
//! # 学習ポイント
//! - 1 呼び出し = 1 接続（プールもトランザクションの持ち越しもしない）
//! - `Connection` は drop で閉じるので、エラー経路でも必ず解放される
//! - rusqlite は同期 API なので spawn_blocking で async runtime から逃がす

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::domain::date::{format_canonical, parse_canonical};
use crate::domain::{NewTask, StoreError, Task, TaskTime};
use crate::ports::TaskStore;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS tasks (
        task TEXT NOT NULL,
        time VARCHAR(5) NOT NULL,
        date DATE NOT NULL,
        description TEXT,
        completed BOOLEAN DEFAULT FALSE
    )";

const SELECT_COLUMNS: &str = "SELECT task, time, date, description, completed FROM tasks";

/// Raw column values, converted to `Task` outside the rusqlite row callback.
type RawRow = (String, String, String, Option<String>, bool);

/// SqliteTaskStore は DB ファイルのパスだけを持つ
///
/// # 使用例
/// ```ignore
/// let store = SqliteTaskStore::new(&config.storage);
/// store.init().await?;
/// store.insert(NewTask::new("Pay bills", date, "09:30".parse()?)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    path: PathBuf,
    connect_timeout: Duration,
}

impl SqliteTaskStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            path: config.database_path.clone(),
            connect_timeout: config.connect_timeout(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connect_timeout: StorageConfig::default().connect_timeout(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection, run `f` on the blocking pool, and close it.
    async fn with_connection<T, F>(&self, op: &'static str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let path = self.path.clone();
        let timeout = self.connect_timeout;

        tokio::task::spawn_blocking(move || {
            let conn = connect(&path, timeout)?;
            debug!(op, path = %path.display(), "sqlite connection opened");
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("{op} aborted: {e}")))?
    }
}

fn connect(path: &Path, timeout: Duration) -> Result<Connection, StoreError> {
    let conn = Connection::open(path)
        .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
    conn.busy_timeout(timeout)?;
    Ok(conn)
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn raw_to_task((name, time, date, description, completed): RawRow) -> Result<Task, StoreError> {
    let time: TaskTime = time
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("task {name:?}: {e}")))?;
    let date = parse_canonical(&date).map_err(|e| StoreError::Corrupt(format!("task {name:?}: {e}")))?;
    Ok(Task {
        name,
        time,
        date,
        description,
        completed,
    })
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn init(&self) -> Result<(), StoreError> {
        self.with_connection("init", |conn| {
            conn.execute_batch(CREATE_TABLE)?;
            Ok(())
        })
        .await
    }

    async fn insert(&self, task: NewTask) -> Result<(), StoreError> {
        self.with_connection("insert", move |conn| {
            conn.execute(
                "INSERT INTO tasks (task, time, date, description) VALUES (?1, ?2, ?3, ?4)",
                params![
                    task.name,
                    task.time.to_string(),
                    format_canonical(task.date),
                    task.description
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Task>, StoreError> {
        self.with_connection("list_by_date", move |conn| {
            let sql = format!("{SELECT_COLUMNS} WHERE date = ?1 ORDER BY time, rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![format_canonical(date)], read_raw)?;

            // 壊れた行は飛ばし、同じ日の他のタスクは返す
            let mut tasks = Vec::new();
            for row in rows {
                match row.map_err(StoreError::from).and_then(raw_to_task) {
                    Ok(task) => tasks.push(task),
                    Err(StoreError::Corrupt(reason)) => {
                        warn!(%date, %reason, "skipping unreadable task row");
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(tasks)
        })
        .await
    }

    async fn set_completion(
        &self,
        name: &str,
        date: NaiveDate,
        completed: bool,
    ) -> Result<usize, StoreError> {
        let name = name.to_string();
        self.with_connection("set_completion", move |conn| {
            let n = conn.execute(
                "UPDATE tasks SET completed = ?1 WHERE task = ?2 AND date = ?3",
                params![completed, name, format_canonical(date)],
            )?;
            Ok(n)
        })
        .await
    }

    async fn delete(&self, name: &str, date: NaiveDate) -> Result<usize, StoreError> {
        let name = name.to_string();
        self.with_connection("delete", move |conn| {
            let n = conn.execute(
                "DELETE FROM tasks WHERE task = ?1 AND date = ?2",
                params![name, format_canonical(date)],
            )?;
            Ok(n)
        })
        .await
    }

    async fn find_first(
        &self,
        name: &str,
        date: Option<NaiveDate>,
    ) -> Result<Option<Task>, StoreError> {
        let name = name.to_string();
        self.with_connection("find_first", move |conn| {
            let raw = match date {
                Some(date) => conn
                    .query_row(
                        &format!("{SELECT_COLUMNS} WHERE task = ?1 AND date = ?2 ORDER BY rowid LIMIT 1"),
                        params![name, format_canonical(date)],
                        read_raw,
                    )
                    .optional()?,
                None => conn
                    .query_row(
                        &format!("{SELECT_COLUMNS} WHERE task = ?1 ORDER BY rowid LIMIT 1"),
                        params![name],
                        read_raw,
                    )
                    .optional()?,
            };
            raw.map(raw_to_task).transpose()
        })
        .await
    }
}
