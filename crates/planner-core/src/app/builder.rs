//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - テストダブルの差し込み（store / clock / notifier）

use std::sync::Arc;

use crate::app::{Planner, ReminderScanner};
use crate::config::PlannerConfig;
use crate::impls::{DesktopNotifier, LogNotifier, SqliteTaskStore};
use crate::ports::{Clock, Notifier, SystemClock, TaskStore};

/// tick 間隔は 1 分未満でないと、分の境界をまたいで 1 分まるごと飛ばしうる
const MINUTE_SECS: u64 = 60;

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(config)
///     .with_clock(Arc::new(FixedClock::new(now)))
///     .build()?;
/// app.planner.initialize().await;
/// let reminders = app.scanner.spawn();
/// ```
///
/// 差し替えなかった部品は config から作る:
/// - store: `SqliteTaskStore`（`storage.database_path`）
/// - clock: `SystemClock`
/// - notifier: `notification.desktop` が true なら `DesktopNotifier`、それ以外は `LogNotifier`
pub struct AppBuilder {
    config: PlannerConfig,
    store: Option<Arc<dyn TaskStore>>,
    clock: Option<Arc<dyn Clock>>,
    notifier: Option<Arc<dyn Notifier>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("storage.database_path is empty")]
    MissingDatabasePath,

    #[error(
        "reminder.tick_interval_secs = {0} must be shorter than a minute; reminders would be skipped"
    )]
    TickIntervalTooLong(u64),
}

impl AppBuilder {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            store: None,
            clock: None,
            notifier: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// 設定を検証して App を生成
    pub fn build(self) -> Result<App, BuildError> {
        let config = self.config;

        if config.reminder.tick_interval_secs >= MINUTE_SECS {
            return Err(BuildError::TickIntervalTooLong(
                config.reminder.tick_interval_secs,
            ));
        }

        let store: Arc<dyn TaskStore> = match self.store {
            Some(store) => store,
            None => {
                if config.storage.database_path.as_os_str().is_empty() {
                    return Err(BuildError::MissingDatabasePath);
                }
                Arc::new(SqliteTaskStore::new(&config.storage))
            }
        };
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None if config.notification.desktop => Arc::new(DesktopNotifier::new()),
            None => Arc::new(LogNotifier),
        };

        let scanner = ReminderScanner::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            notifier,
            config.reminder.clone(),
            config.notification.clone(),
        );

        Ok(App {
            planner: Planner::new(store),
            scanner,
            clock,
            config,
        })
    }
}

/// App は組み立て済みの部品一式
///
/// Planner と ReminderScanner は同じ TaskStore を共有するが、
/// 呼び出しごとに接続を開くのでメモリ上の共有状態は無い。
pub struct App {
    pub planner: Planner,
    pub scanner: ReminderScanner,
    pub clock: Arc<dyn Clock>,
    pub config: PlannerConfig,
}
