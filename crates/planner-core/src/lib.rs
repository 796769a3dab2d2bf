//! planner-core
//!
//! Task persistence and reminder scheduling for the daily planner.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Task, TaskTime, display/canonical date, errors）
//! - **ports**: 抽象化レイヤー（TaskStore, Clock, Notifier）
//! - **impls**: 実装（SqliteTaskStore, InMemoryTaskStore, 各 Notifier）
//! - **app**: アプリケーションロジック（Planner, ReminderScanner, AppBuilder）
//! - **config**: 起動時設定（TOML）とウィンドウ位置ファイル
//! - **observability**: tracing の初期化

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{App, AppBuilder, Planner, ReminderHandle, ReminderScanner};
pub use config::PlannerConfig;
pub use domain::{PlannerError, Task, TaskTime};
