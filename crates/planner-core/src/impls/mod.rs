//! Impls - ports の実装
//!
//! - **SqliteTaskStore**: 本番用の TaskStore
//! - **InMemoryTaskStore**: 開発・テスト用の TaskStore
//! - **LogNotifier / DesktopNotifier / RecordingNotifier**: Notifier 実装

pub mod inmem_store;
pub mod notifiers;
pub mod sqlite_store;

pub use self::inmem_store::InMemoryTaskStore;
pub use self::notifiers::{DesktopNotifier, LogNotifier, RecordingNotifier};
pub use self::sqlite_store::SqliteTaskStore;
