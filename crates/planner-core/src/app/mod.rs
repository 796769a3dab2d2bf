//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **Planner**: 対話レイヤーが呼ぶ CRUD の境界（日付変換・エラー方針）
//! - **ReminderScanner**: 期限タスクの通知ループ

pub mod builder;
pub mod planner;
pub mod reminder_loop;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::planner::Planner;
pub use self::reminder_loop::{ReminderHandle, ReminderScanner};
