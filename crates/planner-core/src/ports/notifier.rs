//! Notifier port - デスクトップ通知の抽象化
//!
//! fire-and-forget: 戻り値は観測しない。失敗しても呼び出し側（ReminderScanner）には返さない。

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 通知 1 件分の内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    /// 通知元として表示するアプリ名
    pub source_label: String,
    pub timeout: Duration,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}
