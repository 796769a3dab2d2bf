//! Notifier 実装
//!
//! - **LogNotifier**: tracing に出すだけ（ヘッドレス環境・デフォルト）
//! - **DesktopNotifier**: `notify-send` を起動してデスクトップ通知を出す（freedesktop 環境のみ）
//! - **RecordingNotifier**: 受け取った通知を溜めておく（テスト用）

use std::process::Stdio;
use std::sync::Mutex;

use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::ports::{Notification, Notifier};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        info!(
            title = %notification.title,
            source = %notification.source_label,
            timeout_secs = notification.timeout.as_secs(),
            "{}",
            notification.message
        );
    }
}

/// `notify-send` を子プロセスとして起動する。
///
/// `notify-send` は freedesktop の通知仕様（Linux / BSD のデスクトップ）にしか無い。
/// macOS や Windows では `notification.desktop = false`（LogNotifier）で使う。
/// 起動できなくても（コマンドが無い、runtime の外から呼ばれた等）ログに残すだけで、
/// 呼び出し側には返さない。
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    program: String,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::with_program("notify-send")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, notification: &Notification) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--app-name")
            .arg(&notification.source_label)
            .arg("--expire-time")
            .arg(notification.timeout.as_millis().to_string())
            .arg(&notification.title)
            .arg(&notification.message)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) {
        // 子プロセスの reap は tokio の reactor に任せる
        let Ok(handle) = Handle::try_current() else {
            warn!(
                message = %notification.message,
                "desktop notification needs a tokio runtime; dropped"
            );
            return;
        };
        let _enter = handle.enter();

        match self.command(notification).spawn() {
            Ok(mut child) => {
                info!(message = %notification.message, "desktop notification sent");
                let program = self.program.clone();
                handle.spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            warn!(%program, %status, "desktop notifier exited with failure")
                        }
                        Ok(_) => {}
                        Err(e) => debug!(%program, error = %e, "could not wait for desktop notifier"),
                    }
                });
            }
            Err(e) => warn!(
                program = %self.program,
                error = %e,
                message = %notification.message,
                "failed to spawn desktop notifier"
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample() -> Notification {
        Notification {
            title: "Reminder".to_string(),
            message: "Pay bills".to_string(),
            source_label: "Daily Planner".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn desktop_command_carries_every_field() {
        let cmd = DesktopNotifier::new().command(&sample());
        let cmd = cmd.as_std();
        assert_eq!(cmd.get_program(), "notify-send");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "--app-name",
                "Daily Planner",
                "--expire-time",
                "10000",
                "Reminder",
                "Pay bills"
            ]
        );
    }

    #[tokio::test]
    async fn missing_program_does_not_panic() {
        DesktopNotifier::with_program("definitely-not-a-real-notifier-binary").notify(&sample());
    }

    #[test]
    fn notify_outside_a_runtime_is_dropped_without_panicking() {
        DesktopNotifier::with_program("true").notify(&sample());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn spawned_notifier_is_reaped_on_the_runtime() {
        // `true` ignores its arguments and exits 0
        DesktopNotifier::with_program("true").notify(&sample());
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(&sample());
        let mut second = sample();
        second.message = "Call mom".to_string();
        notifier.notify(&second);
        assert_eq!(notifier.messages(), vec!["Pay bills", "Call mom"]);
    }
}
