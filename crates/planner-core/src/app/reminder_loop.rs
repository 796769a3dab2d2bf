//! ReminderScanner - 期限のタスクを通知するループ
//!
//! # フロー（1 tick）
//! 1. Clock から現在時刻を取り、`HH:MM` に切り捨てる
//! 2. TaskStore から今日のタスクを読む
//! 3. `time` が現在の `HH:MM` と一致するタスクごとに Notifier を呼ぶ
//!
//! GUI のライフサイクルとは独立に、プロセスが生きている間ずっと回る。
//! 停止は CancellationToken で行い、`ReminderHandle::shutdown_and_join` で終了を待つ。

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{NotificationConfig, ReminderConfig};
use crate::domain::{Task, TaskTime};
use crate::ports::{Clock, Notification, Notifier, TaskStore};

pub struct ReminderScanner {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    config: ReminderConfig,
    notification: NotificationConfig,
    /// dedupe 有効時、通知済みの (name, date, time)
    fired: HashSet<(String, NaiveDate, TaskTime)>,
}

impl ReminderScanner {
    pub fn new(
        store: Arc<dyn TaskStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        config: ReminderConfig,
        notification: NotificationConfig,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            config,
            notification,
            fired: HashSet::new(),
        }
    }

    /// Run one check. Returns how many notifications were sent.
    ///
    /// ストレージが読めなければ警告を出して 0 を返す（ループは止めない）。
    pub async fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let today = now.date();
        let current = TaskTime::from_naive(now.time());

        let tasks = match self.store.list_by_date(today).await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(date = %today, error = %e, "reminder tick skipped");
                return 0;
            }
        };

        if self.config.dedupe {
            // 日付が変わったら前日分は不要
            self.fired.retain(|(_, date, _)| *date >= today);
        }

        let mut sent = 0;
        for task in tasks.iter().filter(|t| t.time == current) {
            if self.config.dedupe
                && !self
                    .fired
                    .insert((task.name.clone(), task.date, task.time))
            {
                continue;
            }
            self.notifier.notify(&self.notification_for(task));
            sent += 1;
        }

        debug!(time = %current, due = sent, "reminder tick");
        sent
    }

    fn notification_for(&self, task: &Task) -> Notification {
        Notification {
            title: self.notification.title.clone(),
            message: task.name.clone(),
            source_label: self.notification.source_label.clone(),
            timeout: std::time::Duration::from_secs(self.notification.timeout_secs),
        }
    }

    /// Tick on a fixed cadence until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        let period = self.config.tick_interval();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(?period, dedupe = self.config.dedupe, "reminder scanner started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("reminder scanner cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let sent = self.tick().await;
                    if sent > 0 {
                        info!(sent, "reminders sent");
                    }
                }
            }
        }
    }

    /// Spawn onto the current tokio runtime.
    pub fn spawn(self) -> ReminderHandle {
        let cancel = CancellationToken::new();
        let join = tokio::spawn(self.run(cancel.clone()));
        ReminderHandle { cancel, join }
    }
}

/// Background scanner handle.
/// - `request_shutdown()` でループに停止を伝える
/// - `shutdown_and_join()` で停止を伝えて終了を待つ
pub struct ReminderHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl ReminderHandle {
    pub fn request_shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            warn!(error = %e, "reminder scanner task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewTask;
    use crate::impls::{InMemoryTaskStore, RecordingNotifier};
    use crate::ports::FixedClock;
    use chrono::{Duration, NaiveDateTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        today().and_hms_opt(h, m, s).unwrap()
    }

    struct Harness {
        store: Arc<InMemoryTaskStore>,
        clock: Arc<FixedClock>,
        notifier: Arc<RecordingNotifier>,
    }

    impl Harness {
        async fn new(now: NaiveDateTime) -> Self {
            let store = Arc::new(InMemoryTaskStore::new());
            store
                .insert(NewTask::new("Pay bills", today(), "09:30".parse().unwrap()))
                .await
                .unwrap();
            Self {
                store,
                clock: Arc::new(FixedClock::new(now)),
                notifier: Arc::new(RecordingNotifier::new()),
            }
        }

        fn scanner(&self, dedupe: bool, tick_interval_secs: u64) -> ReminderScanner {
            ReminderScanner::new(
                self.store.clone(),
                self.clock.clone(),
                self.notifier.clone(),
                ReminderConfig {
                    tick_interval_secs,
                    dedupe,
                },
                NotificationConfig::default(),
            )
        }
    }

    #[tokio::test]
    async fn fires_once_per_tick_in_the_matching_minute() {
        let h = Harness::new(at(9, 30, 0)).await;
        let mut scanner = h.scanner(false, 20);

        assert_eq!(scanner.tick().await, 1);
        h.clock.set(at(9, 30, 20));
        assert_eq!(scanner.tick().await, 1);
        h.clock.set(at(9, 30, 40));
        assert_eq!(scanner.tick().await, 1);
        assert_eq!(h.notifier.messages(), vec!["Pay bills"; 3]);

        h.clock.set(at(9, 31, 0));
        assert_eq!(scanner.tick().await, 0);
        assert_eq!(h.notifier.sent().len(), 3);
    }

    #[tokio::test]
    async fn does_not_fire_outside_the_minute() {
        let h = Harness::new(at(9, 29, 59)).await;
        let mut scanner = h.scanner(false, 20);
        assert_eq!(scanner.tick().await, 0);
        h.clock.set(at(9, 31, 0));
        assert_eq!(scanner.tick().await, 0);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn notification_carries_configured_fields() {
        let h = Harness::new(at(9, 30, 5)).await;
        let mut scanner = h.scanner(false, 20);
        scanner.tick().await;

        let sent = h.notifier.sent();
        assert_eq!(
            sent,
            vec![Notification {
                title: "Reminder".to_string(),
                message: "Pay bills".to_string(),
                source_label: "Daily Planner".to_string(),
                timeout: std::time::Duration::from_secs(10),
            }]
        );
    }

    #[tokio::test]
    async fn dedupe_fires_once_per_minute() {
        let h = Harness::new(at(9, 30, 0)).await;
        let mut scanner = h.scanner(true, 20);

        assert_eq!(scanner.tick().await, 1);
        h.clock.advance(Duration::seconds(20));
        assert_eq!(scanner.tick().await, 0);
        h.clock.advance(Duration::seconds(20));
        assert_eq!(scanner.tick().await, 0);
        assert_eq!(h.notifier.sent().len(), 1);

        // 翌日の同じ時刻は別物
        h.store
            .insert(NewTask::new(
                "Pay bills",
                today().succ_opt().unwrap(),
                "09:30".parse().unwrap(),
            ))
            .await
            .unwrap();
        h.clock.set(at(9, 30, 0) + Duration::days(1));
        assert_eq!(scanner.tick().await, 1);
        assert_eq!(scanner.fired.len(), 1);
    }

    #[tokio::test]
    async fn other_days_and_duplicates_are_handled() {
        let h = Harness::new(at(9, 30, 0)).await;
        h.store
            .insert(NewTask::new("Tomorrow", today().succ_opt().unwrap(), "09:30".parse().unwrap()))
            .await
            .unwrap();
        h.store
            .insert(NewTask::new("Stretch", today(), "9:30".parse().unwrap()))
            .await
            .unwrap();

        let mut scanner = h.scanner(false, 20);
        assert_eq!(scanner.tick().await, 2);
        assert_eq!(h.notifier.messages(), vec!["Pay bills", "Stretch"]);
    }

    #[tokio::test]
    async fn storage_failure_skips_the_tick() {
        let h = Harness::new(at(9, 30, 0)).await;
        let mut scanner = h.scanner(true, 20);

        h.store.set_offline(true);
        assert_eq!(scanner.tick().await, 0);

        h.store.set_offline(false);
        assert_eq!(scanner.tick().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_on_interval_until_cancelled() {
        let h = Harness::new(at(9, 30, 0)).await;
        let handle = h.scanner(false, 1).spawn();

        // ticks at t = 0s, 1s, 2s
        tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
        handle.shutdown_and_join().await;

        assert_eq!(h.notifier.sent().len(), 3);
    }

    #[tokio::test]
    async fn shutdown_joins_promptly() {
        let h = Harness::new(at(12, 0, 0)).await;
        let handle = h.scanner(true, 3600).spawn();
        assert!(!handle.is_finished());

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            handle.shutdown_and_join(),
        )
        .await;
        assert!(result.is_ok(), "scanner should stop after cancel");
    }
}
