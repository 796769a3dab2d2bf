//! Logging setup (tracing-subscriber).
//!
//! stderr には常に出す。`logging.file` があればそのファイルにも追記する。
//! `RUST_LOG` が設定されていれば config の filter より優先する。

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` wins, then the configured directive, then `info`.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// 戻り値の guard は file writer の flush 用。main が終わるまで保持すること。
/// 既に subscriber が設定済みなら何もしない（テストから複数回呼ばれても良い）。
/// ログファイルを開けなければ stderr のみで続行し、警告を 1 行出す。
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let appender = config.file.as_deref().map(|path| (path, file_appender(path)));
    let (file_layer, guard, file_error) = match appender {
        Some((_, Ok(appender))) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard), None)
        }
        Some((path, Err(e))) => (None, None, Some((path, e))),
        None => (None, None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if let Some((path, error)) = file_error {
        tracing::warn!(path = %path.display(), %error, "log file unavailable; logging to stderr only");
    }

    guard
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app.log");
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_is_used_when_valid() {
        let config = LoggingConfig {
            filter: "planner_core=debug".to_string(),
            file: None,
        };
        // RUST_LOG may be set in CI; only check that a filter is produced
        let filter = env_filter(&config);
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn init_with_file_writes_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let config = LoggingConfig {
            filter: "info".to_string(),
            file: Some(path.clone()),
        };
        let guard = init_tracing(&config);
        assert!(guard.is_some());
        // second install is a no-op, not a panic
        let _ = init_tracing(&LoggingConfig::default());
        drop(guard);
        assert!(path.exists());
    }

    #[test]
    fn unwritable_log_file_falls_back_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file cannot be used as the log directory
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let path = blocker.join("app.log");

        assert!(file_appender(&path).is_err());

        let config = LoggingConfig {
            filter: "info".to_string(),
            file: Some(path.clone()),
        };
        assert!(init_tracing(&config).is_none());
        assert!(!path.exists());
    }
}
