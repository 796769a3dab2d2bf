//! Config - 起動時に 1 回だけ読む設定
//!
//! グローバル状態は持たず、`PlannerConfig` を各コンストラクタに明示的に渡す。
//! ファイルが無い・テーブルが欠けている場合はデフォルト値で埋める。
//!
//! ウィンドウ位置（`{x, y}` の JSON）もここで扱う。タスクのドメインとは無関係な副ファイル。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// トレイアイコン画像。コアでは使わず、UI 側に渡すだけ。
    pub icon_path: PathBuf,
    pub window_config_path: PathBuf,
    pub storage: StorageConfig,
    pub reminder: ReminderConfig,
    pub notification: NotificationConfig,
    pub logging: LoggingConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            icon_path: PathBuf::from("icon.png"),
            window_config_path: PathBuf::from("window_config.json"),
            storage: StorageConfig::default(),
            reminder: ReminderConfig::default(),
            notification: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_toml_str(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    /// 接続時の busy timeout（秒）
    pub connect_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("planner.db"),
            connect_timeout_secs: 10,
        }
    }
}

impl StorageConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub tick_interval_secs: u64,
    /// true なら同じ (name, date, time) は 1 プロセスで 1 回しか通知しない
    pub dedupe: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 20,
            dedupe: true,
        }
    }
}

impl ReminderConfig {
    pub fn tick_interval(&self) -> Duration {
        // interval(0) は panic するので 1 秒を下限にする
        Duration::from_secs(self.tick_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub title: String,
    pub source_label: String,
    pub timeout_secs: u64,
    /// true: notify-send でデスクトップ通知 / false: ログに出すだけ
    pub desktop: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Reminder".to_string(),
            source_label: "Daily Planner".to_string(),
            timeout_secs: 10,
            desktop: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive. `RUST_LOG` が設定されていればそちらが優先。
    pub filter: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file: None,
        }
    }
}

/// メインウィンドウの位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

impl Default for WindowPosition {
    fn default() -> Self {
        Self { x: 100, y: 100 }
    }
}

impl WindowPosition {
    /// Missing file -> `{x: 100, y: 100}`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json =
            serde_json::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlannerConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.reminder.tick_interval(), Duration::from_secs(20));
        assert_eq!(config.storage.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = PlannerConfig::from_toml_str(
            r#"
            icon_path = "assets/planner.png"

            [storage]
            database_path = "/var/lib/planner/tasks.db"

            [reminder]
            dedupe = false

            [logging]
            file = "app.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.icon_path, PathBuf::from("assets/planner.png"));
        assert_eq!(
            config.storage.database_path,
            PathBuf::from("/var/lib/planner/tasks.db")
        );
        assert_eq!(config.storage.connect_timeout_secs, 10);
        assert!(!config.reminder.dedupe);
        assert_eq!(config.reminder.tick_interval_secs, 20);
        assert_eq!(config.notification.title, "Reminder");
        assert_eq!(config.logging.file, Some(PathBuf::from("app.log")));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.toml");
        std::fs::write(&path, "[storage]\nconnect_timeout_secs = \"soon\"\n").unwrap();

        let err = PlannerConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn config_survives_toml_round_trip() {
        let mut config = PlannerConfig::default();
        config.logging.file = Some(PathBuf::from("app.log"));
        let text = config.to_toml_string().unwrap();
        assert_eq!(PlannerConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn zero_tick_interval_is_clamped() {
        let reminder = ReminderConfig {
            tick_interval_secs: 0,
            dedupe: true,
        };
        assert_eq!(reminder.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn window_position_defaults_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window_config.json");

        assert_eq!(WindowPosition::load(&path).unwrap(), WindowPosition { x: 100, y: 100 });

        WindowPosition { x: 640, y: -20 }.save(&path).unwrap();
        assert_eq!(WindowPosition::load(&path).unwrap(), WindowPosition { x: 640, y: -20 });

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"x": 640, "y": -20}));
    }
}
