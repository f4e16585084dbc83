/// Board configuration.
/// Reads config.json from ~/.config/dragboard/config.json (or platform equivalent).
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::drag::ActivationConstraint;
use crate::persist::{StorageKeys, DEFAULT_COLUMNS_KEY, DEFAULT_TASKS_KEY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    /// Directory of the file-backed key-value store.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_columns_key")]
    pub columns_key: String,
    #[serde(default = "default_tasks_key")]
    pub tasks_key: String,
    #[serde(default = "default_activation_distance")]
    pub activation_distance: f64,
    #[serde(default = "default_task_content")]
    pub default_task_content: String,
    /// Title for new columns; `{n}` becomes the 1-based column number.
    #[serde(default = "default_column_title_template")]
    pub column_title_template: String,
}

fn default_columns_key() -> String {
    DEFAULT_COLUMNS_KEY.to_string()
}

fn default_tasks_key() -> String {
    DEFAULT_TASKS_KEY.to_string()
}

fn default_activation_distance() -> f64 {
    crate::drag::sensor::DEFAULT_ACTIVATION_DISTANCE
}

fn default_task_content() -> String {
    "New Task".to_string()
}

fn default_column_title_template() -> String {
    "New Column {n}".to_string()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            columns_key: default_columns_key(),
            tasks_key: default_tasks_key(),
            activation_distance: default_activation_distance(),
            default_task_content: default_task_content(),
            column_title_template: default_column_title_template(),
        }
    }
}

impl BoardConfig {
    pub fn column_title(&self, n: usize) -> String {
        self.column_title_template.replace("{n}", &n.to_string())
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys {
            columns: self.columns_key.clone(),
            tasks: self.tasks_key.clone(),
        }
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn activation_constraint(&self) -> ActivationConstraint {
        ActivationConstraint {
            distance: self.activation_distance,
        }
    }

    /// Replace values that would break the board with their defaults.
    fn sanitized(mut self) -> Self {
        if !self.activation_distance.is_finite() || self.activation_distance < 0.0 {
            log::warn!(
                "[dragboard.config] Invalid activationDistance {}, using default",
                self.activation_distance
            );
            self.activation_distance = default_activation_distance();
        }
        if self.columns_key.trim().is_empty() {
            self.columns_key = default_columns_key();
        }
        if self.tasks_key.trim().is_empty() {
            self.tasks_key = default_tasks_key();
        }
        if self.columns_key == self.tasks_key {
            log::warn!(
                "[dragboard.config] columnsKey and tasksKey are both {:?}, using defaults",
                self.columns_key
            );
            self.columns_key = default_columns_key();
            self.tasks_key = default_tasks_key();
        }
        self
    }
}

/// Default config path: ~/.config/dragboard/config.json
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dragboard")
        .join("config.json")
}

/// Default data directory: ~/.local/share/dragboard
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dragboard")
}

/// Load config from path. Returns default if file doesn't exist.
pub fn load_config(path: &Path) -> BoardConfig {
    let config = match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("[dragboard.config] Failed to parse config {}: {}", path.display(), e);
            BoardConfig::default()
        }),
        Err(_) => {
            log::info!("[dragboard.config] No config at {}, using defaults", path.display());
            BoardConfig::default()
        }
    };
    config.sanitized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("nope.json"));
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.activation_distance, 2.0);
        assert_eq!(config.storage_keys(), StorageKeys::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"dataDir":"/tmp/board","activationDistance":5}"#).unwrap();

        let config = load_config(&path);
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/tmp/board"));
        assert_eq!(config.activation_constraint().distance, 5.0);
        assert_eq!(config.default_task_content, "New Task");
        assert_eq!(config.columns_key, "kanban_columns");
    }

    #[test]
    fn test_unparsable_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ broken").unwrap();
        assert_eq!(load_config(&path), BoardConfig::default());
    }

    #[test]
    fn test_invalid_values_are_sanitized() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{"activationDistance":-1,"columnsKey":"same","tasksKey":"same"}"#,
        )
        .unwrap();
        let config = load_config(&path);
        assert_eq!(config.activation_distance, 2.0);
        assert_eq!(config.storage_keys(), StorageKeys::default());
    }

    #[test]
    fn test_column_title_template() {
        let config = BoardConfig::default();
        assert_eq!(config.column_title(3), "New Column 3");
        let config = BoardConfig {
            column_title_template: "Lane".into(),
            ..Default::default()
        };
        assert_eq!(config.column_title(7), "Lane");
    }
}
