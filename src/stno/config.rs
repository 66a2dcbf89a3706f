use crate::error::{Result, StnoError};
use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_NOTEBOOK: &str = "default";

/// Keys accepted by `get`/`set`, in display order.
pub const CONFIG_KEYS: &[&str] = &[
    "default-notebook",
    "entry-template",
    "entry-id-template",
    "editor",
    "query-workers",
];

/// Configuration for stno, stored in `<root>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StnoConfig {
    /// Notebook used when `--notebook` is not given
    #[serde(default = "default_notebook")]
    pub default_notebook: String,

    /// Content template for new entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_template: Option<String>,

    /// Identifier template for new entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id_template: Option<String>,

    /// Editor command, takes precedence over $EDITOR and $VISUAL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Worker threads used by queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_workers: Option<usize>,
}

fn default_notebook() -> String {
    DEFAULT_NOTEBOOK.to_string()
}

impl Default for StnoConfig {
    fn default() -> Self {
        Self {
            default_notebook: default_notebook(),
            entry_template: None,
            entry_id_template: None,
            editor: None,
            query_workers: None,
        }
    }
}

impl StnoConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: StnoConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        fs::create_dir_all(config_dir)?;

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Current value of `key` in display form. Unset optional keys show as
    /// an empty string; unknown keys give `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "default-notebook" => self.default_notebook.clone(),
            "entry-template" => self.entry_template.clone().unwrap_or_default(),
            "entry-id-template" => self.entry_id_template.clone().unwrap_or_default(),
            "editor" => self.editor.clone().unwrap_or_default(),
            "query-workers" => self
                .query_workers
                .map(|n| n.to_string())
                .unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    /// Sets `key`. An empty value clears optional keys. Templates are
    /// compiled before they are accepted.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = || (!value.is_empty()).then(|| value.to_string());
        match key {
            "default-notebook" => {
                if value.is_empty() || value.contains(['/', '\\']) {
                    return Err(StnoError::Api(format!("Invalid notebook name: '{}'", value)));
                }
                self.default_notebook = value.to_string();
            }
            "entry-template" => {
                if !value.is_empty() {
                    Template::compile("entry", value)?;
                }
                self.entry_template = optional();
            }
            "entry-id-template" => {
                if !value.is_empty() {
                    Template::compile("entry_id", value)?;
                }
                self.entry_id_template = optional();
            }
            "editor" => self.editor = optional(),
            "query-workers" => {
                self.query_workers = if value.is_empty() {
                    None
                } else {
                    let n: usize = value.parse().map_err(|_| {
                        StnoError::Api(format!("query-workers must be a positive number, got '{}'", value))
                    })?;
                    if n == 0 {
                        return Err(StnoError::Api("query-workers must be at least 1".to_string()));
                    }
                    Some(n)
                };
            }
            other => return Err(StnoError::Api(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StnoConfig::default();
        assert_eq!(config.default_notebook, "default");
        assert!(config.entry_template.is_none());
        assert!(config.query_workers.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let config = StnoConfig::load(temp.path().join("absent")).unwrap();
        assert_eq!(config, StnoConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let mut config = StnoConfig::default();
        config.set("editor", "nano -w").unwrap();
        config.set("query-workers", "3").unwrap();
        config.save(temp.path()).unwrap();

        let loaded = StnoConfig::load(temp.path()).unwrap();
        assert_eq!(loaded.editor.as_deref(), Some("nano -w"));
        assert_eq!(loaded.query_workers, Some(3));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            r#"{"entry_id_template": "{{ title }}"}"#,
        )
        .unwrap();
        let config = StnoConfig::load(temp.path()).unwrap();
        assert_eq!(config.default_notebook, "default");
        assert_eq!(config.entry_id_template.as_deref(), Some("{{ title }}"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "{ nope").unwrap();
        assert!(matches!(
            StnoConfig::load(temp.path()),
            Err(StnoError::Config(_))
        ));
    }

    #[test]
    fn test_get_known_and_unknown_keys() {
        let config = StnoConfig::default();
        assert_eq!(config.get("default-notebook").as_deref(), Some("default"));
        assert_eq!(config.get("editor").as_deref(), Some(""));
        assert!(config.get("file-ext").is_none());
    }

    #[test]
    fn test_set_validates_templates() {
        let mut config = StnoConfig::default();
        assert!(matches!(
            config.set("entry-id-template", "{{ foo() }}"),
            Err(StnoError::Template(_))
        ));
        assert!(config.entry_id_template.is_none());

        config.set("entry-id-template", "{{ title }}").unwrap();
        assert_eq!(config.entry_id_template.as_deref(), Some("{{ title }}"));

        config.set("entry-id-template", "").unwrap();
        assert!(config.entry_id_template.is_none());
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = StnoConfig::default();
        assert!(config.set("query-workers", "0").is_err());
        assert!(config.set("query-workers", "many").is_err());
        assert!(config.set("default-notebook", "a/b").is_err());
        assert!(config.set("color", "red").is_err());
    }

    #[test]
    fn test_serialization_skips_unset_keys() {
        let json = serde_json::to_string(&StnoConfig::default()).unwrap();
        assert_eq!(json, r#"{"default_notebook":"default"}"#);
    }
}
