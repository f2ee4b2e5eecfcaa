use crate::storage::is_valid_key;
use crate::store::DEFAULT_STORAGE_KEY;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Namespace key the task list is stored under.
    pub storage_key: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Reads `<dir>/config.yml`, falling back to defaults when it does not exist.
pub fn load_config(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let data = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    let config: Config =
        serde_yaml::from_str(&data).with_context(|| format!("parsing {:?}", path))?;
    if !is_valid_key(&config.storage_key) {
        bail!(
            "invalid storage_key {:?} in {:?}: use letters, digits, '_', '-' or '.', not starting with '.'",
            config.storage_key,
            path
        );
    }
    Ok(config)
}

/// Writes a default `config.yml` unless one is already there. Returns whether
/// a file was written.
pub fn init_config(dir: &Path) -> Result<bool> {
    if dir.join(CONFIG_FILE).exists() {
        return Ok(false);
    }
    save_config(dir, &Config::default())?;
    Ok(true)
}

pub fn save_config(dir: &Path, config: &Config) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    let path = dir.join(CONFIG_FILE);
    let serialized = serde_yaml::to_string(config).context("serializing config")?;
    fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "log_level: debug\n").unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "log_level: [unterminated\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            storage_key: "other".into(),
            log_level: "info".into(),
        };
        save_config(tmp.path(), &config).unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), config);
    }

    #[test]
    fn storage_key_that_cannot_name_a_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        for key in ["my tasks", "../escape", ".hidden", "a/b", "''"] {
            fs::write(
                tmp.path().join(CONFIG_FILE),
                format!("storage_key: {}\n", key),
            )
            .unwrap();
            let err = load_config(tmp.path()).unwrap_err();
            assert!(err.to_string().contains("invalid storage_key"), "{}", key);
        }
    }

    #[test]
    fn init_writes_defaults_once() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(init_config(tmp.path()).unwrap());
        assert_eq!(load_config(tmp.path()).unwrap(), Config::default());

        fs::write(tmp.path().join(CONFIG_FILE), "log_level: debug\n").unwrap();
        assert!(!init_config(tmp.path()).unwrap());
        assert_eq!(load_config(tmp.path()).unwrap().log_level, "debug");
    }
}
