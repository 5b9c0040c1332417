use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Fallback when neither the environment nor the config file names a backend.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Application configuration.
///
/// The backend URL is resolved in order: `--backend-url` flag (applied by
/// the caller), `ASKR_BACKEND_URL` environment variable, then
/// `~/.askr/config.toml`, then the localhost default.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the question/answer service
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_url: default_backend_url(),
        }
    }
}

impl Config {
    /// Load configuration from `~/.askr/config.toml`, with the environment
    /// taking precedence over the file.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let askr_home = home.join(".askr");
        fs::create_dir_all(&askr_home).context("Failed to create .askr directory")?;

        let mut config = Self::load_from(&askr_home.join("config.toml"))?;

        if let Ok(url) = std::env::var("ASKR_BACKEND_URL") {
            if !url.trim().is_empty() {
                config.backend_url = url;
            }
        }

        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn file_value_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = \"http://chat.internal:9000\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url, "http://chat.internal:9000");
    }

    #[test]
    fn empty_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = [not toml").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
