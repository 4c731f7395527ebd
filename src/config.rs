// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};
use tracing::debug;

use crate::parse::ColumnLabels;

pub const ENV_API_URL: &str = "ENROLLSYNC_API_URL";
pub const ENV_API_TOKEN: &str = "ENROLLSYNC_API_TOKEN";

/// Backend API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub token: Option<String>,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/".to_string(),
            token: None,
            max_retries: 3,
            backoff_ms: 500,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Rows resolved at once. Results are still applied in row order.
    pub concurrency: usize,
    /// Codes listed per diagnostic bucket in the summary.
    pub sample_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            sample_size: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub columns: ColumnLabels,
    pub import: ImportConfig,
}

impl Config {
    /// Read a YAML config file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        let cfg: Config =
            serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", path))?;
        debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Defaults, or the file at `path` when given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| env::var(key).ok());
        Ok(cfg)
    }

    /// Apply `ENROLLSYNC_*` overrides from a variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.api.token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(
            tmp,
            "api:\n  base_url: https://catalog.example.edu/api/\n  max_retries: 5\ncolumns:\n  grade: Grade\n"
        )?;

        let cfg = Config::from_file(tmp.path())?;
        assert_eq!(cfg.api.base_url, "https://catalog.example.edu/api/");
        assert_eq!(cfg.api.max_retries, 5);
        assert_eq!(cfg.api.backoff_ms, 500);
        assert_eq!(cfg.columns.grade, "Grade");
        assert_eq!(cfg.columns.term, "이수학기");
        assert_eq!(cfg.import, ImportConfig::default());
        Ok(())
    }

    #[test]
    fn env_overrides() {
        let mut cfg = Config::default();
        cfg.apply_env(|key| match key {
            ENV_API_URL => Some("https://other.example/".to_string()),
            ENV_API_TOKEN => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(cfg.api.base_url, "https://other.example/");
        assert_eq!(cfg.api.token, None);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::from_file("/definitely/not/here.yaml").is_err());
    }
}
