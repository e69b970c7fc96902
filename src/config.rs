//! Configuration
//!
//! Dashboard settings with built-in defaults, overridable from the process
//! environment. The binary loads `./.env` or the file named by `--env-file`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;

pub const BASE_URL_VAR: &str = "TRENDBOARD_BASE_URL";
pub const COUNTRY_VAR: &str = "TRENDBOARD_COUNTRY";
pub const DEBOUNCE_VAR: &str = "TRENDBOARD_DEBOUNCE_MS";
pub const PIXEL_RATIO_VAR: &str = "TRENDBOARD_PIXEL_RATIO";
pub const LOG_DIR_VAR: &str = "TRENDBOARD_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Row limits per endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub top: u32,
    pub trending: u32,
    pub search: u32,
    pub channels: u32,
    pub tags: u32,
    pub tag_videos: u32,
    pub channel_detail: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            top: 20,
            trending: 200,
            search: 20,
            channels: 20,
            tags: 50,
            tag_videos: 20,
            channel_detail: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Directory the rolling log file is written to.
    pub directory: PathBuf,
    pub file_prefix: String,
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            file_prefix: "trendboard.log".to_string(),
            default_filter: "trendboard=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub base_url: String,
    /// Country passed to the video detail endpoint.
    pub country: String,
    pub debounce: Duration,
    pub min_query_len: usize,
    pub limits: Limits,
    pub pixel_ratio: f64,
    pub log: LogConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            country: "United States".to_string(),
            debounce: Duration::from_millis(300),
            min_query_len: 2,
            limits: Limits::default(),
            pixel_ratio: 1.0,
            log: LogConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by whatever `TRENDBOARD_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load `path` into the process environment, then read as
    /// [`from_env`](Self::from_env). Variables already set win over the file.
    pub fn from_env_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        dotenv::from_path(path).with_context(|| format!("loading {}", path.display()))?;
        Ok(Self::from_env()?)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(country) = lookup(COUNTRY_VAR).filter(|v| !v.trim().is_empty()) {
            config.country = country.trim().to_string();
        }
        if let Some(raw) = lookup(DEBOUNCE_VAR) {
            let ms: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: DEBOUNCE_VAR,
                expected: "a whole number of milliseconds",
                value: raw.clone(),
            })?;
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup(PIXEL_RATIO_VAR) {
            config.pixel_ratio = match raw.trim().parse::<f64>() {
                Ok(ratio) if ratio.is_finite() && ratio > 0.0 => ratio,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: PIXEL_RATIO_VAR,
                        expected: "a positive number",
                        value: raw,
                    })
                }
            };
        }
        if let Some(dir) = lookup(LOG_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            config.log.directory = PathBuf::from(dir.trim());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.min_query_len, 2);
        assert_eq!(config.limits.trending, 200);
        assert_eq!(config.limits.tags, 50);
        assert_eq!(config.country, "United States");
    }

    #[test]
    fn test_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "http://stats.local:8080"),
            (DEBOUNCE_VAR, "150"),
            (PIXEL_RATIO_VAR, "2"),
            (LOG_DIR_VAR, "/tmp/tb"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://stats.local:8080");
        assert_eq!(config.debounce, Duration::from_millis(150));
        assert_eq!(config.pixel_ratio, 2.0);
        assert_eq!(config.log.directory, PathBuf::from("/tmp/tb"));
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = DashboardConfig::from_lookup(lookup(&[(DEBOUNCE_VAR, "soon")])).unwrap_err();
        assert!(err.to_string().starts_with(DEBOUNCE_VAR));

        let err = DashboardConfig::from_lookup(lookup(&[(PIXEL_RATIO_VAR, "-1")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: PIXEL_RATIO_VAR,
                expected: "a positive number",
                value: "-1".into()
            }
        );
    }

    #[test]
    fn test_from_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "TRENDBOARD_BASE_URL=http://10.0.0.2:5000").unwrap();
        writeln!(file, "TRENDBOARD_COUNTRY=Canada").unwrap();
        file.flush().unwrap();

        let config = DashboardConfig::from_env_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.country, "Canada");
        assert_eq!(config.debounce, Duration::from_millis(300));
    }

    #[test]
    fn test_missing_env_file_names_the_path() {
        let err = DashboardConfig::from_env_file("/nonexistent/trendboard.env").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/trendboard.env"));
    }
}
