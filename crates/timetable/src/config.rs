/// Configuration for the backend client and the CLI
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default backend location used by a local development server.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {name}: {message}")]
    InvalidEnv { name: &'static str, message: String },
}

/// Client configuration.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL all endpoint paths are joined onto
    pub api_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Where the login session is persisted between runs
    pub session_file: PathBuf,
    /// Directory exported documents are written to
    pub export_dir: PathBuf,
    /// How long a fetched timetable snapshot may be reused
    pub snapshot_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            user_agent: concat!("timetable/", env!("CARGO_PKG_VERSION")).to_string(),
            session_file: PathBuf::from(".timetable-session.json"),
            export_dir: PathBuf::from("."),
            snapshot_ttl_secs: 5 * 60,
        }
    }
}

impl ClientConfig {
    /// Loads a JSON config file.
    ///
    /// # Arguments
    /// * `path` - Path to the config file
    ///
    /// # Returns
    /// * `Ok(ClientConfig)` - Parsed configuration, defaults for absent keys
    /// * `Err` - If the file can't be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the configuration the CLI runs with: the file named by
    /// `TIMETABLE_CONFIG` if set, otherwise defaults, then environment
    /// overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var_os("TIMETABLE_CONFIG") {
            Some(path) => Self::load_from_file(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies `TIMETABLE_*` overrides looked up through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("TIMETABLE_API_URL") {
            self.api_url = url;
        }
        if let Some(path) = lookup("TIMETABLE_SESSION_FILE") {
            self.session_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("TIMETABLE_EXPORT_DIR") {
            self.export_dir = PathBuf::from(path);
        }
        if let Some(ttl) = lookup("TIMETABLE_SNAPSHOT_TTL_SECS") {
            self.snapshot_ttl_secs = ttl.parse().map_err(|e| ConfigError::InvalidEnv {
                name: "TIMETABLE_SNAPSHOT_TTL_SECS",
                message: format!("{e}"),
            })?;
        }
        Ok(self)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn snapshot_ttl(&self) -> Duration {
        Duration::from_secs(self.snapshot_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_url": "https://tt.college.edu/api", "snapshot_ttl_secs": 30}}"#)
            .unwrap();

        let config = ClientConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.api_url, "https://tt.college.edu/api");
        assert_eq!(config.snapshot_ttl(), Duration::from_secs(30));
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ClientConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TIMETABLE_API_URL", "http://10.0.0.5:8080/api"),
            ("TIMETABLE_EXPORT_DIR", "/tmp/exports"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::default()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_url, "http://10.0.0.5:8080/api");
        assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.session_file, PathBuf::from(".timetable-session.json"));
    }

    #[test]
    fn test_bad_ttl_override() {
        let err = ClientConfig::default()
            .with_overrides(|name| {
                (name == "TIMETABLE_SNAPSHOT_TTL_SECS").then(|| "soon".to_string())
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }
}
