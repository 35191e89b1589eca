//! Application configuration. Storage backend, paths, display language.

use crate::domain::{DomainError, Language};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Number of completed screenings listed on the dashboard when unset.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Where children and screenings are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// libsql database file `toto.db` in the data directory.
    #[default]
    Sqlite,
    /// Single JSON document `store.json` in the data directory.
    Json,
    /// Nothing is written to disk.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "libsql" => Ok(StoreBackend::Sqlite),
            "json" => Ok(StoreBackend::Json),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(DomainError::InvalidValue {
                field: "store",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Read from TOTO_DATA_DIR. Defaults to ./data.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// sqlite | json | memory. Read from TOTO_STORE.
    #[serde(default)]
    pub store: Option<String>,

    /// en | sw. Read from TOTO_LANGUAGE.
    #[serde(default)]
    pub language: Option<String>,

    /// Dashboard recent list length. Read from TOTO_RECENT_LIMIT.
    #[serde(default)]
    pub recent_limit: Option<usize>,
}

impl AppConfig {
    /// Environment (prefix TOTO_) plus an optional file named by TOTO_CONFIG.
    pub fn load() -> Result<Self, DomainError> {
        dotenv::dotenv().ok();
        let file = std::env::var("TOTO_CONFIG").ok();
        Self::from_sources(file.as_deref())
    }

    /// Optional config file, then the TOTO_ environment on top.
    pub fn from_sources(file: Option<&str>) -> Result<Self, DomainError> {
        let mut c = config::Config::builder();
        if let Some(path) = file {
            c = c.add_source(config::File::with_name(path));
        }
        // environment wins over the file
        c = c.add_source(config::Environment::with_prefix("TOTO").try_parsing(true));
        c.build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| DomainError::Config(e.to_string()))
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    pub fn store_backend(&self) -> Result<StoreBackend, DomainError> {
        match self.store.as_deref() {
            Some(s) => s.parse(),
            None => Ok(StoreBackend::default()),
        }
    }

    pub fn language(&self) -> Result<Language, DomainError> {
        match self.language.as_deref() {
            Some(s) => s.parse(),
            None => Ok(Language::default()),
        }
    }

    pub fn recent_limit_or_default(&self) -> usize {
        self.recent_limit.unwrap_or(DEFAULT_RECENT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_dir_or_default(), PathBuf::from("./data"));
        assert_eq!(cfg.store_backend().unwrap(), StoreBackend::Sqlite);
        assert_eq!(cfg.language().unwrap(), Language::En);
        assert_eq!(cfg.recent_limit_or_default(), 5);
    }

    #[test]
    fn test_parsed_values() {
        let cfg = AppConfig {
            data_dir: Some("/var/lib/toto".into()),
            store: Some(" JSON ".into()),
            language: Some("Kiswahili".into()),
            recent_limit: Some(10),
        };
        assert_eq!(cfg.store_backend().unwrap(), StoreBackend::Json);
        assert_eq!(cfg.language().unwrap(), Language::Sw);
        assert_eq!(cfg.recent_limit_or_default(), 10);
    }

    #[test]
    fn test_unknown_store_is_rejected() {
        let cfg = AppConfig {
            store: Some("postgres".into()),
            ..Default::default()
        };
        assert!(matches!(
            cfg.store_backend(),
            Err(DomainError::InvalidValue { field: "store", .. })
        ));
    }

    #[test]
    fn test_config_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toto.toml");
        std::fs::write(&path, "store = \"memory\"\nrecent_limit = 3\n").unwrap();
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.store_backend().unwrap(), StoreBackend::Memory);
        assert_eq!(cfg.recent_limit_or_default(), 3);
    }

    #[test]
    fn test_bad_config_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toto.toml");
        std::fs::write(&path, "recent_limit = \"lots\"\n").unwrap();
        let path = path.to_string_lossy().into_owned();
        assert!(matches!(
            AppConfig::from_sources(Some(&path)),
            Err(DomainError::Config(_))
        ));

        let missing = dir.path().join("absent.toml").to_string_lossy().into_owned();
        assert!(matches!(
            AppConfig::from_sources(Some(&missing)),
            Err(DomainError::Config(_))
        ));
    }
}
