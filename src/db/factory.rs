//! Repository construction.
//!
//! The factory is the only place that knows about concrete backends; the
//! rest of the crate works with `Arc<dyn FullRepository>` handed in through
//! application state.

use std::str::FromStr;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Supported repository backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    Local,
    Postgres,
}

impl FromStr for RepositoryType {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "memory" => Ok(RepositoryType::Local),
            "postgres" | "postgresql" => Ok(RepositoryType::Postgres),
            other => Err(RepositoryError::configuration(format!(
                "Unknown repository type '{}' (expected 'local' or 'postgres')",
                other
            ))),
        }
    }
}

impl RepositoryType {
    /// Read the backend from `REPOSITORY_TYPE`, defaulting to local.
    pub fn from_env() -> RepositoryResult<Self> {
        match std::env::var("REPOSITORY_TYPE") {
            Ok(value) => value.parse(),
            Err(_) => Ok(RepositoryType::Local),
        }
    }
}

/// Builds repositories from configuration.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create the backend named by the config.
    pub fn create(config: &AppConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type: RepositoryType = config.repository.repository_type.parse()?;
        match repo_type {
            RepositoryType::Local => Self::create_local(),
            RepositoryType::Postgres => Self::create_postgres(config),
        }
    }

    /// Create the backend from environment variables only.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let mut config = AppConfig::default();
        config.repository.repository_type = match RepositoryType::from_env()? {
            RepositoryType::Local => "local".to_string(),
            RepositoryType::Postgres => "postgres".to_string(),
        };
        config.postgres = crate::config::PostgresConfig::from_env();
        Self::create(&config)
    }

    /// Create the backend from a config file path.
    pub fn from_config_file(path: &str) -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = AppConfig::from_file(path)
            .map_err(|e| RepositoryError::configuration(e.to_string()))?;
        Self::create(&config)
    }

    /// Create the backend from the default config search locations.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn FullRepository>> {
        let config = AppConfig::from_default_location()
            .map_err(|e| RepositoryError::configuration(e.to_string()))?;
        Self::create(&config)
    }

    #[cfg(feature = "local-repo")]
    pub fn create_local() -> RepositoryResult<Arc<dyn FullRepository>> {
        log::info!("Creating local in-memory repository");
        Ok(Arc::new(crate::db::repositories::LocalRepository::new()))
    }

    #[cfg(not(feature = "local-repo"))]
    pub fn create_local() -> RepositoryResult<Arc<dyn FullRepository>> {
        Err(RepositoryError::configuration(
            "Local repository support was not compiled in (enable the 'local-repo' feature)",
        ))
    }

    #[cfg(feature = "postgres-repo")]
    pub fn create_postgres(config: &AppConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        log::info!("Creating Postgres repository");
        let repo = crate::db::repositories::PostgresRepository::new(&config.postgres)?;
        Ok(Arc::new(repo))
    }

    #[cfg(not(feature = "postgres-repo"))]
    pub fn create_postgres(_config: &AppConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        Err(RepositoryError::configuration(
            "Postgres support was not compiled in (enable the 'postgres-repo' feature)",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repository_type_names() {
        assert_eq!("local".parse::<RepositoryType>().unwrap(), RepositoryType::Local);
        assert_eq!(
            "PostgreSQL".parse::<RepositoryType>().unwrap(),
            RepositoryType::Postgres
        );
        assert!("mongodb".parse::<RepositoryType>().is_err());
    }

    #[cfg(feature = "local-repo")]
    #[test]
    fn creates_local_repository_from_default_config() {
        let config = AppConfig::default();
        assert!(RepositoryFactory::create(&config).is_ok());
    }
}
