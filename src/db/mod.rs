//! Storage layer: repository traits, backends, factory and services.
//!
//! Repositories are injected explicitly (handlers receive an
//! `Arc<dyn FullRepository>` through application state); there is no ambient
//! global connection.

#[cfg(not(any(feature = "local-repo", feature = "postgres-repo")))]
compile_error!("At least one repository backend feature must be enabled: 'local-repo' or 'postgres-repo'");

pub mod factory;
pub mod repositories;
pub mod repository;
pub mod services;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repository::{
    ErrorContext, FullRepository, PropertyRepository, RepositoryError, RepositoryResult,
    TourRepository,
};

#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
