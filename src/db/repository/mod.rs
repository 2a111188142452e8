//! Repository trait definitions.
//!
//! Each entity gets its own trait so backends can be composed or mocked per
//! concern; `FullRepository` is the convenience bound the application layer
//! works against.

pub mod error;
pub mod property;
pub mod tour;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use property::PropertyRepository;
pub use tour::TourRepository;

use async_trait::async_trait;

/// Combined trait for a backend that implements every repository concern.
#[async_trait]
pub trait FullRepository: TourRepository + PropertyRepository + Send + Sync {
    /// Check whether the backing store is reachable and usable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
