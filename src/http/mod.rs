//! REST API layer (feature `http-server`).

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, AppError, ApiResult};
pub use router::build_router;
pub use state::AppState;
