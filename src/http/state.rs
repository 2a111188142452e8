//! Shared application state.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::scheduling::SchedulingPolicy;

/// State handed to every handler: the repository and the scheduling policy.
/// Both are injected at startup; handlers never reach for globals.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    pub policy: Arc<SchedulingPolicy>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, policy: SchedulingPolicy) -> Self {
        Self {
            repository,
            policy: Arc::new(policy),
        }
    }
}
