//! Application state for the crew pay API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::replacement::{DutyRepository, InMemoryDutyRepository};

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// loaded pay configuration and the duty repository.
#[derive(Clone)]
pub struct AppState {
    /// The loaded pay configuration.
    config: Arc<ConfigLoader>,
    /// Where duties are persisted.
    repository: Arc<dyn DutyRepository>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ConfigLoader, repository: Arc<dyn DutyRepository>) -> Self {
        Self {
            config: Arc::new(config),
            repository,
        }
    }

    /// Creates a state backed by an empty in-memory repository.
    pub fn in_memory(config: ConfigLoader) -> Self {
        Self::new(config, Arc::new(InMemoryDutyRepository::new()))
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the duty repository.
    pub fn repository(&self) -> &dyn DutyRepository {
        self.repository.as_ref()
    }
}
