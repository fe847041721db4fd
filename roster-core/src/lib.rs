//! Roster Core - Business logic for the user roster service
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (User, Age) and the error type
//! - **ports**: Trait definitions for external dependencies (UserRepository)
//! - **services**: Business logic orchestration (users, CSV import, stats)
//! - **adapters**: Concrete implementations (in-memory store, HTTP)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod services;

use std::sync::Arc;

use adapters::memory::InMemoryRepository;
use config::Config;
use ports::UserRepository;
use services::{ImportService, StatsService, UserService};

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{Age, NewUser, User};

/// Main context for Roster operations
///
/// Holds the configuration, the record store, and every service built on
/// top of it. All services share the same store.
pub struct RosterContext {
    pub config: Config,
    pub repository: Arc<InMemoryRepository>,
    pub user_service: Arc<UserService>,
    pub import_service: ImportService,
    pub stats_service: StatsService,
}

impl RosterContext {
    /// Create a context with an empty store
    pub fn new(config: Config) -> Self {
        let repository = Arc::new(InMemoryRepository::new());
        let store: Arc<dyn UserRepository> = repository.clone();

        let user_service = Arc::new(UserService::new(Arc::clone(&store)));
        let import_service = ImportService::new(Arc::clone(&user_service));
        let stats_service = StatsService::new(store);

        Self {
            config,
            repository,
            user_service,
            import_service,
            stats_service,
        }
    }

    /// Create a context with default configuration
    pub fn in_memory() -> Self {
        Self::new(Config::default())
    }
}
