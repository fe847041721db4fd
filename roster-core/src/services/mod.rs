//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case.

pub mod import;
mod stats;
mod user;

pub use import::{ImportOptions, ImportResult, ImportService, RowOutcome, SkipReason};
pub use stats::{AverageAgeReport, StatsService};
pub use user::UserService;
