//! Adapter implementations
//!
//! Adapters connect the core to concrete technologies:
//! - In-memory hash map for the UserRepository port
//! - axum for the HTTP surface

pub mod http;
pub mod memory;
