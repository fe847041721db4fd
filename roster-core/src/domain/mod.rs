//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external dependencies.

mod user;
pub mod result;

pub use user::{Age, NewUser, User};
