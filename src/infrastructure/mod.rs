//! Infrastructure layer: boundary traits, their reference implementations and DI container
//!
//! Hosts replace these implementations with their own; the engine only sees the traits.

pub mod di;
pub mod error;
pub mod generators;
pub mod headless;
pub mod memory_store;
pub mod traits;

pub use error::{InfraError, InfraResult, StoreError};
