//! Application-level errors (wraps domain and store errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::error::StoreError;

/// Application errors wrap domain errors and add orchestration context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// The store refused or failed a mutation. Nothing was changed locally.
    #[error("{operation} failed: {source}")]
    Mutation {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// The tree data source could not supply a tree.
    #[error("tree not available: {message}")]
    LoadFailure { message: String },

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    pub fn mutation(operation: &'static str, source: StoreError) -> Self {
        Self::Mutation { operation, source }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
