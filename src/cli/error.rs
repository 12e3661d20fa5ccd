//! CLI-level errors (wraps application and infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{DomainError, InvalidReorder};
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// A move the resolver refused; nothing was sent to the store
    #[error("move rejected: {0}")]
    Rejected(InvalidReorder),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(e.into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(DomainError::NodeNotFound(_)) => crate::exitcode::USAGE,
        ApplicationError::Domain(_) => crate::exitcode::DATAERR,
        ApplicationError::Mutation { .. } => crate::exitcode::UNAVAILABLE,
        ApplicationError::LoadFailure { .. } => crate::exitcode::NOINPUT,
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Rejected(_) => crate::exitcode::DATAERR,
            CliError::Application(e) => application_exit_code(e),
            CliError::Infra(e) => match e {
                InfraError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                    crate::exitcode::NOINPUT
                }
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Serialization { .. } => crate::exitcode::DATAERR,
                InfraError::Application(e) => application_exit_code(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;
    use crate::infrastructure::StoreError;
    use rstest::rstest;

    #[rstest]
    #[case(CliError::Usage("x".into()), exitcode::USAGE)]
    #[case(CliError::Rejected(InvalidReorder::MoveRoot), exitcode::DATAERR)]
    #[case(DomainError::NodeNotFound("a".into()).into(), exitcode::USAGE)]
    #[case(
        CliError::Application(ApplicationError::mutation("reparent", StoreError::NotLoaded)),
        exitcode::UNAVAILABLE
    )]
    #[case(
        CliError::Infra(InfraError::io("read tree.json", std::io::Error::from(std::io::ErrorKind::NotFound))),
        exitcode::NOINPUT
    )]
    #[case(
        CliError::Infra(InfraError::Application(ApplicationError::Config { message: "bad".into() })),
        exitcode::CONFIG
    )]
    fn given_error_when_mapping_then_returns_sysexits_code(#[case] error: CliError, #[case] expected: i32) {
        assert_eq!(error.exit_code(), expected);
    }
}
