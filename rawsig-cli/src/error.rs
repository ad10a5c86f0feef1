//! CLI-specific error types and exit code mapping

use rawsig_core::error::RawsigError;
use rawsig_processes::ProcessesError;
use rawsig_tree::TreeError;
use rawsig_validation::{ValidationError, ValidationFailure};

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// A validation assertion failed.
    #[error("{kind}: {0}", kind = .0.kind())]
    Validation(ValidationFailure),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from rawsig-core.
    #[error("{0}")]
    Core(#[from] RawsigError),

    /// Subscriber setup and other internal failures.
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success                               |
    /// | 1    | General / command / stage error       |
    /// | 2    | Configuration error                   |
    /// | 10   | IO error                              |
    /// | 202  | Validation assertion failed           |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Validation(failure) => failure.exit_code(),
            Self::Io(_) => 10,
            Self::Core(RawsigError::Config(_)) => 2,
            Self::Core(RawsigError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Internal(_) => 1,
        }
    }
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::Failed(failure) => Self::Validation(failure),
            ValidationError::Stage(inner) => Self::Core(inner),
            other @ ValidationError::EmptyOutput { .. } => Self::Command(other.to_string()),
        }
    }
}

impl From<ProcessesError> for CliError {
    fn from(e: ProcessesError) -> Self {
        Self::Core(e.into())
    }
}

impl From<TreeError> for CliError {
    fn from(e: TreeError) -> Self {
        Self::Core(e.into())
    }
}
