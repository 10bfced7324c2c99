//! CLI-specific error types and exit code mapping

use composegenie_catalog::CatalogError;
use composegenie_core::error::{ComposeGenieError, ConfigError};
use composegenie_security::SecurityError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file write, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The selection could not be written to its backing store.
    #[error("selection not saved: {0}")]
    Storage(String),

    /// Catalog dataset could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Scan, validation or usage fixtures could not be loaded.
    #[error("security error: {0}")]
    Security(#[from] SecurityError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                  |
    /// |------|--------------------------|
    /// | 0    | Success                  |
    /// | 1    | General / command error  |
    /// | 2    | Configuration error      |
    /// | 10   | IO or selection write error |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) | Self::Storage(_) => 10,
            Self::Catalog(CatalogError::Io { .. }) => 10,
            Self::Command(_) | Self::JsonSerialize(_) | Self::Catalog(_) | Self::Security(_) => 1,
        }
    }
}

impl From<ComposeGenieError> for CliError {
    fn from(e: ComposeGenieError) -> Self {
        match e {
            ComposeGenieError::Config(err) => Self::Config(err.to_string()),
            ComposeGenieError::Io(err) => Self::Io(err),
            other => Self::Command(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
