//! Shared CLI plumbing: error type, exit codes, board resolution.

use crate::board::Board;
use std::fmt;

/// Process exit codes used by the headless commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Bad arguments or configuration
    ValidationError = 2,
    /// I/O or subprocess failure
    IoError = 3,
}

/// A CLI failure with an associated exit code.
#[derive(Debug)]
pub enum CliError {
    /// Bad arguments or configuration
    Validation(String),
    /// I/O or subprocess failure
    Io(String),
}

impl CliError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// The process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Validation(_) => ExitCode::ValidationError,
            Self::Io(_) => ExitCode::IoError,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) | Self::Io(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Result alias for CLI command execution.
pub type CliResult<T> = Result<T, CliError>;

/// Resolves the target board: an explicit `--board` override, or detection
/// from the running system.
pub fn resolve_board(board_override: Option<&str>) -> CliResult<Board> {
    match board_override {
        Some(model) => {
            Board::from_model(model).map_err(|e| CliError::validation(format!("{e:#}")))
        }
        None => Board::detect().map_err(|e| CliError::io(format!("{e:#}"))),
    }
}
