//! CLI command handlers.
//!
//! This module provides headless, scriptable access to the tool's core
//! functionality for automation and testing.

pub mod common;
pub mod doctor;
pub mod export;
pub mod functions;
pub mod headers;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use doctor::DoctorArgs;
pub use export::ExportArgs;
pub use functions::FunctionsArgs;
pub use headers::HeadersArgs;
