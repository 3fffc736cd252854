//! Application-wide constants.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Expansion Header Tool";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "headerio";

/// Minimum terminal width required by the interactive tool.
pub const MIN_TERM_WIDTH: u16 = 70;

/// Minimum terminal height required by the interactive tool.
pub const MIN_TERM_HEIGHT: u16 = 24;
