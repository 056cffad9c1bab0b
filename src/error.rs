//! Error types and handling for deskforge
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Only fatal conditions are modelled here. Recoverable failures (optional
//! services, best-effort branch switches, fast-forward conflicts) are caught
//! at their call sites and reported as warnings instead.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for deskforge operations
#[derive(Error, Diagnostic, Debug)]
pub enum DeskforgeError {
    // Variant selection errors
    #[error("Invalid variant '{value}' (allowed: {allowed})")]
    #[diagnostic(
        code(deskforge::variant::invalid),
        help("Pass one of the allowed values, e.g. --variant BOTH")
    )]
    InvalidVariant { value: String, allowed: String },

    #[error("Invalid choice '{input}': enter a number between 1 and {max}")]
    #[diagnostic(code(deskforge::variant::invalid_choice))]
    InvalidChoice { input: String, max: usize },

    #[error("No variant selected")]
    #[diagnostic(
        code(deskforge::variant::none_selected),
        help("Re-run and pick a desktop stack, or pass --variant A|B|BOTH")
    )]
    NoVariantSelected,

    #[error("Prompt failed: {message}")]
    #[diagnostic(code(deskforge::variant::prompt_failed))]
    PromptFailed { message: String },

    // Environment errors
    #[error("Refusing to provision as root")]
    #[diagnostic(
        code(deskforge::env::root),
        help("Run deskforge as the desktop user; privileged steps use sudo")
    )]
    RunningAsRoot,

    #[error("Could not determine {what} directory")]
    #[diagnostic(code(deskforge::env::no_dir))]
    DirectoryUnavailable { what: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(deskforge::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file {path}: {reason}")]
    #[diagnostic(code(deskforge::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid pattern '{pattern}': {reason}")]
    #[diagnostic(code(deskforge::config::invalid_pattern))]
    InvalidPattern { pattern: String, reason: String },

    // Execution errors
    #[error("Command failed ({status}): {command}")]
    #[diagnostic(code(deskforge::exec::command_failed))]
    CommandFailed { command: String, status: String },

    #[error("Failed to start command '{command}': {reason}")]
    #[diagnostic(
        code(deskforge::exec::spawn_failed),
        help("Check that the program is installed and on PATH")
    )]
    CommandSpawnFailed { command: String, reason: String },

    #[error("Phase '{phase}' failed")]
    #[diagnostic(code(deskforge::phase::failed))]
    PhaseFailed {
        phase: String,
        #[source]
        source: Box<DeskforgeError>,
    },

    // Git errors
    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(deskforge::git::clone_failed),
        help("Check that URL is correct and you have access to repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to fetch into '{path}': {reason}")]
    #[diagnostic(code(deskforge::git::fetch_failed))]
    GitFetchFailed { path: String, reason: String },

    #[error("Failed to switch '{path}' to branch '{branch}': {reason}")]
    #[diagnostic(code(deskforge::git::checkout_failed))]
    GitCheckoutFailed {
        path: String,
        branch: String,
        reason: String,
    },

    #[error("Cannot fast-forward '{path}': {reason}")]
    #[diagnostic(code(deskforge::git::not_fast_forward))]
    GitFastForwardFailed { path: String, reason: String },

    #[error("Failed to open repository at '{path}': {reason}")]
    #[diagnostic(code(deskforge::git::open_failed))]
    GitOpenFailed { path: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(deskforge::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(deskforge::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(deskforge::fs::io_error))]
    IoError { message: String },
}

impl DeskforgeError {
    /// Wrap an error with the phase it escaped from.
    pub fn in_phase(self, phase: &str) -> Self {
        DeskforgeError::PhaseFailed {
            phase: phase.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<std::io::Error> for DeskforgeError {
    fn from(err: std::io::Error) -> Self {
        DeskforgeError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DeskforgeError {
    fn from(err: serde_json::Error) -> Self {
        DeskforgeError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for DeskforgeError {
    fn from(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::OperationCanceled
            | inquire::InquireError::OperationInterrupted => DeskforgeError::NoVariantSelected,
            other => DeskforgeError::PromptFailed {
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, DeskforgeError>;
