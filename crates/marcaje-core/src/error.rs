//! Workspace error type.

use thiserror::Error;

/// Errors across the marcaje subsystems.
#[derive(Debug, Error)]
pub enum MarcajeError {
    /// Configuration problem (missing secret, unreadable file, bad TOML).
    /// The only fatal category — surfaces before any work starts.
    #[error("Config error: {0}")]
    Config(String),

    /// Flag backend unavailable or returned garbage.
    #[error("Flag backend error: {0}")]
    Flags(String),

    /// Holiday calendar source failure.
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// Browser/form automation failure (missing control, dead session).
    #[error("Automation error: {0}")]
    Automation(String),

    /// Outbound notification failure.
    #[error("Notify error: {0}")]
    Notify(String),

    /// Identifier failed the RUT format check.
    #[error("Invalid RUT: {0}")]
    InvalidRut(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MarcajeError>;
