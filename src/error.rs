use std::path::PathBuf;

use thiserror::Error;

use crate::sync::SyncReport;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads sheet data, talks to the invoicing service, or writes import
/// markers back.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a worksheet does not follow the expected conventions.
    #[error("invalid worksheet structure: {0}")]
    InvalidSheet(String),

    /// Raised when the configuration file cannot be applied.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Raised by invoicing collaborators when a remote call fails.
    #[error("invoicing service error: {0}")]
    Api(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),

    /// A collaborator failure stopped the pass mid-iteration. Carries the
    /// skip report accumulated before the abort; markers already written
    /// stay written.
    #[error("sync pass aborted: {source}")]
    Aborted {
        source: Box<SyncError>,
        report: SyncReport,
    },
}
