use std::path::PathBuf;
use thiserror::Error;

/// Every way installing from a tool manifest can fail.
///
/// Errors coming back from a delegate installer are passed through as-is,
/// so a caller may see any variant from a nested install.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The caller supplied a structurally invalid value.
    #[error("invalid argument '{param}': {message}")]
    Argument {
        param: &'static str,
        message: String,
    },
    /// A referenced file does not exist.
    #[error("file '{}' does not exist", .path.display())]
    NotFound { path: PathBuf },
    /// The manifest could not be parsed or has an unsupported shape/version.
    #[error("invalid tool manifest at '{}': {message}", .path.display())]
    InvalidManifest {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
    /// An installer was asked to handle a package type or scheme it does not support.
    #[error("{0}")]
    InvalidOperation(String),
    /// Reading a file or starting a process failed.
    #[error("I/O error on '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A package install performed by an external tool failed.
    #[error("failed to install '{reference}': {message}")]
    Package { reference: String, message: String },
}

impl InstallError {
    pub(crate) fn argument(param: &'static str, message: impl Into<String>) -> Self {
        InstallError::Argument {
            param,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        InstallError::InvalidManifest {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }
}
