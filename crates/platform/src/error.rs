//! Error types for Tether

use std::fmt;

/// Code reported when the transport has no error of its own to report.
pub const UNKNOWN_ERROR_CODE: i32 = -1;

/// Message reported when the transport has no error of its own to report.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown SFTP error";

/// Coarse classification of a [`TetherError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A remote file or directory handle could not be opened
    OpenFailed,
    /// The transport reported a failure
    TransportIo,
    /// A path or entry name was not valid text
    EncodingFailed,
    /// A local file or writer could not be created, read or written
    LocalResourceFailed,
    /// Invalid configuration
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::OpenFailed => "open failed",
            ErrorKind::TransportIo => "transport I/O",
            ErrorKind::EncodingFailed => "encoding failed",
            ErrorKind::LocalResourceFailed => "local resource failed",
            ErrorKind::Config => "configuration",
        };
        f.write_str(name)
    }
}

/// Unified error type for all Tether operations
#[derive(Debug)]
pub enum TetherError {
    /// The open primitive returned no handle
    OpenFailed {
        /// Remote path that was being opened
        path: String,
        /// Transport error code
        code: i32,
        /// Transport error message
        message: String,
    },

    /// A transport primitive returned a negative result
    Transport {
        /// Transport error code
        code: i32,
        /// Transport error message
        message: String,
    },

    /// Bytes could not be decoded as UTF-8
    Encoding(String),

    /// Local I/O error
    LocalResource(std::io::Error),

    /// Configuration error
    Config(String),
}

impl TetherError {
    /// Builds a transport error, falling back to a generic message when the
    /// transport had nothing to report.
    pub fn transport(reported: Option<(i32, String)>) -> Self {
        let (code, message) = reported
            .unwrap_or_else(|| (UNKNOWN_ERROR_CODE, UNKNOWN_ERROR_MESSAGE.to_string()));
        TetherError::Transport { code, message }
    }

    /// Builds an open error for `path` from the transport's last error.
    pub fn open_failed(path: &str, reported: Option<(i32, String)>) -> Self {
        let (code, message) = reported
            .unwrap_or_else(|| (UNKNOWN_ERROR_CODE, UNKNOWN_ERROR_MESSAGE.to_string()));
        TetherError::OpenFailed {
            path: path.to_string(),
            code,
            message,
        }
    }

    /// Returns the originating kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TetherError::OpenFailed { .. } => ErrorKind::OpenFailed,
            TetherError::Transport { .. } => ErrorKind::TransportIo,
            TetherError::Encoding(_) => ErrorKind::EncodingFailed,
            TetherError::LocalResource(_) => ErrorKind::LocalResourceFailed,
            TetherError::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns the transport error code, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            TetherError::OpenFailed { code, .. } | TetherError::Transport { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }
}

impl fmt::Display for TetherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TetherError::OpenFailed {
                path,
                code,
                message,
            } => write!(f, "Unable to open {}: {} ({})", path, message, code),
            TetherError::Transport { code, message } => {
                write!(f, "Transport error {}: {}", code, message)
            }
            TetherError::Encoding(msg) => write!(f, "Encoding error: {}", msg),
            TetherError::LocalResource(e) => write!(f, "Local I/O error: {}", e),
            TetherError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for TetherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TetherError::LocalResource(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TetherError {
    fn from(err: std::io::Error) -> Self {
        TetherError::LocalResource(err)
    }
}

impl From<std::string::FromUtf8Error> for TetherError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        TetherError::Encoding(err.to_string())
    }
}

impl From<std::str::Utf8Error> for TetherError {
    fn from(err: std::str::Utf8Error) -> Self {
        TetherError::Encoding(err.to_string())
    }
}

/// Result type for Tether operations
pub type TetherResult<T> = Result<T, TetherError>;
