//! Structured logging for SFTP operations
//!
//! Events carry key/value fields through the `tracing` framework.
//!
//! # Log Levels
//!
//! - **TRACE**: Would-block retries
//! - **DEBUG**: Handle and protocol session lifecycle
//! - **INFO**: Transfer start and completion
//! - **WARN**: Resources that could not be released cleanly
//!
//! # Example
//!
//! ```no_run
//! tracing_subscriber::fmt()
//!     .with_env_filter("tether_sftp=debug")
//!     .init();
//! ```

use crate::transport::OpenKind;
use tracing::{debug, info, trace, warn};

/// Log a transfer or listing starting
///
/// # Arguments
///
/// * `operation` - "upload", "download" or "ls"
/// * `path` - Remote path
pub fn log_operation_start(operation: &str, path: &str) {
    info!(operation = operation, path = path, "SFTP operation started");
}

/// Log a completed transfer
///
/// # Arguments
///
/// * `operation` - "upload" or "download"
/// * `path` - Remote path
/// * `bytes` - Bytes moved
pub fn log_transfer_complete(operation: &str, path: &str, bytes: u64) {
    info!(
        operation = operation,
        path = path,
        bytes = bytes,
        "SFTP transfer completed"
    );
}

/// Log a handle being opened
pub fn log_handle_opened(path: &str, kind: OpenKind) {
    debug!(path = path, kind = ?kind, "Remote handle opened");
}

/// Log a handle being closed
///
/// # Arguments
///
/// * `path` - Remote path of the handle
/// * `clean` - Whether the transport acknowledged the close
pub fn log_handle_closed(path: &str, clean: bool) {
    if clean {
        debug!(path = path, "Remote handle closed");
    } else {
        warn!(path = path, "Remote handle could not be closed cleanly");
    }
}

/// Log a protocol session starting
pub fn log_session_started() {
    debug!("SFTP protocol session started");
}

/// Log a protocol session shutting down
pub fn log_session_shutdown(clean: bool) {
    if clean {
        debug!("SFTP protocol session shut down");
    } else {
        warn!("SFTP protocol session could not be shut down cleanly");
    }
}

/// Log a would-block result before waiting for readiness
pub fn log_would_block(operation: &str) {
    trace!(operation = operation, "Transport would block; waiting for readiness");
}
