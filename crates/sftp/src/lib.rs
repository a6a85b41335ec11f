//! Client-side SFTP session layer.
//!
//! This crate sits on top of an already-connected, already-authenticated SSH
//! transport and provides file and directory operations over it:
//!
//! - **Transport** ([`transport`]) - the non-blocking primitives a transport supplies
//! - **Outcomes** ([`outcome`]) - raw result codes mapped to tagged outcomes
//! - **Handles** ([`handle`]) - remote file/directory descriptors with a reusable buffer
//! - **Session** ([`session`]) - path-level requests and the retry loop
//! - **Transfers** ([`transfer`]) - `ls`, chunked download and upload
//!
//! Wire encoding, key exchange and authentication belong to the transport.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tether_sftp::memory::MemoryTransport;
//! use tether_sftp::SftpSession;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(MemoryTransport::new());
//! let mut sftp = SftpSession::new(transport)?;
//!
//! sftp.mkdir("/remote", None).await?;
//! sftp.upload_bytes(b"payload", "/remote/file.bin", None).await?;
//!
//! let entries = sftp.ls("/remote").await?;
//! assert!(entries.contains_key("file.bin"));
//!
//! let data = sftp.read("/remote/file.bin").await?;
//! assert_eq!(data, b"payload");
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - [SFTP Draft v3](https://datatracker.ietf.org/doc/html/draft-ietf-secsh-filexfer-02)

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod config;
pub mod handle;
pub mod logging;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod outcome;
pub mod session;
pub mod transfer;
pub mod transport;
pub mod types;

pub use config::{SftpConfig, SftpConfigBuilder};
pub use handle::{RemoteHandle, HANDLE_BUFFER_SIZE};
pub use outcome::{
    process_read, process_status, process_write, Attempt, ReadOutcome, WriteOutcome,
};
pub use session::{SftpSession, LINK_BUFFER_SIZE};
pub use tether_platform::{ErrorKind, TetherError, TetherResult};
pub use transport::{LinkKind, OpenKind, SftpTransport, StatKind, LIBSSH2_ERROR_EAGAIN};
pub use types::{FileAttributes, FileMode, FileOpenFlags, FileType, SftpErrorCode};
