//! Transport collaborator interface.
//!
//! The session layer never speaks the SFTP wire protocol itself. It drives an
//! already-authenticated SSH connection through the primitives below, each of
//! which returns immediately: a non-negative count on success,
//! [`LIBSSH2_ERROR_EAGAIN`] when the request could not make progress yet, or
//! any other negative value on failure (details via [`SftpTransport::last_error`]).
//!
//! Implementations wrap a native SSH library session or, for tests, the
//! in-process [`MemoryTransport`](crate::memory::MemoryTransport).

use crate::types::{FileAttributes, FileOpenFlags};
use async_trait::async_trait;
use tether_platform::TetherResult;

/// Sentinel returned by a primitive that would have blocked.
pub const LIBSSH2_ERROR_EAGAIN: i64 = -37;

/// Generic error code for an SFTP-level failure.
pub const LIBSSH2_ERROR_SFTP_PROTOCOL: i64 = -31;

/// What an open call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenKind {
    /// A file handle (SSH_FXP_OPEN)
    File,
    /// A directory handle (SSH_FXP_OPENDIR)
    Directory,
}

/// Operation selected on the link primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Create a symbolic link at `path` pointing at the target buffer contents
    Symlink,
    /// Read the target of the symbolic link at `path`
    ReadLink,
    /// Resolve `path` to its canonical absolute form
    RealPath,
}

/// Operation selected on the stat primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    /// Follow symbolic links
    Stat,
    /// Do not follow symbolic links
    Lstat,
}

/// Non-blocking SFTP primitives supplied by the SSH transport.
///
/// A transport is shared by a session and every handle it opens, but it is
/// not required to support concurrent calls: the session layer issues them
/// strictly one at a time.
#[async_trait]
pub trait SftpTransport: Send + Sync {
    /// Protocol session resource (one per connection).
    type Sftp: Send + Sync;
    /// Open remote file or directory descriptor.
    type Handle: Send;

    /// Starts the SFTP subsystem. `None` means it could not be started.
    fn sftp_init(&self) -> Option<Self::Sftp>;

    /// Shuts the SFTP subsystem down.
    fn sftp_shutdown(&self, sftp: &mut Self::Sftp) -> i64;

    /// Opens `path`. `None` means no handle could be produced.
    fn open(
        &self,
        sftp: &Self::Sftp,
        path: &[u8],
        flags: FileOpenFlags,
        mode: u32,
        kind: OpenKind,
    ) -> Option<Self::Handle>;

    /// Reads up to `buf.len()` bytes. Zero means end of file.
    fn read(&self, handle: &mut Self::Handle, buf: &mut [u8]) -> i64;

    /// Writes a prefix of `data`, returning how many bytes were accepted.
    fn write(&self, handle: &mut Self::Handle, data: &[u8]) -> i64;

    /// Reads the next directory entry name into `buf` and its attributes into
    /// `attrs`. Zero means the listing is exhausted.
    fn readdir(
        &self,
        handle: &mut Self::Handle,
        buf: &mut [u8],
        attrs: &mut FileAttributes,
    ) -> i64;

    /// Closes a handle.
    fn close(&self, handle: &mut Self::Handle) -> i64;

    /// Symlink, readlink or realpath on `path`.
    ///
    /// For [`LinkKind::Symlink`] `target` holds the link target. Otherwise the
    /// resolved path is copied into `target`, truncated to its length, and
    /// the number of bytes copied is returned.
    fn link(&self, sftp: &Self::Sftp, path: &[u8], target: &mut [u8], kind: LinkKind) -> i64;

    /// Creates a directory.
    fn mkdir(&self, sftp: &Self::Sftp, path: &[u8], mode: u32) -> i64;

    /// Stats `path` into `attrs`.
    fn stat(
        &self,
        sftp: &Self::Sftp,
        path: &[u8],
        kind: StatKind,
        attrs: &mut FileAttributes,
    ) -> i64;

    /// Most recent error reported by the connection, if any.
    fn last_error(&self) -> Option<(i32, String)>;

    /// Resolves once the connection may be able to make progress again.
    ///
    /// Called after a primitive returned [`LIBSSH2_ERROR_EAGAIN`].
    async fn wait_ready(&self) -> TetherResult<()>;
}
