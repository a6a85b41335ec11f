//! SFTP session.
//!
//! [`SftpSession`] owns the protocol session started on a shared transport.
//! Path-level requests (stat, mkdir, symlink resolution) go straight to the
//! transport; file and directory operations open a [`RemoteHandle`] and are
//! implemented in [`transfer`](crate::transfer).
//!
//! Every operation runs the same loop: make one attempt, wait for transport
//! readiness on would-block and try again, stop on success or failure. There
//! is no retry cap and no timeout.

use crate::config::SftpConfig;
use crate::handle::RemoteHandle;
use crate::logging;
use crate::outcome::{process_status, Attempt};
use crate::transport::{LinkKind, OpenKind, SftpTransport, StatKind};
use crate::types::{FileAttributes, FileOpenFlags};
use std::sync::Arc;
use tether_platform::{TetherError, TetherResult};

/// Size of the buffer realpath and readlink resolve into.
///
/// Longer results are truncated by the transport.
pub const LINK_BUFFER_SIZE: usize = 1024;

/// Drives `attempt` until it produces a terminal result.
///
/// On would-block the transport's readiness notification is awaited before
/// the same attempt is made again.
pub(crate) async fn retry<T, R, F>(
    transport: &T,
    operation: &str,
    mut attempt: F,
) -> TetherResult<R>
where
    T: SftpTransport + ?Sized,
    F: FnMut() -> Attempt<R>,
{
    loop {
        match attempt() {
            Attempt::Ready(value) => return Ok(value),
            Attempt::WouldBlock => {
                logging::log_would_block(operation);
                transport.wait_ready().await?;
            }
            Attempt::Failed(e) => return Err(e),
        }
    }
}

/// SFTP session over a shared, already-authenticated transport.
///
/// Operations take `&mut self`: a transport connection must only ever see one
/// request at a time.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tether_sftp::memory::MemoryTransport;
/// use tether_sftp::SftpSession;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut sftp = SftpSession::new(Arc::new(MemoryTransport::new()))?;
///
/// sftp.mkdir("/srv", None).await?;
/// sftp.upload_str("hello world", "/srv/t.txt", None).await?;
///
/// assert_eq!(sftp.stat("/srv/t.txt").await?.size(), Some(11));
/// assert_eq!(sftp.realpath("/srv/../srv/./t.txt").await?, "/srv/t.txt");
/// # Ok(())
/// # }
/// ```
pub struct SftpSession<T: SftpTransport> {
    transport: Arc<T>,
    sftp: T::Sftp,
    config: SftpConfig,
    shut_down: bool,
}

impl<T: SftpTransport> SftpSession<T> {
    /// Starts an SFTP session with the default configuration.
    pub fn new(transport: Arc<T>) -> TetherResult<Self> {
        Self::with_config(transport, SftpConfig::default())
    }

    /// Starts an SFTP session.
    ///
    /// Fails if the configuration is invalid or the transport cannot start
    /// the subsystem.
    pub fn with_config(transport: Arc<T>, config: SftpConfig) -> TetherResult<Self> {
        config.validate()?;

        let sftp = transport
            .sftp_init()
            .ok_or_else(|| TetherError::transport(transport.last_error()))?;

        logging::log_session_started();

        Ok(Self {
            transport,
            sftp,
            config,
            shut_down: false,
        })
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SftpConfig {
        &self.config
    }

    /// Returns the shared transport.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Opens a remote handle. Open is attempted once and never retried.
    pub fn open(
        &mut self,
        path: &str,
        flags: FileOpenFlags,
        mode: u32,
        kind: OpenKind,
    ) -> TetherResult<RemoteHandle<'_, T>> {
        RemoteHandle::open(&*self.transport, &self.sftp, path, flags, mode, kind)
    }

    /// Returns the attributes of `path`, following symbolic links.
    pub async fn stat(&mut self, path: &str) -> TetherResult<FileAttributes> {
        self.stat_with(path, StatKind::Stat).await
    }

    /// Returns the attributes of `path` itself, not following a final
    /// symbolic link.
    pub async fn lstat(&mut self, path: &str) -> TetherResult<FileAttributes> {
        self.stat_with(path, StatKind::Lstat).await
    }

    async fn stat_with(&mut self, path: &str, kind: StatKind) -> TetherResult<FileAttributes> {
        let transport = &*self.transport;
        let sftp = &self.sftp;
        let mut attrs = FileAttributes::default();

        retry(transport, "stat", || {
            process_status(
                transport,
                transport.stat(sftp, path.as_bytes(), kind, &mut attrs),
            )
        })
        .await?;

        Ok(attrs)
    }

    /// Creates a directory. `None` uses the configured default permissions.
    ///
    /// Fails with a transport error if `path` already exists.
    pub async fn mkdir(&mut self, path: &str, permissions: Option<u32>) -> TetherResult<()> {
        let mode = permissions.unwrap_or(self.config.default_dir_mode);
        let transport = &*self.transport;
        let sftp = &self.sftp;

        retry(transport, "mkdir", || {
            process_status(transport, transport.mkdir(sftp, path.as_bytes(), mode))
        })
        .await?;

        Ok(())
    }

    /// Resolves `path` to its canonical absolute form.
    ///
    /// Results longer than [`LINK_BUFFER_SIZE`] bytes come back truncated.
    pub async fn realpath(&mut self, path: &str) -> TetherResult<String> {
        self.resolve_link(path, LinkKind::RealPath).await
    }

    /// Returns the target of the symbolic link at `path`.
    ///
    /// Results longer than [`LINK_BUFFER_SIZE`] bytes come back truncated.
    pub async fn readlink(&mut self, path: &str) -> TetherResult<String> {
        self.resolve_link(path, LinkKind::ReadLink).await
    }

    /// Creates a symbolic link at `link_path` pointing at `target`.
    pub async fn symlink(&mut self, target: &str, link_path: &str) -> TetherResult<()> {
        let transport = &*self.transport;
        let sftp = &self.sftp;
        let mut target = target.as_bytes().to_vec();

        retry(transport, "symlink", || {
            process_status(
                transport,
                transport.link(sftp, link_path.as_bytes(), &mut target, LinkKind::Symlink),
            )
        })
        .await?;

        Ok(())
    }

    async fn resolve_link(&mut self, path: &str, kind: LinkKind) -> TetherResult<String> {
        let transport = &*self.transport;
        let sftp = &self.sftp;
        let mut target = [0u8; LINK_BUFFER_SIZE];

        let len = retry(transport, "link", || {
            process_status(
                transport,
                transport.link(sftp, path.as_bytes(), &mut target, kind),
            )
        })
        .await?;

        let resolved = &target[..len.min(LINK_BUFFER_SIZE)];
        match std::str::from_utf8(resolved) {
            Ok(text) => Ok(text.to_string()),
            // A full buffer may end partway through a multi-byte character.
            Err(e) if len >= LINK_BUFFER_SIZE && e.error_len().is_none() => {
                Ok(std::str::from_utf8(&resolved[..e.valid_up_to()])?.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Shuts the protocol session down, waiting out would-block results.
    ///
    /// Dropping the session without calling this makes a single
    /// best-effort shutdown attempt instead.
    pub async fn shutdown(mut self) -> TetherResult<()> {
        let transport = &*self.transport;
        let sftp = &mut self.sftp;

        let result = retry(transport, "shutdown", || {
            process_status(transport, transport.sftp_shutdown(sftp))
        })
        .await;

        self.shut_down = true;
        logging::log_session_shutdown(result.is_ok());
        result.map(|_| ())
    }
}

impl<T: SftpTransport> Drop for SftpSession<T> {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        let rc = self.transport.sftp_shutdown(&mut self.sftp);
        logging::log_session_shutdown(rc >= 0);
    }
}

impl<T: SftpTransport> std::fmt::Debug for SftpSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftpSession")
            .field("config", &self.config)
            .field("shut_down", &self.shut_down)
            .finish()
    }
}
