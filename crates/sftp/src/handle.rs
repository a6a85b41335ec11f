//! Remote file and directory handles.

use crate::logging;
use crate::outcome::{process_read, process_status, process_write, ReadOutcome, WriteOutcome};
use crate::session::retry;
use crate::transport::{OpenKind, SftpTransport};
use crate::types::{FileAttributes, FileOpenFlags};
use tether_platform::{TetherError, TetherResult};

/// Size of the buffer every handle reads into and writes from.
pub const HANDLE_BUFFER_SIZE: usize = 32768;

/// An open remote file or directory.
///
/// Each call on a handle is a single attempt; retrying on
/// [`ReadOutcome::WouldBlock`] / [`WriteOutcome::WouldBlock`] is up to the
/// caller. The handle owns a fixed buffer that every read, write and
/// directory read reuses, so data returned from one call is copied out before
/// the next call overwrites it.
///
/// The descriptor is released exactly once: by [`RemoteHandle::close`], or
/// failing that by a single best-effort attempt when the handle is dropped.
pub struct RemoteHandle<'s, T: SftpTransport> {
    transport: &'s T,
    raw: T::Handle,
    path: String,
    kind: OpenKind,
    buffer: Box<[u8]>,
    closed: bool,
}

impl<'s, T: SftpTransport> RemoteHandle<'s, T> {
    /// Opens `path` on `sftp`. Open is not retried.
    pub(crate) fn open(
        transport: &'s T,
        sftp: &T::Sftp,
        path: &str,
        flags: FileOpenFlags,
        mode: u32,
        kind: OpenKind,
    ) -> TetherResult<Self> {
        let raw = transport
            .open(sftp, path.as_bytes(), flags, mode, kind)
            .ok_or_else(|| TetherError::open_failed(path, transport.last_error()))?;

        logging::log_handle_opened(path, kind);

        Ok(Self {
            transport,
            raw,
            path: path.to_string(),
            kind,
            buffer: vec![0u8; HANDLE_BUFFER_SIZE].into_boxed_slice(),
            closed: false,
        })
    }

    /// Remote path this handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this is a file or a directory handle.
    pub fn kind(&self) -> OpenKind {
        self.kind
    }

    /// Largest chunk a single read or write moves.
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Transport this handle was opened on.
    pub fn transport(&self) -> &'s T {
        self.transport
    }

    /// Reads the next chunk of the file.
    pub fn read(&mut self) -> ReadOutcome {
        let raw = self.transport.read(&mut self.raw, &mut self.buffer);
        process_read(self.transport, raw, &self.buffer)
    }

    /// Writes up to [`buffer_size`](Self::buffer_size) bytes from the front
    /// of `chunk`. The count written may be smaller.
    pub fn write(&mut self, chunk: &[u8]) -> WriteOutcome {
        let len = chunk.len().min(self.buffer.len());
        self.buffer[..len].copy_from_slice(&chunk[..len]);
        let raw = self.transport.write(&mut self.raw, &self.buffer[..len]);
        process_write(self.transport, raw)
    }

    /// Reads the next directory entry; its name comes back as `Data` and its
    /// attributes are stored in `attrs`.
    pub fn read_dir_entry(&mut self, attrs: &mut FileAttributes) -> ReadOutcome {
        let raw = self
            .transport
            .readdir(&mut self.raw, &mut self.buffer, attrs);
        process_read(self.transport, raw, &self.buffer)
    }

    /// Closes the descriptor, waiting out would-block results.
    pub async fn close(mut self) -> TetherResult<()> {
        let transport = self.transport;
        let raw = &mut self.raw;
        let result = retry(transport, "close", || {
            process_status(transport, transport.close(raw))
        })
        .await;

        self.closed = true;
        logging::log_handle_closed(&self.path, result.is_ok());
        result.map(|_| ())
    }
}

impl<T: SftpTransport> Drop for RemoteHandle<'_, T> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let rc = self.transport.close(&mut self.raw);
        logging::log_handle_closed(&self.path, rc >= 0);
    }
}

impl<T: SftpTransport> std::fmt::Debug for RemoteHandle<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteHandle")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTransport;
    use crate::types::SftpErrorCode;
    use tether_platform::ErrorKind;

    #[test]
    fn test_open_missing_file_fails() {
        let transport = MemoryTransport::new();
        let sftp = transport.sftp_init().unwrap();

        let err = RemoteHandle::open(
            &transport,
            &sftp,
            "/missing",
            FileOpenFlags::read(),
            0,
            OpenKind::File,
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OpenFailed);
        assert!(err.to_string().contains("/missing"));
        assert!(err.to_string().contains(SftpErrorCode::NoSuchFile.message()));
        assert_eq!(transport.stats().opens, 1);
    }

    #[test]
    fn test_read_copies_out_of_buffer() {
        let transport = MemoryTransport::new();
        transport.insert_file("/f", b"abcdefgh".to_vec());
        transport.set_max_read(Some(4));
        let sftp = transport.sftp_init().unwrap();
        let mut handle = RemoteHandle::open(
            &transport,
            &sftp,
            "/f",
            FileOpenFlags::read(),
            0,
            OpenKind::File,
        )
        .unwrap();

        let first = match handle.read() {
            ReadOutcome::Data(data) => data,
            other => panic!("Expected Data, got {:?}", other),
        };
        let second = match handle.read() {
            ReadOutcome::Data(data) => data,
            other => panic!("Expected Data, got {:?}", other),
        };

        assert_eq!(&first[..], b"abcd");
        assert_eq!(&second[..], b"efgh");
        assert!(matches!(handle.read(), ReadOutcome::Done));
        assert_eq!(handle.buffer_size(), HANDLE_BUFFER_SIZE);
    }

    #[test]
    fn test_write_is_capped_at_buffer_size() {
        let transport = MemoryTransport::new();
        let sftp = transport.sftp_init().unwrap();
        let mut handle = RemoteHandle::open(
            &transport,
            &sftp,
            "/big",
            FileOpenFlags::create_truncate(),
            0o644,
            OpenKind::File,
        )
        .unwrap();

        let data = vec![7u8; HANDLE_BUFFER_SIZE + 10];
        match handle.write(&data) {
            WriteOutcome::Written(n) => assert_eq!(n, HANDLE_BUFFER_SIZE),
            other => panic!("Expected Written, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_closes_once() {
        let transport = MemoryTransport::new();
        transport.insert_file("/f", b"x".to_vec());
        let sftp = transport.sftp_init().unwrap();

        {
            let _handle = RemoteHandle::open(
                &transport,
                &sftp,
                "/f",
                FileOpenFlags::read(),
                0,
                OpenKind::File,
            )
            .unwrap();
            assert_eq!(transport.open_handles(), 1);
        }

        assert_eq!(transport.open_handles(), 0);
        assert_eq!(transport.stats().closes, 1);
    }

    #[tokio::test]
    async fn test_close_retries_would_block() {
        let transport = MemoryTransport::new();
        transport.insert_file("/f", b"x".to_vec());
        let sftp = transport.sftp_init().unwrap();
        let handle = RemoteHandle::open(
            &transport,
            &sftp,
            "/f",
            FileOpenFlags::read(),
            0,
            OpenKind::File,
        )
        .unwrap();

        transport.interleave_would_block(true);
        handle.close().await.unwrap();

        let stats = transport.stats();
        assert_eq!(stats.closes, 2);
        assert_eq!(stats.would_blocks, 1);
        assert_eq!(stats.waits, 1);
        assert_eq!(transport.open_handles(), 0);
    }

    #[test]
    fn test_directory_entries() {
        let transport = MemoryTransport::new();
        transport.insert_file("/d/a", b"1".to_vec());
        let sftp = transport.sftp_init().unwrap();
        let mut handle = RemoteHandle::open(
            &transport,
            &sftp,
            "/d",
            FileOpenFlags::read(),
            0,
            OpenKind::Directory,
        )
        .unwrap();

        let mut names = Vec::new();
        loop {
            let mut attrs = FileAttributes::default();
            match handle.read_dir_entry(&mut attrs) {
                ReadOutcome::Data(name) => {
                    assert_ne!(attrs, FileAttributes::default());
                    names.push(String::from_utf8(name.to_vec()).unwrap());
                }
                ReadOutcome::Done => break,
                ReadOutcome::WouldBlock => panic!("Unexpected would-block"),
                ReadOutcome::Error(e) => panic!("{}", e),
            }
        }
        assert_eq!(names, vec![".", "..", "a"]);
    }
}
