//! Directory listing and chunked file transfer.
//!
//! Each operation opens one [`RemoteHandle`], loops single attempts through
//! the session retry loop, and closes the handle on every exit path before
//! returning. Data already written to a destination when an error occurs is
//! left in place.

use crate::handle::RemoteHandle;
use crate::logging;
use crate::session::{retry, SftpSession};
use crate::transport::{OpenKind, SftpTransport};
use crate::types::{FileAttributes, FileMode, FileOpenFlags};
use std::collections::BTreeMap;
use std::path::Path;
use tether_platform::{TetherError, TetherResult};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};

impl<T: SftpTransport> SftpSession<T> {
    /// Lists a directory.
    ///
    /// Returns every entry the server reports, keyed by name. `.` and `..`
    /// are included unless [`SftpConfig::skip_dot_entries`] is set.
    ///
    /// [`SftpConfig::skip_dot_entries`]: crate::SftpConfig::skip_dot_entries
    pub async fn ls(&mut self, path: &str) -> TetherResult<BTreeMap<String, FileAttributes>> {
        logging::log_operation_start("ls", path);
        let skip_dot_entries = self.config().skip_dot_entries;

        let mut handle = self.open(path, FileOpenFlags::read(), 0, OpenKind::Directory)?;
        let listed = read_entries(&mut handle, skip_dot_entries).await;
        finish(handle, listed).await
    }

    /// Downloads `path` into a local file, creating or truncating it.
    ///
    /// Returns the number of bytes written.
    pub async fn download(
        &mut self,
        path: &str,
        local_path: impl AsRef<Path>,
    ) -> TetherResult<u64> {
        let local_path = local_path.as_ref();
        logging::log_operation_start("download", path);

        let mut handle = self.open(path, FileOpenFlags::read(), 0, OpenKind::File)?;
        let copied = match File::create(local_path).await {
            Ok(mut file) => copy_to_writer(&mut handle, &mut file).await,
            Err(e) => Err(e.into()),
        };
        let total = finish(handle, copied).await?;

        logging::log_transfer_complete("download", path, total);
        Ok(total)
    }

    /// Downloads `path` into `writer`.
    ///
    /// Returns the number of bytes written.
    pub async fn download_to<W>(&mut self, path: &str, writer: &mut W) -> TetherResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        logging::log_operation_start("download", path);

        let mut handle = self.open(path, FileOpenFlags::read(), 0, OpenKind::File)?;
        let copied = copy_to_writer(&mut handle, writer).await;
        let total = finish(handle, copied).await?;

        logging::log_transfer_complete("download", path, total);
        Ok(total)
    }

    /// Reads the whole of `path` into memory.
    pub async fn read(&mut self, path: &str) -> TetherResult<Vec<u8>> {
        let mut contents = Vec::new();
        self.download_to(path, &mut contents).await?;
        Ok(contents)
    }

    /// Uploads `data` to `path`, creating or truncating the remote file.
    ///
    /// `permissions` are combined with the regular-file type bit; `None`
    /// uses the configured default. Returns the number of bytes written.
    pub async fn upload_bytes(
        &mut self,
        data: &[u8],
        path: &str,
        permissions: Option<u32>,
    ) -> TetherResult<u64> {
        logging::log_operation_start("upload", path);
        let mode = FileMode::regular(permissions.unwrap_or(self.config().default_file_mode));

        let mut handle = self.open(
            path,
            FileOpenFlags::create_truncate(),
            mode.0,
            OpenKind::File,
        )?;
        let written = write_all(&mut handle, data).await;
        let total = finish(handle, written).await?;

        logging::log_transfer_complete("upload", path, total);
        Ok(total)
    }

    /// Uploads UTF-8 text to `path`.
    pub async fn upload_str(
        &mut self,
        text: &str,
        path: &str,
        permissions: Option<u32>,
    ) -> TetherResult<u64> {
        self.upload_bytes(text.as_bytes(), path, permissions).await
    }

    /// Uploads the local file at `local_path` to `path`.
    pub async fn upload_file(
        &mut self,
        local_path: impl AsRef<Path>,
        path: &str,
        permissions: Option<u32>,
    ) -> TetherResult<u64> {
        let data = tokio::fs::read(local_path.as_ref()).await?;
        self.upload_bytes(&data, path, permissions).await
    }
}

/// Closes `handle` and returns `result`, or the close error if the operation
/// itself succeeded.
async fn finish<T, R>(handle: RemoteHandle<'_, T>, result: TetherResult<R>) -> TetherResult<R>
where
    T: SftpTransport,
{
    let closed = handle.close().await;
    let value = result?;
    closed?;
    Ok(value)
}

async fn read_entries<T>(
    handle: &mut RemoteHandle<'_, T>,
    skip_dot_entries: bool,
) -> TetherResult<BTreeMap<String, FileAttributes>>
where
    T: SftpTransport,
{
    let transport = handle.transport();
    let mut entries = BTreeMap::new();

    loop {
        let mut attrs = FileAttributes::default();
        let next = retry(transport, "readdir", || {
            handle.read_dir_entry(&mut attrs).into_attempt()
        })
        .await?;

        let Some(name) = next else {
            break;
        };
        let name = String::from_utf8(name.to_vec())?;
        if skip_dot_entries && (name == "." || name == "..") {
            continue;
        }
        entries.insert(name, attrs);
    }

    Ok(entries)
}

async fn copy_to_writer<T, W>(
    handle: &mut RemoteHandle<'_, T>,
    writer: &mut W,
) -> TetherResult<u64>
where
    T: SftpTransport,
    W: AsyncWrite + Unpin + ?Sized,
{
    let transport = handle.transport();
    let mut total = 0u64;

    let copied = async {
        while let Some(data) = retry(transport, "read", || handle.read().into_attempt()).await? {
            writer.write_all(&data).await?;
            total += data.len() as u64;
        }
        Ok::<_, TetherError>(())
    }
    .await;

    // Bytes written before a failure stay in the destination.
    let flushed = writer.flush().await;
    copied?;
    flushed?;
    Ok(total)
}

/// Writes `data` in chunks of at most the handle buffer size, advancing by
/// the count each write actually accepted.
async fn write_all<T>(handle: &mut RemoteHandle<'_, T>, data: &[u8]) -> TetherResult<u64>
where
    T: SftpTransport,
{
    let transport = handle.transport();
    let chunk_size = handle.buffer_size();
    let mut offset = 0usize;

    while offset < data.len() {
        let end = data.len().min(offset + chunk_size);
        let chunk = &data[offset..end];

        let written = retry(transport, "write", || handle.write(chunk).into_attempt()).await?;
        if written == 0 {
            // Zero-length write: same chunk again once the transport is ready.
            transport.wait_ready().await?;
            continue;
        }
        offset += written.min(chunk.len());
    }

    Ok(offset as u64)
}
