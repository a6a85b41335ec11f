//! Integration tests for the SFTP session layer.
//!
//! These tests drive complete operations through `SftpSession` against the
//! in-process transport:
//! - Upload/download round trips around the buffer boundary
//! - Directory listing
//! - Path resolution, including the link buffer limit
//! - Would-block, partial-write and failure handling

use std::sync::Arc;
use tether_platform::ErrorKind;
use tether_sftp::memory::{MemoryTransport, Operation};
use tether_sftp::{
    SftpConfig, SftpErrorCode, SftpSession, HANDLE_BUFFER_SIZE, LINK_BUFFER_SIZE,
};

fn session() -> (Arc<MemoryTransport>, SftpSession<MemoryTransport>) {
    let transport = Arc::new(MemoryTransport::new());
    let sftp = SftpSession::new(transport.clone()).expect("session starts");
    (transport, sftp)
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

/// Round trip for sizes around the handle buffer size.
#[tokio::test]
async fn test_round_trip_boundary_sizes() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    let b = HANDLE_BUFFER_SIZE;

    for size in [0, 1, b - 1, b, b + 1] {
        let data = payload(size);
        let path = format!("/rt-{}.bin", size);

        let written = sftp.upload_bytes(&data, &path, None).await?;
        assert_eq!(written, size as u64);

        let read_back = sftp.read(&path).await?;
        assert_eq!(read_back.len(), size, "size {}", size);
        assert_eq!(read_back, data, "size {}", size);
    }

    assert_eq!(transport.open_handles(), 0);
    Ok(())
}

/// Round trip while every other transport call would block and writes are
/// partial.
#[tokio::test]
async fn test_round_trip_under_would_block_and_partial_writes(
) -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    transport.interleave_would_block(true);
    transport.set_max_write(Some(10_000));
    transport.set_max_read(Some(7_000));

    let data = payload(HANDLE_BUFFER_SIZE * 3 + 123);
    sftp.upload_bytes(&data, "/busy.bin", None).await?;
    assert_eq!(sftp.read("/busy.bin").await?, data);

    let stats = transport.stats();
    let min_writes = (data.len() + HANDLE_BUFFER_SIZE - 1) / HANDLE_BUFFER_SIZE;
    assert!(stats.writes > min_writes);
    assert!(stats.would_blocks > 0);
    assert_eq!(stats.waits, stats.would_blocks);
    assert_eq!(transport.open_handles(), 0);
    Ok(())
}

/// The "hello world" scenario: upload text, then stat reports its size.
#[tokio::test]
async fn test_upload_text_then_stat() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    transport.create_dir_all("/tmp");

    let written = sftp.upload_str("hello world", "/tmp/t.txt", None).await?;
    assert_eq!(written, 11);

    let attrs = sftp.stat("/tmp/t.txt").await?;
    assert_eq!(attrs.size(), Some(11));
    assert!(attrs.is_file());
    assert_eq!(attrs.mode().unwrap().permissions(), 0o644);
    Ok(())
}

/// Listing returns the raw entries, `.` and `..` included.
#[tokio::test]
async fn test_ls_returns_all_entries() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    sftp.mkdir("/dir", None).await?;
    for name in ["a", "b", "c"] {
        sftp.upload_str(name, &format!("/dir/{}", name), None).await?;
    }
    transport.interleave_would_block(true);

    let entries = sftp.ls("/dir").await?;

    let names: Vec<&str> = entries.keys().map(String::as_str).collect();
    assert_eq!(names, vec![".", "..", "a", "b", "c"]);
    for (name, attrs) in &entries {
        assert_ne!(*attrs, Default::default(), "{}", name);
    }
    assert_eq!(entries["a"].size(), Some(1));
    assert!(entries["."].is_dir());
    assert_eq!(transport.open_handles(), 0);
    Ok(())
}

/// With `skip_dot_entries` the listing drops `.` and `..`.
#[tokio::test]
async fn test_ls_can_skip_dot_entries() -> Result<(), Box<dyn std::error::Error>> {
    let transport = Arc::new(MemoryTransport::new());
    let config = SftpConfig::builder().skip_dot_entries(true).build()?;
    let mut sftp = SftpSession::with_config(transport.clone(), config)?;

    for name in ["a", "b", "c"] {
        transport.insert_file(&format!("/dir/{}", name), name.as_bytes().to_vec());
    }

    let entries = sftp.ls("/dir").await?;
    let names: Vec<&str> = entries.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    Ok(())
}

/// A read failure mid-listing aborts the listing and still closes the handle.
#[tokio::test]
async fn test_ls_error_closes_handle() {
    let (transport, mut sftp) = session();
    transport.insert_file("/dir/a", b"1".to_vec());
    transport.fail_after(Operation::ReadDir, 2, SftpErrorCode::ConnectionLost);

    let err = sftp.ls("/dir").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportIo);
    assert!(err.to_string().contains("Connection lost"));
    assert_eq!(transport.open_handles(), 0);
}

/// A name that is not valid UTF-8 fails the listing with an encoding error
/// and still closes the handle.
#[tokio::test]
async fn test_ls_undecodable_name_is_encoding_error() {
    let (transport, mut sftp) = session();
    transport.insert_file("/dir/ok.txt", b"1".to_vec());
    transport.insert_raw_entry("/dir", b"bad\xff\xfename");

    let err = sftp.ls("/dir").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EncodingFailed);
    assert_eq!(transport.open_handles(), 0);
    assert_eq!(transport.stats().closes, 1);
}

/// A resolved path longer than the link buffer is truncated, not rejected.
#[tokio::test]
async fn test_realpath_truncates_long_paths() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    let segment = "d".repeat(250);
    let deep = (0..5).fold(String::new(), |acc, _| format!("{}/{}", acc, segment));
    assert!(deep.len() > LINK_BUFFER_SIZE);
    transport.create_dir_all(&deep);

    let resolved = sftp.realpath(&format!("{}/.", deep)).await?;

    assert_eq!(resolved.len(), LINK_BUFFER_SIZE);
    assert_eq!(resolved, deep[..LINK_BUFFER_SIZE]);
    Ok(())
}

/// Truncation that splits a multi-byte character drops the partial
/// character instead of failing to decode.
#[tokio::test]
async fn test_realpath_truncation_drops_split_char() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    let deep = format!("/{}\u{e9}_tail", "d".repeat(LINK_BUFFER_SIZE - 2));
    assert_eq!(deep.find('\u{e9}'), Some(LINK_BUFFER_SIZE - 1));
    transport.create_dir_all(&deep);

    let resolved = sftp.realpath(&deep).await?;

    assert_eq!(resolved.len(), LINK_BUFFER_SIZE - 1);
    assert_eq!(resolved, deep[..LINK_BUFFER_SIZE - 1]);
    Ok(())
}

#[tokio::test]
async fn test_realpath_normalizes() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    transport.create_dir_all("/home/user/docs");

    assert_eq!(sftp.realpath("/home/user/../user/./docs").await?, "/home/user/docs");
    assert_eq!(sftp.realpath("/").await?, "/");

    let err = sftp.realpath("/home/ghost").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportIo);
    Ok(())
}

/// mkdir on an existing path fails instead of succeeding silently.
#[tokio::test]
async fn test_mkdir_existing_path_fails() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    transport.insert_file("/taken", b"x".to_vec());

    sftp.mkdir("/fresh", None).await?;
    let err = sftp.mkdir("/fresh", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportIo);

    let err = sftp.mkdir("/taken", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportIo);
    Ok(())
}

/// Download into a local file, including overwriting a longer file.
#[tokio::test]
async fn test_download_to_local_file() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    let data = payload(HANDLE_BUFFER_SIZE + 17);
    transport.insert_file("/remote.bin", data.clone());

    let dir = tempfile::tempdir()?;
    let local = dir.path().join("local.bin");
    std::fs::write(&local, vec![0xAA; HANDLE_BUFFER_SIZE * 2])?;

    let total = sftp.download("/remote.bin", &local).await?;

    assert_eq!(total, data.len() as u64);
    assert_eq!(std::fs::read(&local)?, data);
    Ok(())
}

/// A destination that cannot be created is a local-resource error, and the
/// remote handle is still closed.
#[tokio::test]
async fn test_download_local_create_failure() {
    let (transport, mut sftp) = session();
    transport.insert_file("/remote.bin", b"data".to_vec());
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("missing-dir").join("out.bin");

    let err = sftp.download("/remote.bin", &local).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocalResourceFailed);
    assert_eq!(transport.open_handles(), 0);
    assert_eq!(transport.stats().reads, 0);
}

/// A read failure leaves already-downloaded bytes in place.
#[tokio::test]
async fn test_download_failure_keeps_partial_data() {
    let (transport, mut sftp) = session();
    transport.insert_file("/remote.bin", b"0123456789".to_vec());
    transport.set_max_read(Some(4));
    transport.fail_after(Operation::Read, 2, SftpErrorCode::ConnectionLost);

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("partial.bin");

    let err = sftp.download("/remote.bin", &local).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportIo);
    assert_eq!(std::fs::read(&local).unwrap(), b"01234567");
    assert_eq!(transport.open_handles(), 0);
}

/// Upload from a local file.
#[tokio::test]
async fn test_upload_local_file() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    let data = payload(HANDLE_BUFFER_SIZE * 2);

    let dir = tempfile::tempdir()?;
    let local = dir.path().join("source.bin");
    std::fs::write(&local, &data)?;

    let total = sftp.upload_file(&local, "/dest.bin", Some(0o600)).await?;

    assert_eq!(total, data.len() as u64);
    assert_eq!(transport.file_contents("/dest.bin").unwrap(), data);
    assert_eq!(transport.stats().writes, 2);

    let attrs = sftp.stat("/dest.bin").await?;
    assert_eq!(attrs.mode().unwrap().permissions(), 0o600);
    Ok(())
}

#[tokio::test]
async fn test_upload_missing_local_file() {
    let (transport, mut sftp) = session();
    let dir = tempfile::tempdir().unwrap();

    let err = sftp
        .upload_file(dir.path().join("nope"), "/dest.bin", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocalResourceFailed);
    assert_eq!(transport.stats().opens, 0);
}

/// Upload into a directory that does not exist fails at open.
#[tokio::test]
async fn test_upload_open_failure() {
    let (transport, mut sftp) = session();

    let err = sftp
        .upload_str("x", "/no/such/dir/file", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OpenFailed);
    assert_eq!(transport.stats().writes, 0);
}

/// Explicit shutdown releases the protocol session exactly once.
#[tokio::test]
async fn test_session_shutdown_after_operations() -> Result<(), Box<dyn std::error::Error>> {
    let (transport, mut sftp) = session();
    sftp.upload_str("bye", "/bye.txt", None).await?;
    assert_eq!(transport.active_sessions(), 1);

    sftp.shutdown().await?;

    assert_eq!(transport.active_sessions(), 0);
    assert_eq!(transport.stats().shutdowns, 1);
    Ok(())
}
