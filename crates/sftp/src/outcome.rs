//! Translation of raw transport results into tagged outcomes.
//!
//! Every primitive in [`SftpTransport`] reports a signed integer. The
//! functions here are the only place that interprets those integers, so every
//! higher-level operation shares one retry contract.

use crate::transport::{SftpTransport, LIBSSH2_ERROR_EAGAIN};
use bytes::Bytes;
use tether_platform::TetherError;

/// Result of one read or read-directory attempt.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Bytes copied out of the handle buffer
    Data(Bytes),
    /// End of file or end of directory listing
    Done,
    /// The transport could not make progress yet
    WouldBlock,
    /// The transport reported a failure
    Error(TetherError),
}

/// Result of one write attempt.
#[derive(Debug)]
pub enum WriteOutcome {
    /// Number of bytes accepted; may be less than offered
    Written(usize),
    /// The transport could not make progress yet
    WouldBlock,
    /// The transport reported a failure
    Error(TetherError),
}

/// One step of a retryable operation.
#[derive(Debug)]
pub enum Attempt<T> {
    /// Terminal success
    Ready(T),
    /// Try the same attempt again once the transport is ready
    WouldBlock,
    /// Terminal failure
    Failed(TetherError),
}

impl ReadOutcome {
    /// `Some(bytes)` for data, `None` for end of stream.
    pub fn into_attempt(self) -> Attempt<Option<Bytes>> {
        match self {
            ReadOutcome::Data(data) => Attempt::Ready(Some(data)),
            ReadOutcome::Done => Attempt::Ready(None),
            ReadOutcome::WouldBlock => Attempt::WouldBlock,
            ReadOutcome::Error(e) => Attempt::Failed(e),
        }
    }
}

impl WriteOutcome {
    /// Number of bytes written on success.
    pub fn into_attempt(self) -> Attempt<usize> {
        match self {
            WriteOutcome::Written(n) => Attempt::Ready(n),
            WriteOutcome::WouldBlock => Attempt::WouldBlock,
            WriteOutcome::Error(e) => Attempt::Failed(e),
        }
    }
}

/// Classifies a read result. `buf` is the handle buffer the transport filled.
pub fn process_read<T>(transport: &T, raw: i64, buf: &[u8]) -> ReadOutcome
where
    T: SftpTransport + ?Sized,
{
    if raw > 0 {
        let len = (raw as usize).min(buf.len());
        ReadOutcome::Data(Bytes::copy_from_slice(&buf[..len]))
    } else if raw == 0 {
        ReadOutcome::Done
    } else if raw == LIBSSH2_ERROR_EAGAIN {
        ReadOutcome::WouldBlock
    } else {
        ReadOutcome::Error(TetherError::transport(transport.last_error()))
    }
}

/// Classifies a write result. Zero is a legal partial write.
pub fn process_write<T>(transport: &T, raw: i64) -> WriteOutcome
where
    T: SftpTransport + ?Sized,
{
    if raw >= 0 {
        WriteOutcome::Written(raw as usize)
    } else if raw == LIBSSH2_ERROR_EAGAIN {
        WriteOutcome::WouldBlock
    } else {
        WriteOutcome::Error(TetherError::transport(transport.last_error()))
    }
}

/// Classifies the result of a path-level primitive (stat, mkdir, link) or of
/// a close/shutdown call.
pub fn process_status<T>(transport: &T, raw: i64) -> Attempt<usize>
where
    T: SftpTransport + ?Sized,
{
    process_write(transport, raw).into_attempt()
}
