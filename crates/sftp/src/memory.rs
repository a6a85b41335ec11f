//! In-process SFTP transport.
//!
//! [`MemoryTransport`] keeps a small virtual filesystem behind a mutex and
//! answers the [`SftpTransport`] primitives the way a non-blocking SSH
//! library would, including the would-block sentinel, short reads, partial
//! writes and protocol failures. Faults are injected through the setter
//! methods; call counters are exposed through [`MemoryTransport::stats`].
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
//! transport.interleave_would_block(true);
//!
//! let mut sftp = SftpSession::new(transport.clone())?;
//! sftp.upload_str("hello world", "/t.txt", None).await?;
//! assert_eq!(transport.file_contents("/t.txt").unwrap(), b"hello world");
//! # Ok(())
//! # }
//! ```

use crate::transport::{
    LinkKind, OpenKind, SftpTransport, StatKind, LIBSSH2_ERROR_EAGAIN,
    LIBSSH2_ERROR_SFTP_PROTOCOL,
};
use crate::types::{AttrFlags, FileAttributes, FileMode, FileOpenFlags, SftpErrorCode};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tether_platform::TetherResult;

const MAX_SYMLINK_DEPTH: usize = 40;
const OWNER_ID: u32 = 1000;
const DIRECTORY_SIZE: u64 = 4096;

/// Primitive selector for fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `sftp_init`
    Init,
    /// `sftp_shutdown`
    Shutdown,
    /// `open`
    Open,
    /// `read`
    Read,
    /// `write`
    Write,
    /// `readdir`
    ReadDir,
    /// `close`
    Close,
    /// `link`
    Link,
    /// `mkdir`
    Mkdir,
    /// `stat`
    Stat,
}

/// Number of times each primitive was called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// `sftp_init` calls
    pub inits: usize,
    /// `sftp_shutdown` calls
    pub shutdowns: usize,
    /// `open` calls
    pub opens: usize,
    /// `read` calls
    pub reads: usize,
    /// `write` calls
    pub writes: usize,
    /// `readdir` calls
    pub readdirs: usize,
    /// `close` calls
    pub closes: usize,
    /// `link` calls
    pub links: usize,
    /// `mkdir` calls
    pub mkdirs: usize,
    /// `stat` calls
    pub stats: usize,
    /// Calls answered with the would-block sentinel
    pub would_blocks: usize,
    /// `wait_ready` calls
    pub waits: usize,
}

/// Protocol session produced by [`MemoryTransport`].
#[derive(Debug)]
pub struct MemorySftp {
    id: u64,
}

impl MemorySftp {
    /// Session identifier.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Descriptor produced by [`MemoryTransport`].
#[derive(Debug)]
pub struct MemoryHandle {
    id: u64,
}

#[derive(Debug)]
enum Node {
    File { data: Vec<u8>, mode: u32, mtime: u32 },
    Dir { mode: u32, mtime: u32 },
    Symlink { target: String, mtime: u32 },
}

impl Node {
    fn attributes(&self) -> FileAttributes {
        let (size, permissions, mtime) = match self {
            Node::File { data, mode, mtime } => {
                (data.len() as u64, FileMode::S_IFREG | mode, *mtime)
            }
            Node::Dir { mode, mtime } => (DIRECTORY_SIZE, FileMode::S_IFDIR | mode, *mtime),
            Node::Symlink { target, mtime } => {
                (target.len() as u64, FileMode::S_IFLNK | 0o777, *mtime)
            }
        };
        FileAttributes {
            flags: AttrFlags::SIZE
                | AttrFlags::UIDGID
                | AttrFlags::PERMISSIONS
                | AttrFlags::ACMODTIME,
            size,
            uid: OWNER_ID,
            gid: OWNER_ID,
            permissions,
            atime: mtime,
            mtime,
        }
    }
}

#[derive(Debug)]
enum OpenState {
    File {
        path: String,
        position: usize,
        readable: bool,
        writable: bool,
    },
    Dir {
        entries: VecDeque<(Vec<u8>, FileAttributes)>,
    },
}

#[derive(Debug, Default)]
struct Faults {
    interleave_would_block: bool,
    blocked_last: bool,
    max_read: Option<usize>,
    max_write: Option<usize>,
    zero_writes: usize,
    failures: HashMap<Operation, (usize, SftpErrorCode)>,
    refuse_init: bool,
}

#[derive(Debug)]
struct State {
    nodes: BTreeMap<String, Node>,
    raw_entries: Vec<(String, Vec<u8>)>,
    handles: HashMap<u64, OpenState>,
    sessions: usize,
    next_id: u64,
    clock: u32,
    faults: Faults,
    stats: MemoryStats,
    last_error: Option<(i32, String)>,
}

/// In-memory implementation of [`SftpTransport`].
#[derive(Debug)]
pub struct MemoryTransport {
    state: Mutex<State>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// Creates a transport whose filesystem holds only `/`.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir { mode: 0o755, mtime: 0 });
        Self {
            state: Mutex::new(State {
                nodes,
                raw_entries: Vec::new(),
                handles: HashMap::new(),
                sessions: 0,
                next_id: 1,
                clock: 0,
                faults: Faults::default(),
                stats: MemoryStats::default(),
                last_error: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answers every other call with the would-block sentinel, starting with
    /// the next one. `open` and `sftp_init` are never blocked.
    pub fn interleave_would_block(&self, enabled: bool) {
        let mut state = self.state();
        state.faults.interleave_would_block = enabled;
        state.faults.blocked_last = false;
    }

    /// Caps the number of bytes a single read returns.
    pub fn set_max_read(&self, limit: Option<usize>) {
        self.state().faults.max_read = limit;
    }

    /// Caps the number of bytes a single write accepts.
    pub fn set_max_write(&self, limit: Option<usize>) {
        self.state().faults.max_write = limit;
    }

    /// Makes the next `count` writes accept zero bytes.
    pub fn stall_writes(&self, count: usize) {
        self.state().faults.zero_writes = count;
    }

    /// Makes the next call of `op` fail with `code`.
    pub fn fail_next(&self, op: Operation, code: SftpErrorCode) {
        self.fail_after(op, 0, code);
    }

    /// Lets `successes` calls of `op` through, then fails the one after with
    /// `code`. Would-block answers do not count.
    pub fn fail_after(&self, op: Operation, successes: usize, code: SftpErrorCode) {
        self.state().faults.failures.insert(op, (successes, code));
    }

    /// Makes `sftp_init` return no session.
    pub fn refuse_init(&self, refuse: bool) {
        self.state().faults.refuse_init = refuse;
    }

    /// Creates `path` and any missing parent directories.
    pub fn create_dir_all(&self, path: &str) {
        let mut state = self.state();
        let mut current = String::new();
        for part in components(path) {
            current.push('/');
            current.push_str(part);
            let mtime = state.tick();
            state
                .nodes
                .entry(current.clone())
                .or_insert(Node::Dir { mode: 0o755, mtime });
        }
    }

    /// Stores a file, creating parent directories as needed.
    pub fn insert_file(&self, path: &str, data: impl Into<Vec<u8>>) {
        let path = normalize(path);
        self.create_dir_all(&parent(&path));
        let mut state = self.state();
        let mtime = state.tick();
        state.nodes.insert(
            path,
            Node::File {
                data: data.into(),
                mode: FileMode::DEFAULT_FILE,
                mtime,
            },
        );
    }

    /// Adds a listing entry to the directory `dir` whose name is the raw
    /// `name` bytes, valid UTF-8 or not. The entry only appears in listings.
    pub fn insert_raw_entry(&self, dir: &str, name: &[u8]) {
        self.create_dir_all(dir);
        self.state().raw_entries.push((normalize(dir), name.to_vec()));
    }

    /// Contents of the regular file at `path`, if there is one.
    pub fn file_contents(&self, path: &str) -> Option<Vec<u8>> {
        match self.state().nodes.get(&normalize(path)) {
            Some(Node::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    /// Returns true if anything exists at `path` (symlinks are not followed).
    pub fn exists(&self, path: &str) -> bool {
        self.state().nodes.contains_key(&normalize(path))
    }

    /// Call counters.
    pub fn stats(&self) -> MemoryStats {
        self.state().stats.clone()
    }

    /// Number of handles opened and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.state().handles.len()
    }

    /// Number of protocol sessions started and not yet shut down.
    pub fn active_sessions(&self) -> usize {
        self.state().sessions
    }
}

impl State {
    fn tick(&mut self) -> u32 {
        self.clock += 1;
        self.clock
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn fail(&mut self, code: SftpErrorCode) -> i64 {
        self.last_error = Some((
            LIBSSH2_ERROR_SFTP_PROTOCOL as i32,
            code.message().to_string(),
        ));
        LIBSSH2_ERROR_SFTP_PROTOCOL
    }

    /// Applies injected faults. `Some(rc)` short-circuits the primitive.
    fn intercept(&mut self, op: Operation) -> Option<i64> {
        if self.faults.interleave_would_block && !matches!(op, Operation::Init | Operation::Open) {
            if self.faults.blocked_last {
                self.faults.blocked_last = false;
            } else {
                self.faults.blocked_last = true;
                self.stats.would_blocks += 1;
                return Some(LIBSSH2_ERROR_EAGAIN);
            }
        }
        match self.faults.failures.get_mut(&op) {
            Some((0, code)) => {
                let code = *code;
                self.faults.failures.remove(&op);
                Some(self.fail(code))
            }
            Some((remaining, _)) => {
                *remaining -= 1;
                None
            }
            None => None,
        }
    }

    fn settle(&mut self, result: Result<usize, SftpErrorCode>) -> i64 {
        match result {
            Ok(n) => n as i64,
            Err(code) => self.fail(code),
        }
    }

    fn resolve(&self, path: &str, follow_last: bool) -> Result<String, SftpErrorCode> {
        let mut pending: Vec<String> = components(path).rev().map(str::to_string).collect();
        let mut resolved: Vec<String> = Vec::new();
        let mut hops = 0;

        while let Some(part) = pending.pop() {
            if part == "." {
                continue;
            }
            if part == ".." {
                resolved.pop();
                continue;
            }

            resolved.push(part);
            let current = join(&resolved);
            if let Some(Node::Symlink { target, .. }) = self.nodes.get(&current) {
                if pending.is_empty() && !follow_last {
                    continue;
                }
                hops += 1;
                if hops > MAX_SYMLINK_DEPTH {
                    return Err(SftpErrorCode::Failure);
                }
                resolved.pop();
                if target.starts_with('/') {
                    resolved.clear();
                }
                pending.extend(components(target).rev().map(str::to_string));
            }
        }

        Ok(join(&resolved))
    }

    fn require_dir(&self, path: &str) -> Result<(), SftpErrorCode> {
        match self.nodes.get(path) {
            Some(Node::Dir { .. }) => Ok(()),
            Some(_) => Err(SftpErrorCode::NotADirectory),
            None => Err(SftpErrorCode::NoSuchFile),
        }
    }

    fn open_file(
        &mut self,
        path: &str,
        flags: FileOpenFlags,
        mode: u32,
    ) -> Result<OpenState, SftpErrorCode> {
        let resolved = self.resolve(path, true)?;
        match self.nodes.get(&resolved) {
            Some(Node::File { .. }) => {
                if flags.contains(FileOpenFlags::CREAT | FileOpenFlags::EXCL) {
                    return Err(SftpErrorCode::FileAlreadyExists);
                }
            }
            Some(_) => return Err(SftpErrorCode::Failure),
            None => {
                if !flags.contains(FileOpenFlags::CREAT) {
                    return Err(SftpErrorCode::NoSuchFile);
                }
                self.require_dir(&parent(&resolved))?;
                let mtime = self.tick();
                self.nodes.insert(
                    resolved.clone(),
                    Node::File {
                        data: Vec::new(),
                        mode: mode & FileMode::PERMISSION_MASK,
                        mtime,
                    },
                );
            }
        }

        if flags.contains(FileOpenFlags::TRUNC) {
            let now = self.tick();
            if let Some(Node::File { data, mtime, .. }) = self.nodes.get_mut(&resolved) {
                data.clear();
                *mtime = now;
            }
        }

        Ok(OpenState::File {
            path: resolved,
            position: 0,
            readable: flags.contains(FileOpenFlags::READ),
            writable: flags.contains(FileOpenFlags::WRITE),
        })
    }

    fn open_dir(&self, path: &str) -> Result<OpenState, SftpErrorCode> {
        let resolved = self.resolve(path, true)?;
        let dir = match self.nodes.get(&resolved) {
            Some(node @ Node::Dir { .. }) => node,
            Some(_) => return Err(SftpErrorCode::NotADirectory),
            None => return Err(SftpErrorCode::NoSuchFile),
        };

        let mut entries = VecDeque::new();
        entries.push_back((b".".to_vec(), dir.attributes()));
        let up = self
            .nodes
            .get(&parent(&resolved))
            .map(Node::attributes)
            .unwrap_or_else(|| dir.attributes());
        entries.push_back((b"..".to_vec(), up));

        for (child, node) in &self.nodes {
            if child != "/" && parent(child) == resolved {
                entries.push_back((basename(child).as_bytes().to_vec(), node.attributes()));
            }
        }
        for (parent_dir, name) in &self.raw_entries {
            if *parent_dir == resolved {
                let attrs = Node::File {
                    data: Vec::new(),
                    mode: FileMode::DEFAULT_FILE,
                    mtime: 0,
                }
                .attributes();
                entries.push_back((name.clone(), attrs));
            }
        }

        Ok(OpenState::Dir { entries })
    }

    fn read_into(&mut self, id: u64, buf: &mut [u8]) -> Result<usize, SftpErrorCode> {
        let limit = self.faults.max_read.unwrap_or(usize::MAX);
        let (path, position) = match self.handles.get(&id) {
            Some(OpenState::File {
                path,
                position,
                readable: true,
                ..
            }) => (path.clone(), *position),
            Some(OpenState::File { .. }) => return Err(SftpErrorCode::PermissionDenied),
            _ => return Err(SftpErrorCode::BadMessage),
        };

        let data = match self.nodes.get(&path) {
            Some(Node::File { data, .. }) => data,
            _ => return Err(SftpErrorCode::NoSuchFile),
        };
        let start = position.min(data.len());
        let n = buf.len().min(limit).min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);

        if let Some(OpenState::File { position, .. }) = self.handles.get_mut(&id) {
            *position = start + n;
        }
        Ok(n)
    }

    fn write_from(&mut self, id: u64, bytes: &[u8]) -> Result<usize, SftpErrorCode> {
        if self.faults.zero_writes > 0 {
            self.faults.zero_writes -= 1;
            return Ok(0);
        }
        let limit = self.faults.max_write.unwrap_or(usize::MAX);
        let (path, position) = match self.handles.get(&id) {
            Some(OpenState::File {
                path,
                position,
                writable: true,
                ..
            }) => (path.clone(), *position),
            Some(OpenState::File { .. }) => return Err(SftpErrorCode::PermissionDenied),
            _ => return Err(SftpErrorCode::BadMessage),
        };

        let n = bytes.len().min(limit);
        let now = self.tick();
        match self.nodes.get_mut(&path) {
            Some(Node::File { data, mtime, .. }) => {
                let end = position + n;
                if data.len() < end {
                    data.resize(end, 0);
                }
                data[position..end].copy_from_slice(&bytes[..n]);
                *mtime = now;
            }
            _ => return Err(SftpErrorCode::NoSuchFile),
        }

        if let Some(OpenState::File { position, .. }) = self.handles.get_mut(&id) {
            *position += n;
        }
        Ok(n)
    }

    fn readdir_into(
        &mut self,
        id: u64,
        buf: &mut [u8],
        attrs: &mut FileAttributes,
    ) -> Result<usize, SftpErrorCode> {
        let entries = match self.handles.get_mut(&id) {
            Some(OpenState::Dir { entries }) => entries,
            _ => return Err(SftpErrorCode::BadMessage),
        };
        match entries.pop_front() {
            Some((name, entry_attrs)) => {
                *attrs = entry_attrs;
                Ok(copy_truncated(&name, buf))
            }
            None => Ok(0),
        }
    }

    fn realpath(&self, path: &str) -> Result<String, SftpErrorCode> {
        let resolved = self.resolve(path, true)?;
        if self.nodes.contains_key(&resolved) {
            Ok(resolved)
        } else {
            Err(SftpErrorCode::NoSuchFile)
        }
    }

    fn readlink(&self, path: &str) -> Result<String, SftpErrorCode> {
        let resolved = self.resolve(path, false)?;
        match self.nodes.get(&resolved) {
            Some(Node::Symlink { target, .. }) => Ok(target.clone()),
            Some(_) => Err(SftpErrorCode::Failure),
            None => Err(SftpErrorCode::NoSuchFile),
        }
    }

    fn create_node(&mut self, path: &str, node: Node) -> Result<usize, SftpErrorCode> {
        let resolved = self.resolve(path, false)?;
        if self.nodes.contains_key(&resolved) {
            return Err(SftpErrorCode::FileAlreadyExists);
        }
        self.require_dir(&parent(&resolved))?;
        self.nodes.insert(resolved, node);
        Ok(0)
    }

    fn stat_into(
        &self,
        path: &str,
        kind: StatKind,
        attrs: &mut FileAttributes,
    ) -> Result<usize, SftpErrorCode> {
        let resolved = self.resolve(path, kind == StatKind::Stat)?;
        match self.nodes.get(&resolved) {
            Some(node) => {
                *attrs = node.attributes();
                Ok(0)
            }
            None => Err(SftpErrorCode::NoSuchFile),
        }
    }
}

#[async_trait]
impl SftpTransport for MemoryTransport {
    type Sftp = MemorySftp;
    type Handle = MemoryHandle;

    fn sftp_init(&self) -> Option<MemorySftp> {
        let mut state = self.state();
        state.stats.inits += 1;
        if state.faults.refuse_init {
            state.last_error = Some((-7, "Unable to startup channel".to_string()));
            return None;
        }
        if state.intercept(Operation::Init).is_some() {
            return None;
        }
        state.sessions += 1;
        let id = state.next_id();
        Some(MemorySftp { id })
    }

    fn sftp_shutdown(&self, _sftp: &mut MemorySftp) -> i64 {
        let mut state = self.state();
        state.stats.shutdowns += 1;
        if let Some(rc) = state.intercept(Operation::Shutdown) {
            return rc;
        }
        state.sessions = state.sessions.saturating_sub(1);
        0
    }

    fn open(
        &self,
        _sftp: &MemorySftp,
        path: &[u8],
        flags: FileOpenFlags,
        mode: u32,
        kind: OpenKind,
    ) -> Option<MemoryHandle> {
        let mut state = self.state();
        state.stats.opens += 1;
        if state.intercept(Operation::Open).is_some() {
            return None;
        }
        let opened = match std::str::from_utf8(path) {
            Ok(path) => match kind {
                OpenKind::File => state.open_file(path, flags, mode),
                OpenKind::Directory => state.open_dir(path),
            },
            Err(_) => Err(SftpErrorCode::BadMessage),
        };
        match opened {
            Ok(open) => {
                let id = state.next_id();
                state.handles.insert(id, open);
                Some(MemoryHandle { id })
            }
            Err(code) => {
                state.fail(code);
                None
            }
        }
    }

    fn read(&self, handle: &mut MemoryHandle, buf: &mut [u8]) -> i64 {
        let mut state = self.state();
        state.stats.reads += 1;
        if let Some(rc) = state.intercept(Operation::Read) {
            return rc;
        }
        let result = state.read_into(handle.id, buf);
        state.settle(result)
    }

    fn write(&self, handle: &mut MemoryHandle, data: &[u8]) -> i64 {
        let mut state = self.state();
        state.stats.writes += 1;
        if let Some(rc) = state.intercept(Operation::Write) {
            return rc;
        }
        let result = state.write_from(handle.id, data);
        state.settle(result)
    }

    fn readdir(
        &self,
        handle: &mut MemoryHandle,
        buf: &mut [u8],
        attrs: &mut FileAttributes,
    ) -> i64 {
        let mut state = self.state();
        state.stats.readdirs += 1;
        if let Some(rc) = state.intercept(Operation::ReadDir) {
            return rc;
        }
        let result = state.readdir_into(handle.id, buf, attrs);
        state.settle(result)
    }

    fn close(&self, handle: &mut MemoryHandle) -> i64 {
        let mut state = self.state();
        state.stats.closes += 1;
        if let Some(rc) = state.intercept(Operation::Close) {
            return rc;
        }
        let result = match state.handles.remove(&handle.id) {
            Some(_) => Ok(0),
            None => Err(SftpErrorCode::BadMessage),
        };
        state.settle(result)
    }

    fn link(&self, _sftp: &MemorySftp, path: &[u8], target: &mut [u8], kind: LinkKind) -> i64 {
        let mut state = self.state();
        state.stats.links += 1;
        if let Some(rc) = state.intercept(Operation::Link) {
            return rc;
        }
        let path = match std::str::from_utf8(path) {
            Ok(path) => path,
            Err(_) => return state.fail(SftpErrorCode::BadMessage),
        };
        let result = match kind {
            LinkKind::RealPath => state
                .realpath(path)
                .map(|resolved| copy_truncated(resolved.as_bytes(), target)),
            LinkKind::ReadLink => state
                .readlink(path)
                .map(|resolved| copy_truncated(resolved.as_bytes(), target)),
            LinkKind::Symlink => {
                let mtime = state.tick();
                let node = Node::Symlink {
                    target: String::from_utf8_lossy(target).into_owned(),
                    mtime,
                };
                state.create_node(path, node)
            }
        };
        state.settle(result)
    }

    fn mkdir(&self, _sftp: &MemorySftp, path: &[u8], mode: u32) -> i64 {
        let mut state = self.state();
        state.stats.mkdirs += 1;
        if let Some(rc) = state.intercept(Operation::Mkdir) {
            return rc;
        }
        let result = match std::str::from_utf8(path) {
            Ok(path) => {
                let mtime = state.tick();
                let node = Node::Dir {
                    mode: mode & FileMode::PERMISSION_MASK,
                    mtime,
                };
                state.create_node(path, node)
            }
            Err(_) => Err(SftpErrorCode::BadMessage),
        };
        state.settle(result)
    }

    fn stat(
        &self,
        _sftp: &MemorySftp,
        path: &[u8],
        kind: StatKind,
        attrs: &mut FileAttributes,
    ) -> i64 {
        let mut state = self.state();
        state.stats.stats += 1;
        if let Some(rc) = state.intercept(Operation::Stat) {
            return rc;
        }
        let result = match std::str::from_utf8(path) {
            Ok(path) => state.stat_into(path, kind, attrs),
            Err(_) => Err(SftpErrorCode::BadMessage),
        };
        state.settle(result)
    }

    fn last_error(&self) -> Option<(i32, String)> {
        self.state().last_error.clone()
    }

    async fn wait_ready(&self) -> TetherResult<()> {
        self.state().stats.waits += 1;
        tokio::task::yield_now().await;
        Ok(())
    }
}

fn components(path: &str) -> impl DoubleEndedIterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty())
}

fn join(parts: &[String]) -> String {
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

fn normalize(path: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    for part in components(path) {
        match part {
            "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part.to_string()),
        }
    }
    join(&parts)
}

fn parent(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn copy_truncated(src: &[u8], dst: &mut [u8]) -> usize {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
    n
}
