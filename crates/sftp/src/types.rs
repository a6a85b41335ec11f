//! SFTP data types and structures.

/// SFTP status codes (SSH_FX_*).
///
/// Transports report these through their last-error query when a request
/// fails at the protocol level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SftpErrorCode {
    /// SSH_FX_NO_SUCH_FILE - No such file
    NoSuchFile = 2,
    /// SSH_FX_PERMISSION_DENIED - Permission denied
    PermissionDenied = 3,
    /// SSH_FX_FAILURE - General failure
    Failure = 4,
    /// SSH_FX_BAD_MESSAGE - Bad message
    BadMessage = 5,
    /// SSH_FX_CONNECTION_LOST - Connection lost
    ConnectionLost = 7,
    /// SSH_FX_FILE_ALREADY_EXISTS - File already exists
    FileAlreadyExists = 11,
    /// SSH_FX_NOT_A_DIRECTORY - Not a directory
    NotADirectory = 19,
}

impl SftpErrorCode {
    /// Returns error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoSuchFile => "No such file or directory",
            Self::PermissionDenied => "Permission denied",
            Self::Failure => "Failure",
            Self::BadMessage => "Bad message",
            Self::ConnectionLost => "Connection lost",
            Self::FileAlreadyExists => "File already exists",
            Self::NotADirectory => "Not a directory",
        }
    }
}

/// File open flags (SSH_FXF_*).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOpenFlags(pub u32);

impl FileOpenFlags {
    /// SSH_FXF_READ - Open for reading
    pub const READ: u32 = 0x00000001;
    /// SSH_FXF_WRITE - Open for writing
    pub const WRITE: u32 = 0x00000002;
    /// SSH_FXF_CREAT - Create if doesn't exist
    pub const CREAT: u32 = 0x00000008;
    /// SSH_FXF_TRUNC - Truncate to 0 length
    pub const TRUNC: u32 = 0x00000010;
    /// SSH_FXF_EXCL - Fail if file exists
    pub const EXCL: u32 = 0x00000020;

    /// Flags used to open a file or directory for reading.
    pub fn read() -> Self {
        Self(Self::READ)
    }

    /// Flags used by uploads: write, create, truncate.
    pub fn create_truncate() -> Self {
        Self(Self::WRITE | Self::CREAT | Self::TRUNC)
    }

    /// Returns true if every bit of `flag` is set.
    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag == flag
    }
}

/// File mode (type and permission bits).
///
/// Passed through to the transport uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileMode(pub u32);

impl FileMode {
    /// File type mask
    pub const S_IFMT: u32 = 0o170000;
    /// Regular file type bit
    pub const S_IFREG: u32 = 0o100000;
    /// Directory type bit
    pub const S_IFDIR: u32 = 0o040000;
    /// Symbolic link type bit
    pub const S_IFLNK: u32 = 0o120000;
    /// Permission mask (including setuid, setgid and sticky)
    pub const PERMISSION_MASK: u32 = 0o7777;

    /// Default file permissions (0644 = rw-r--r--)
    pub const DEFAULT_FILE: u32 = 0o644;
    /// Default directory permissions (0755 = rwxr-xr-x)
    pub const DEFAULT_DIR: u32 = 0o755;

    /// Mode for a regular file carrying `permissions`.
    pub fn regular(permissions: u32) -> Self {
        Self(Self::S_IFREG | permissions)
    }

    /// Permission bits only.
    pub fn permissions(&self) -> u32 {
        self.0 & Self::PERMISSION_MASK
    }

    /// File type derived from the type bits.
    pub fn file_type(&self) -> FileType {
        match self.0 & Self::S_IFMT {
            Self::S_IFREG => FileType::Regular,
            Self::S_IFDIR => FileType::Directory,
            Self::S_IFLNK => FileType::Symlink,
            0 => FileType::Unknown,
            _ => FileType::Special,
        }
    }
}

/// File type flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Regular file
    Regular,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Special file
    Special,
    /// Unknown type
    Unknown,
}

/// File attribute flags.
#[derive(Debug, Clone, Copy)]
pub struct AttrFlags(pub u32);

impl AttrFlags {
    /// SSH_FILEXFER_ATTR_SIZE
    pub const SIZE: u32 = 0x00000001;
    /// SSH_FILEXFER_ATTR_UIDGID
    pub const UIDGID: u32 = 0x00000002;
    /// SSH_FILEXFER_ATTR_PERMISSIONS
    pub const PERMISSIONS: u32 = 0x00000004;
    /// SSH_FILEXFER_ATTR_ACMODTIME
    pub const ACMODTIME: u32 = 0x00000008;
}

/// Attributes of one remote filesystem entry.
///
/// Filled in by the transport's stat and read-directory primitives. A field
/// is only meaningful when its bit is set in `flags`; the accessor methods
/// apply that check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileAttributes {
    /// Presence flags (`AttrFlags::*`)
    pub flags: u32,
    /// File size in bytes
    pub size: u64,
    /// User ID
    pub uid: u32,
    /// Group ID
    pub gid: u32,
    /// Type and permission bits
    pub permissions: u32,
    /// Access time (Unix timestamp)
    pub atime: u32,
    /// Modification time (Unix timestamp)
    pub mtime: u32,
}

impl FileAttributes {
    /// Creates empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Size, if reported.
    pub fn size(&self) -> Option<u64> {
        self.has(AttrFlags::SIZE).then_some(self.size)
    }

    /// Owner and group, if reported.
    pub fn uid_gid(&self) -> Option<(u32, u32)> {
        self.has(AttrFlags::UIDGID).then_some((self.uid, self.gid))
    }

    /// Mode, if reported.
    pub fn mode(&self) -> Option<FileMode> {
        self.has(AttrFlags::PERMISSIONS)
            .then_some(FileMode(self.permissions))
    }

    /// Access and modification times, if reported.
    pub fn times(&self) -> Option<(u32, u32)> {
        self.has(AttrFlags::ACMODTIME)
            .then_some((self.atime, self.mtime))
    }

    /// File type, `Unknown` when permissions were not reported.
    pub fn file_type(&self) -> FileType {
        self.mode()
            .map(|m| m.file_type())
            .unwrap_or(FileType::Unknown)
    }

    /// Returns true if the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.file_type() == FileType::Directory
    }

    /// Returns true if the entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.file_type() == FileType::Regular
    }

    fn has(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}
