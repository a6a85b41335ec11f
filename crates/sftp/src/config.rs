//! SFTP session configuration
//!
//! Provides the configuration structure and builder for [`SftpSession`](crate::SftpSession).

use crate::types::FileMode;
use tether_platform::{TetherError, TetherResult};

/// Session configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SftpConfig {
    /// Permission bits used by uploads when the caller passes `None`
    pub default_file_mode: u32,

    /// Permission bits used by `mkdir` when the caller passes `None`
    pub default_dir_mode: u32,

    /// Drop `.` and `..` from directory listings
    ///
    /// Off by default: listings are returned exactly as the server sends them.
    pub skip_dot_entries: bool,
}

impl Default for SftpConfig {
    fn default() -> Self {
        Self {
            default_file_mode: FileMode::DEFAULT_FILE,
            default_dir_mode: FileMode::DEFAULT_DIR,
            skip_dot_entries: false,
        }
    }
}

impl SftpConfig {
    /// Create builder for session configuration
    pub fn builder() -> SftpConfigBuilder {
        SftpConfigBuilder::new()
    }

    /// Validate configuration
    pub fn validate(&self) -> TetherResult<()> {
        if self.default_file_mode & !FileMode::PERMISSION_MASK != 0 {
            return Err(TetherError::Config(format!(
                "default_file_mode {:o} has bits outside {:o}",
                self.default_file_mode,
                FileMode::PERMISSION_MASK
            )));
        }
        if self.default_dir_mode & !FileMode::PERMISSION_MASK != 0 {
            return Err(TetherError::Config(format!(
                "default_dir_mode {:o} has bits outside {:o}",
                self.default_dir_mode,
                FileMode::PERMISSION_MASK
            )));
        }
        Ok(())
    }
}

/// Builder for SftpConfig
#[derive(Default)]
pub struct SftpConfigBuilder {
    default_file_mode: Option<u32>,
    default_dir_mode: Option<u32>,
    skip_dot_entries: Option<bool>,
}

impl SftpConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set default upload permissions
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.default_file_mode = Some(mode);
        self
    }

    /// Set default mkdir permissions
    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.default_dir_mode = Some(mode);
        self
    }

    /// Drop `.` and `..` from listings
    pub fn skip_dot_entries(mut self, skip: bool) -> Self {
        self.skip_dot_entries = Some(skip);
        self
    }

    /// Build SftpConfig with validation
    pub fn build(self) -> TetherResult<SftpConfig> {
        let defaults = SftpConfig::default();
        let config = SftpConfig {
            default_file_mode: self.default_file_mode.unwrap_or(defaults.default_file_mode),
            default_dir_mode: self.default_dir_mode.unwrap_or(defaults.default_dir_mode),
            skip_dot_entries: self.skip_dot_entries.unwrap_or(defaults.skip_dot_entries),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_platform::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = SftpConfig::default();
        assert_eq!(config.default_file_mode, 0o644);
        assert_eq!(config.default_dir_mode, 0o755);
        assert!(!config.skip_dot_entries);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SftpConfig::builder()
            .with_file_mode(0o600)
            .with_dir_mode(0o700)
            .skip_dot_entries(true)
            .build()
            .unwrap();

        assert_eq!(config.default_file_mode, 0o600);
        assert_eq!(config.default_dir_mode, 0o700);
        assert!(config.skip_dot_entries);
    }

    #[test]
    fn test_builder_rejects_type_bits() {
        let err = SftpConfig::builder()
            .with_file_mode(FileMode::S_IFREG | 0o644)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("default_file_mode"));

        let err = SftpConfig::builder()
            .with_dir_mode(0o40755)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("default_dir_mode"));
    }
}
