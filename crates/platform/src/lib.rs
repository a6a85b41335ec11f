//! # Tether Platform
//!
//! Core platform types shared by the Tether crates.
//!
//! This crate provides:
//! - Unified error types (`TetherError`, `TetherResult`)
//! - Error classification (`ErrorKind`)
//!
//! # Examples
//!
//! ```
//! use tether_platform::{ErrorKind, TetherError, TetherResult};
//!
//! fn example_function() -> TetherResult<String> {
//!     Err(TetherError::transport(None))
//! }
//!
//! let err = example_function().unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::TransportIo);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod error;

pub use error::{ErrorKind, TetherError, TetherResult};

/// Platform version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
