//! Shared error taxonomy and crate metadata for the K/π analysis workspace.

pub mod error;

pub use error::{Error, Result};

/// Version string reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
