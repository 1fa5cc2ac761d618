//! Persistence and Configuration Loading for the Comfort Engine
//!
//! ## Overview
//!
//! The engine itself never touches a disk. This crate supplies the two pieces
//! a host needs around it:
//!
//! 1. [`JsonFileStore`], a [`StateStore`](mrtop_core::StateStore) that keeps
//!    one JSON document per room in a directory.
//! 2. [`load_config`] / [`parse_config`], which read and validate a
//!    [`HomeConfig`](mrtop_core::HomeConfig).
//!
//! ## Document Layout
//!
//! ```text
//! state/
//! ├── room-1.json      { "model_state": {...}, "profiles": {...} }
//! ├── room-2.json
//! └── room-7.json
//! ```
//!
//! Each document is written to a temporary sibling and renamed over the old
//! one, so a crash mid-write leaves the previous state readable. Fields added
//! in later versions carry serde defaults, so older documents keep loading.
//!
//! ## Usage Example
//!
//! ```no_run
//! use mrtop_core::Home;
//! use mrtop_store::{load_config, JsonFileStore};
//!
//! let config = load_config("home.json")?;
//! let store = JsonFileStore::open("/var/lib/mrtop")?;
//! let mut home = Home::new(config, store)?;
//! home.poll(0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod file;

use mrtop_core::ComfortError;

pub use config::{load_config, parse_config};
pub use file::JsonFileStore;

/// Storage and loading errors
#[derive(Debug, thiserror_no_std::Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be parsed or written
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration parsed but is not usable
    #[error("Invalid configuration: {0}")]
    Config(#[from] ComfortError),
}
