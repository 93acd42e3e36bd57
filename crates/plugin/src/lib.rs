//! Plugin contract for keytree
//!
//! Plugins transform key sets through a fixed lifecycle
//! (`open`, `get`, `set`, `error`, `close`). This crate provides:
//! - Plugin / Stage: the lifecycle contract
//! - Status: stage result codes
//! - report: error and warning metadata on keys
//! - PluginInfo: plugin self-description rendered as keys
//! - PluginConfig: plugin configuration as a key set, loadable from TOML
//! - MemoryStore: a reference storage plugin over an in-process key set
//! - Iconv: a filter converting text between charsets

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod iconv;
pub mod info;
pub mod memory;
pub mod plugin;
pub mod report;
pub mod status;

pub use config::{ConfigError, PluginConfig};
pub use iconv::Iconv;
pub use info::PluginInfo;
pub use memory::{MemoryStore, SharedKeySet};
pub use plugin::{Plugin, Stage};
pub use report::ErrorReport;
pub use status::Status;
