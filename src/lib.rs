//! keytree - hierarchical configuration keys
//!
//! keytree models configuration as a tree of named keys. Names are
//! hierarchical, escaped and ordered; every key carries a value and its own
//! metadata; key sets hold keys ordered by name; plugins transform key sets
//! through a fixed lifecycle.
//!
//! # Quick Start
//!
//! ```
//! use keytree::{Key, KeySet, MemoryStore, Plugin, PluginConfig, Status};
//!
//! let parent = Key::new("user/app").unwrap();
//! let mut ks: KeySet = [
//!     Key::builder("user/app/colour").value("blue").build().unwrap(),
//!     Key::builder("user/app/size").value("12").build().unwrap(),
//! ]
//! .into_iter()
//! .collect();
//!
//! let mut store = MemoryStore::new(PluginConfig::new());
//! assert_eq!(store.open(&parent), Status::SUCCESS);
//! assert_eq!(store.set(&mut ks, &parent), Status::SUCCESS);
//!
//! let mut loaded = KeySet::new();
//! store.get(&mut loaded, &parent);
//! let size = loaded.lookup_by_name("user/app/size").unwrap().unwrap();
//! assert_eq!(size.get_i32().unwrap(), 12);
//! ```
//!
//! # Architecture
//!
//! - `keytree-core`: names, relations, keys, metadata, typed values, key sets
//! - `keytree-plugin`: the plugin lifecycle, error reporting, plugin info and
//!   configuration, and an in-memory store plugin

pub use keytree_core::*;
pub use keytree_plugin::{
    config, iconv, info, memory, plugin, report, status, ConfigError, ErrorReport, Iconv,
    MemoryStore, Plugin, PluginConfig, PluginInfo, SharedKeySet, Stage, Status,
};
