//! Plugin lifecycle contract
//!
//! A plugin is driven through five stages:
//!
//! 1. `open`: one-time initialization; configuration problems are reported
//!    on the error key
//! 2. `get`: populate or refresh a key set with the keys under a parent
//! 3. `set`: persist the part of a key set below a parent
//! 4. `error`: roll back after a later stage of the same pipeline failed
//! 5. `close`: release what `open` acquired
//!
//! Every stage returns a [`Status`]; failure details are written to the
//! given key with [`crate::report`].

use serde::{Deserialize, Serialize};
use std::fmt;

use keytree_core::{Key, KeySet};

use crate::info::PluginInfo;
use crate::status::Status;

/// The lifecycle stages a plugin can export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// One-time initialization
    Open,
    /// Read keys
    Get,
    /// Write keys
    Set,
    /// Roll back a failed write
    Error,
    /// Release resources
    Close,
}

impl Stage {
    /// All stages in lifecycle order
    pub const ALL: [Stage; 5] = [
        Stage::Open,
        Stage::Get,
        Stage::Set,
        Stage::Error,
        Stage::Close,
    ];

    /// Lowercase stage name
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Open => "open",
            Stage::Get => "get",
            Stage::Set => "set",
            Stage::Error => "error",
            Stage::Close => "close",
        }
    }

    /// Parse a lowercase stage name
    pub fn from_name(name: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.as_str() == name)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key set transformation driven through the lifecycle stages
///
/// `open`, `error` and `close` default to doing nothing.
pub trait Plugin: Send {
    /// Module name, used in reports and plugin info
    fn name(&self) -> &str;

    /// Self-description exported by the plugin
    fn info(&self) -> PluginInfo {
        PluginInfo::new(self.name())
    }

    /// Initialize the plugin
    fn open(&mut self, _error_key: &Key) -> Status {
        Status::SUCCESS
    }

    /// Populate `ks` with the stored keys at or below `parent`
    fn get(&mut self, ks: &mut KeySet, parent: &Key) -> Status;

    /// Persist the keys of `ks` at or below `parent`
    fn set(&mut self, ks: &mut KeySet, parent: &Key) -> Status;

    /// Undo the effects of the last `set`
    fn error(&mut self, _ks: &mut KeySet, _parent: &Key) -> Status {
        Status::SUCCESS
    }

    /// Release resources acquired in `open`
    fn close(&mut self, _parent: &Key) -> Status {
        Status::SUCCESS
    }
}
