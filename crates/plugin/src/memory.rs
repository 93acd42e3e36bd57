//! In-memory store plugin
//!
//! [`MemoryStore`] keeps keys in a key set shared between instances, which
//! makes it a backend for tests and embedding hosts that do not persist.
//!
//! - `get` copies the stored keys at or below the parent into the caller's
//!   set
//! - `set` replaces the stored subtree below the parent with the caller's
//!   keys and keeps the previous subtree as a rollback snapshot
//! - `error` restores that snapshot
//! - `close` discards it
//!
//! Stored keys never share records with the caller's keys.
//!
//! Configuration: `/readonly = true` rejects every `set`.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use keytree_core::{Key, KeySet, FALSE_TOKEN, TRUE_TOKEN};

use crate::config::PluginConfig;
use crate::info::PluginInfo;
use crate::plugin::{Plugin, Stage};
use crate::report::{self, ErrorReport};
use crate::status::Status;

/// Module name of the memory store
pub const MODULE_NAME: &str = "memory";

/// Key set shared between store instances
pub type SharedKeySet = Arc<Mutex<KeySet>>;

struct Snapshot {
    parent: Key,
    keys: KeySet,
}

/// Plugin backed by an in-process key set
pub struct MemoryStore {
    store: SharedKeySet,
    config: PluginConfig,
    readonly: bool,
    opened: bool,
    snapshot: Option<Snapshot>,
}

impl MemoryStore {
    /// Create a store with its own empty key set
    pub fn new(config: PluginConfig) -> Self {
        Self::with_store(Arc::new(Mutex::new(KeySet::new())), config)
    }

    /// Create a store over an existing shared key set
    pub fn with_store(store: SharedKeySet, config: PluginConfig) -> Self {
        MemoryStore {
            store,
            config,
            readonly: false,
            opened: false,
            snapshot: None,
        }
    }

    /// The shared key set
    pub fn store(&self) -> SharedKeySet {
        Arc::clone(&self.store)
    }

    /// Whether `open` succeeded and `close` was not called since
    pub fn is_open(&self) -> bool {
        self.opened
    }

    fn fail(&self, key: &Key, number: &str, description: &str, reason: String) -> Status {
        warn!(target: "keytree::memory", parent = %key, reason = %reason, "{} failed", description);
        let report = ErrorReport::new(number, description, MODULE_NAME, reason);
        if let Err(err) = report::set_error(key, &report) {
            warn!(target: "keytree::memory", error = %err, "could not attach error report");
        }
        Status::ERROR
    }

    fn ensure_open(&self, stage: Stage, parent: &Key) -> Option<Status> {
        if self.opened {
            return None;
        }
        Some(self.fail(
            parent,
            report::INTERFACE,
            "Interface",
            format!("{} called before open", stage),
        ))
    }
}

/// Same meta names, order and values
fn same_meta(a: &Key, b: &Key) -> bool {
    let (a, b) = (a.metas(), b.metas());
    a.len() == b.len()
        && a.iter()
            .zip(&b)
            .all(|(x, y)| x.name() == y.name() && x.value() == y.value())
}

impl Plugin for MemoryStore {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn info(&self) -> PluginInfo {
        PluginInfo {
            licence: "BSD".to_string(),
            description: "Stores keys in a shared in-process key set".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            provides: vec!["storage".to_string()],
            ..PluginInfo::new(MODULE_NAME)
        }
    }

    fn open(&mut self, error_key: &Key) -> Status {
        let readonly = self.config.get("readonly");
        self.readonly = match readonly.as_deref() {
            None => false,
            Some(TRUE_TOKEN) => true,
            Some(FALSE_TOKEN) => false,
            Some(other) => {
                let reason = format!("readonly must be true or false, got '{}'", other);
                let warning =
                    ErrorReport::new(report::VALIDATION, "Validation", MODULE_NAME, reason);
                if let Err(err) = report::add_warning(error_key, &warning) {
                    warn!(target: "keytree::memory", error = %err, "could not attach warning");
                }
                false
            }
        };
        self.opened = true;
        debug!(target: "keytree::memory", readonly = self.readonly, "opened");
        Status::SUCCESS
    }

    fn get(&mut self, ks: &mut KeySet, parent: &Key) -> Status {
        if let Some(status) = self.ensure_open(Stage::Get, parent) {
            return status;
        }
        let stored = self.store.lock().below(parent);
        let mut added = 0usize;
        for key in stored.iter() {
            let unchanged = ks
                .lookup(key)
                .is_some_and(|existing| existing == *key && same_meta(&existing, key));
            if !unchanged {
                ks.append(key.dup());
                added += 1;
            }
        }
        debug!(target: "keytree::memory", parent = %parent, added, "get");
        if added > 0 {
            Status::SUCCESS
        } else {
            Status::NO_UPDATE
        }
    }

    fn set(&mut self, ks: &mut KeySet, parent: &Key) -> Status {
        if let Some(status) = self.ensure_open(Stage::Set, parent) {
            return status;
        }
        if self.readonly {
            return self.fail(
                parent,
                report::RESOURCE,
                "Resource",
                "store is configured readonly".to_string(),
            );
        }

        let incoming = ks.below(parent).dup();
        let mut store = self.store.lock();
        let previous = store.cut(parent);
        store.append_all(&incoming);
        debug!(
            target: "keytree::memory",
            parent = %parent,
            replaced = previous.len(),
            stored = incoming.len(),
            "set"
        );
        self.snapshot = Some(Snapshot {
            parent: parent.dup(),
            keys: previous,
        });
        Status::SUCCESS
    }

    fn error(&mut self, _ks: &mut KeySet, parent: &Key) -> Status {
        let Some(snapshot) = self.snapshot.take() else {
            trace!(target: "keytree::memory", parent = %parent, "nothing to roll back");
            return Status::NO_UPDATE;
        };
        let mut store = self.store.lock();
        let discarded = store.cut(&snapshot.parent);
        store.append_all(&snapshot.keys);
        debug!(
            target: "keytree::memory",
            parent = %snapshot.parent,
            discarded = discarded.len(),
            restored = snapshot.keys.len(),
            "rolled back"
        );
        Status::SUCCESS
    }

    fn close(&mut self, parent: &Key) -> Status {
        self.snapshot = None;
        self.opened = false;
        debug!(target: "keytree::memory", parent = %parent, "closed");
        Status::SUCCESS
    }
}
