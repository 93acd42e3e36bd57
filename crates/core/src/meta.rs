//! Per-key metadata
//!
//! Metadata is a small registry of meta keys, unique by name and kept in
//! insertion order. Meta names are hierarchical names; a name given without
//! a root is taken relative to the cascading root (`comment` → `/comment`).
//!
//! Iteration position lives in a [`MetaCursor`] owned by each `Key` handle,
//! so two handles sharing one record iterate independently.

use crate::error::{Error, NameError, Result};
use crate::key::Key;
use crate::name::{KeyName, SEPARATOR};

/// Resolve a meta name, rooting relative names at `/`
pub fn meta_name(raw: &str) -> Result<KeyName> {
    match KeyName::parse(raw) {
        Err(Error::InvalidName {
            reason: NameError::MissingRoot,
            ..
        }) => KeyName::parse(&format!("{}{}", SEPARATOR, raw)),
        other => other,
    }
}

/// Insertion-ordered, name-unique collection of meta keys
///
/// Entries have their names locked while they are registered.
#[derive(Debug, Default)]
pub struct MetaRegistry {
    entries: Vec<Key>,
}

impl MetaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the given name
    pub fn get(&self, name: &KeyName) -> Option<&Key> {
        self.entries.iter().find(|entry| entry.has_name(name))
    }

    /// Entry at an enumeration position
    pub fn at(&self, index: usize) -> Option<&Key> {
        self.entries.get(index)
    }

    /// Insert `entry`, replacing a same-named entry in place
    pub fn insert(&mut self, entry: Key) {
        let name = entry.key_name();
        entry.lock_name();
        match self.entries.iter().position(|e| e.has_name(&name)) {
            Some(index) => {
                let old = std::mem::replace(&mut self.entries[index], entry);
                old.unlock_name();
            }
            None => self.entries.push(entry),
        }
    }

    /// Remove and return the entry with the given name
    pub fn remove(&mut self, name: &KeyName) -> Option<Key> {
        let index = self.entries.iter().position(|e| e.has_name(name))?;
        let entry = self.entries.remove(index);
        entry.unlock_name();
        Some(entry)
    }

    /// Entries in enumeration order
    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.entries.iter()
    }
}

impl Drop for MetaRegistry {
    fn drop(&mut self) {
        for entry in &self.entries {
            entry.unlock_name();
        }
    }
}

impl<'a> IntoIterator for &'a MetaRegistry {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Enumeration position over a [`MetaRegistry`]
///
/// A rewound cursor sits before the first entry. `current` on a rewound
/// cursor settles on the first entry; `next` advances then returns.
/// Running past the end yields `None` until the next rewind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetaCursor {
    position: Option<usize>,
}

impl MetaCursor {
    /// Move before the first entry
    pub fn rewind(&mut self) {
        self.position = None;
    }

    /// Current position, `None` when rewound
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Entry at the cursor, without advancing
    pub fn current<'a>(&mut self, registry: &'a MetaRegistry) -> Option<&'a Key> {
        if self.position.is_none() && !registry.is_empty() {
            self.position = Some(0);
        }
        self.position.and_then(|index| registry.at(index))
    }

    /// Advance, then return the entry at the new position
    pub fn advance<'a>(&mut self, registry: &'a MetaRegistry) -> Option<&'a Key> {
        let next = self.position.map_or(0, |index| index + 1).min(registry.len());
        self.position = Some(next);
        registry.at(next)
    }
}
