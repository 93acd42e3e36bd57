//! Ordered, name-unique key sets
//!
//! A [`KeySet`] keeps its keys sorted by name in key order (see
//! [`crate::relation::compare`]) and never holds two keys with the same
//! name: appending a key whose name is already present replaces the old
//! entry.
//!
//! Members have their names locked (see [`Key::is_name_locked`]) so the
//! ordering cannot be broken from outside. Because of that ordering, all
//! keys at or below a parent form one contiguous run, which is what
//! [`KeySet::below`] and [`KeySet::cut`] rely on.
//!
//! ## Cursor
//!
//! Besides plain iteration the set carries an internal cursor
//! (`rewind` / `next_key` / `current_key`) for hosts that walk a set and
//! mutate values on the way.

use std::fmt;
use tracing::trace;

use crate::error::Result;
use crate::key::Key;
use crate::name::KeyName;
use crate::relation::{self, Relation};

/// Ordered collection of keys, unique by name
#[derive(Default)]
pub struct KeySet {
    keys: Vec<Key>,
    cursor: Option<usize>,
}

impl KeySet {
    /// Create an empty key set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty key set with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        KeySet {
            keys: Vec::with_capacity(capacity),
            cursor: None,
        }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn position(&self, name: &KeyName) -> std::result::Result<usize, usize> {
        self.keys.binary_search_by(|key| key.with_name(|own| own.cmp(name)))
    }

    /// Insert `key`, replacing a key with the same name
    ///
    /// Returns the new size of the set.
    pub fn append(&mut self, key: Key) -> usize {
        let name = key.key_name();
        match self.position(&name) {
            Ok(index) if self.keys[index].same_identity(&key) => {}
            Ok(index) => {
                trace!(key = %name, "replacing key set entry");
                key.lock_name();
                let old = std::mem::replace(&mut self.keys[index], key);
                old.unlock_name();
            }
            Err(index) => {
                key.lock_name();
                self.keys.insert(index, key);
                self.fix_cursor_after_insert(index);
            }
        }
        self.keys.len()
    }

    /// Insert every key of `other`, sharing the records
    pub fn append_all(&mut self, other: &KeySet) -> usize {
        for key in other.iter() {
            self.append(key.clone());
        }
        self.keys.len()
    }

    /// Remove the key with the given name
    pub fn remove(&mut self, name: &KeyName) -> Option<Key> {
        let index = self.position(name).ok()?;
        let key = self.keys.remove(index);
        key.unlock_name();
        self.fix_cursor_after_removal(index, 1);
        Some(key)
    }

    /// Remove the key with the given raw name
    pub fn remove_by_name(&mut self, name: &str) -> Result<Option<Key>> {
        let name = KeyName::parse(name)?;
        Ok(self.remove(&name))
    }

    /// Key with the same name as `key`
    pub fn lookup(&self, key: &Key) -> Option<Key> {
        self.lookup_name(&key.key_name())
    }

    /// Key with the given name
    pub fn lookup_name(&self, name: &KeyName) -> Option<Key> {
        let index = self.position(name).ok()?;
        Some(self.keys[index].clone())
    }

    /// Key with the given raw name
    ///
    /// Malformed names fail with `InvalidName`; a miss is `Ok(None)`.
    pub fn lookup_by_name(&self, name: &str) -> Result<Option<Key>> {
        let name = KeyName::parse(name)?;
        Ok(self.lookup_name(&name))
    }

    /// Whether a key with the given name is present
    pub fn contains(&self, name: &KeyName) -> bool {
        self.position(name).is_ok()
    }

    /// Every key standing in `relation` to `anchor`, in key order
    pub fn lookup_relation(&self, anchor: &Key, relation: Relation) -> Vec<Key> {
        let anchor = anchor.key_name();
        self.keys
            .iter()
            .filter(|key| key.with_name(|name| relation::relation(&anchor, name)) == relation)
            .cloned()
            .collect()
    }

    fn subtree_range(&self, parent: &KeyName) -> std::ops::Range<usize> {
        let start = self
            .keys
            .partition_point(|key| key.with_name(|name| name < parent));
        let len = self.keys[start..]
            .iter()
            .take_while(|key| key.with_name(|name| relation::is_below_or_same(name, parent)))
            .count();
        start..start + len
    }

    /// Keys at or below `parent`, sharing the records
    pub fn below(&self, parent: &Key) -> KeySet {
        let range = self.subtree_range(&parent.key_name());
        self.keys[range].iter().cloned().collect()
    }

    /// Remove and return the keys at or below `parent`
    pub fn cut(&mut self, parent: &Key) -> KeySet {
        let range = self.subtree_range(&parent.key_name());
        let (start, count) = (range.start, range.len());
        let keys: Vec<Key> = self.keys.drain(range).collect();
        self.fix_cursor_after_removal(start, count);
        // Ownership moves to the new set, so the name locks carry over.
        KeySet { keys, cursor: None }
    }

    /// Replace the whole contents with `other`
    pub fn replace(&mut self, mut other: KeySet) {
        self.clear();
        self.keys = std::mem::take(&mut other.keys);
    }

    /// Remove every key
    pub fn clear(&mut self) {
        for key in self.keys.drain(..) {
            key.unlock_name();
        }
        self.cursor = None;
    }

    /// Deep copy; every key gets a fresh identity
    pub fn dup(&self) -> KeySet {
        self.keys.iter().map(Key::dup).collect()
    }

    /// Keys in key order
    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.keys.iter()
    }

    /// Names in key order
    pub fn names(&self) -> Vec<KeyName> {
        self.keys.iter().map(Key::key_name).collect()
    }

    /// First key in key order
    pub fn head(&self) -> Option<&Key> {
        self.keys.first()
    }

    /// Last key in key order
    pub fn tail(&self) -> Option<&Key> {
        self.keys.last()
    }

    /// Key at `index` in key order
    pub fn at(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    // ========== Cursor ==========

    /// Move the cursor before the first key
    pub fn rewind(&mut self) {
        self.cursor = None;
    }

    /// Advance the cursor and return the key there
    pub fn next_key(&mut self) -> Option<Key> {
        let next = self.cursor.map_or(0, |index| index + 1).min(self.keys.len());
        self.cursor = Some(next);
        self.keys.get(next).cloned()
    }

    /// Key at the cursor; `None` when rewound or exhausted
    pub fn current_key(&self) -> Option<Key> {
        self.cursor.and_then(|index| self.keys.get(index)).cloned()
    }

    fn fix_cursor_after_insert(&mut self, inserted: usize) {
        if let Some(index) = self.cursor {
            if inserted <= index {
                self.cursor = Some(index + 1);
            }
        }
    }

    fn fix_cursor_after_removal(&mut self, start: usize, count: usize) {
        if let Some(index) = self.cursor {
            if index >= start + count {
                self.cursor = Some(index - count);
            } else if index >= start {
                // Step back so the next advance lands on the key after the gap.
                self.cursor = start.checked_sub(1);
            }
        }
    }
}

impl Clone for KeySet {
    fn clone(&self) -> Self {
        for key in &self.keys {
            key.lock_name();
        }
        KeySet {
            keys: self.keys.clone(),
            cursor: self.cursor,
        }
    }
}

impl Drop for KeySet {
    fn drop(&mut self) {
        for key in &self.keys {
            key.unlock_name();
        }
    }
}

impl fmt::Debug for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys.iter()).finish()
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut set = KeySet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Key> for KeySet {
    fn extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) {
        for key in iter {
            self.append(key);
        }
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}
