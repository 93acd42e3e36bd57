//! Keys
//!
//! A [`Key`] is a handle to a shared, reference-counted key record holding
//! a canonical name, a value and a metadata registry. Cloning a handle (or
//! re-wrapping its [`KeyHandle`]) shares the record: both handles see every
//! change and report the same [`KeyId`]. [`Key::dup`] makes an independent
//! deep copy.
//!
//! ## Name lock
//!
//! While a key belongs to a key set (or a metadata registry) its name is
//! locked, because those containers are ordered or indexed by name. Renames
//! then fail with `NameLocked`. Values and metadata stay mutable.
//!
//! ## Values
//!
//! The value is a byte payload. [`Key::set_string`] stores text and
//! [`Key::set_binary`] stores raw bytes and flags the key binary. The
//! reported size of a string value counts one terminator unit.

use parking_lot::RwLock;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::meta::{meta_name, MetaCursor, MetaRegistry};
use crate::name::{KeyName, NameSegments, Namespace};
use crate::relation::{self, Relation};

#[derive(Debug)]
pub(crate) struct KeyRecord {
    name: KeyName,
    value: Vec<u8>,
    binary: bool,
    meta: MetaRegistry,
    locks: usize,
}

impl KeyRecord {
    fn new(name: KeyName) -> Self {
        KeyRecord {
            name,
            value: Vec::new(),
            binary: false,
            meta: MetaRegistry::new(),
            locks: 0,
        }
    }

    fn check_unlocked(&self) -> Result<()> {
        if self.locks > 0 {
            return Err(Error::NameLocked {
                name: self.name.to_string(),
            });
        }
        Ok(())
    }
}

/// Opaque shared reference to a key record
#[derive(Clone)]
pub struct KeyHandle(Arc<RwLock<KeyRecord>>);

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHandle({:?})", self.0.read().name)
    }
}

/// Identity token of a key record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(usize);

/// Handle to a key record
#[derive(Clone)]
pub struct Key {
    record: Arc<RwLock<KeyRecord>>,
    cursor: MetaCursor,
}

impl Key {
    /// Create a key with an empty string value
    pub fn new(name: &str) -> Result<Key> {
        Ok(Key::from_name(KeyName::parse(name)?))
    }

    /// Create a key from an already parsed name
    pub fn from_name(name: KeyName) -> Key {
        Key {
            record: Arc::new(RwLock::new(KeyRecord::new(name))),
            cursor: MetaCursor::default(),
        }
    }

    /// Wrap an existing record
    pub fn from_handle(handle: KeyHandle) -> Key {
        Key {
            record: handle.0,
            cursor: MetaCursor::default(),
        }
    }

    /// Shared reference to this key's record
    pub fn handle(&self) -> KeyHandle {
        KeyHandle(Arc::clone(&self.record))
    }

    /// Identity token; equal for handles sharing a record
    pub fn id(&self) -> KeyId {
        KeyId(Arc::as_ptr(&self.record) as *const () as usize)
    }

    /// Whether both handles share one record
    pub fn same_identity(&self, other: &Key) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }

    /// Deep copy with a fresh identity
    ///
    /// The copy's name is unlocked and its metadata entries are copies too.
    pub fn dup(&self) -> Key {
        let record = self.record.read();
        let mut meta = MetaRegistry::new();
        for entry in record.meta.iter() {
            meta.insert(entry.dup());
        }
        let copy = KeyRecord {
            name: record.name.clone(),
            value: record.value.clone(),
            binary: record.binary,
            meta,
            locks: 0,
        };
        Key {
            record: Arc::new(RwLock::new(copy)),
            cursor: MetaCursor::default(),
        }
    }

    // ========== Name ==========

    /// Canonical name
    pub fn name(&self) -> String {
        self.record.read().name.to_string()
    }

    /// Parsed name
    pub fn key_name(&self) -> KeyName {
        self.record.read().name.clone()
    }

    pub(crate) fn with_name<R>(&self, f: impl FnOnce(&KeyName) -> R) -> R {
        f(&self.record.read().name)
    }

    pub(crate) fn has_name(&self, name: &KeyName) -> bool {
        self.with_name(|own| own == name)
    }

    /// Replace the whole name
    ///
    /// Fails with `InvalidName` for malformed input and with `NameLocked`
    /// while the key is in a key set. The name is unchanged on error.
    pub fn set_name(&self, name: &str) -> Result<()> {
        let parsed = KeyName::parse(name)?;
        let mut record = self.record.write();
        if let Err(err) = record.check_unlocked() {
            debug!(key = %record.name, requested = name, "rejected rename of locked key");
            return Err(err);
        }
        record.name = parsed;
        Ok(())
    }

    /// Unescaped last segment
    pub fn base_name(&self) -> String {
        self.record.read().name.base_name().to_string()
    }

    /// Replace the last segment, taking `base` literally
    pub fn set_base_name(&self, base: &str) -> Result<()> {
        let mut record = self.record.write();
        record.check_unlocked()?;
        record.name.set_base_name(base)
    }

    /// Append the segments parsed from `relative`
    pub fn add_base_name(&self, relative: &str) -> Result<()> {
        let mut record = self.record.write();
        record.check_unlocked()?;
        record.name.add_base_name(relative)
    }

    /// Canonical name length plus one terminator unit
    pub fn name_size(&self) -> usize {
        self.record.read().name.size()
    }

    /// Namespace of the name
    pub fn namespace(&self) -> Namespace {
        self.record.read().name.namespace()
    }

    /// Unescaped name segments, root marker first
    pub fn segments(&self) -> NameSegments {
        self.key_name().into_iter()
    }

    /// Whether the name is locked by a container
    pub fn is_name_locked(&self) -> bool {
        self.record.read().locks > 0
    }

    pub(crate) fn lock_name(&self) {
        self.record.write().locks += 1;
    }

    pub(crate) fn unlock_name(&self) {
        let mut record = self.record.write();
        record.locks = record.locks.saturating_sub(1);
    }

    // ========== Value ==========

    /// Raw value bytes
    pub fn value(&self) -> Vec<u8> {
        self.record.read().value.clone()
    }

    /// Value as text (invalid UTF-8 is replaced)
    pub fn string(&self) -> String {
        String::from_utf8_lossy(&self.record.read().value).into_owned()
    }

    /// Store a text value
    pub fn set_string(&self, value: &str) {
        let mut record = self.record.write();
        record.value = value.as_bytes().to_vec();
        record.binary = false;
    }

    /// Store text already encoded in a non-UTF-8 charset
    ///
    /// The key stays a string key; [`Key::string`] decodes lossily.
    pub fn set_encoded_string(&self, value: impl Into<Vec<u8>>) {
        let mut record = self.record.write();
        record.value = value.into();
        record.binary = false;
    }

    /// Store a binary value
    pub fn set_binary(&self, value: impl Into<Vec<u8>>) {
        let mut record = self.record.write();
        record.value = value.into();
        record.binary = true;
    }

    /// Whether the value was stored as binary
    pub fn is_binary(&self) -> bool {
        self.record.read().binary
    }

    /// Whether the value was stored as text
    pub fn is_string(&self) -> bool {
        !self.is_binary()
    }

    /// Value size; text values count one terminator unit
    pub fn value_size(&self) -> usize {
        let record = self.record.read();
        if record.binary {
            record.value.len()
        } else {
            record.value.len() + 1
        }
    }

    // ========== Metadata ==========

    /// Meta key with the given name
    ///
    /// A name that cannot be parsed matches no entry.
    pub fn meta(&self, name: &str) -> Option<Key> {
        let name = meta_name(name).ok()?;
        self.record.read().meta.get(&name).cloned()
    }

    /// Text value of a meta key
    pub fn meta_string(&self, name: &str) -> Option<String> {
        self.meta(name).map(|entry| entry.string())
    }

    /// Set a meta entry, replacing an existing one in place
    pub fn set_meta(&self, name: &str, value: &str) -> Result<()> {
        let entry = Key::from_name(meta_name(name)?);
        entry.set_string(value);
        self.record.write().meta.insert(entry);
        Ok(())
    }

    /// Remove a meta entry
    pub fn remove_meta(&self, name: &str) -> Result<Option<Key>> {
        let name = meta_name(name)?;
        Ok(self.record.write().meta.remove(&name))
    }

    /// Number of meta entries
    pub fn meta_count(&self) -> usize {
        self.record.read().meta.len()
    }

    /// Meta entries in enumeration order
    pub fn metas(&self) -> Vec<Key> {
        self.record.read().meta.iter().cloned().collect()
    }

    /// Copy one meta entry from `source`
    ///
    /// When `source` has no such entry, the entry is removed here too.
    pub fn copy_meta(&self, source: &Key, name: &str) -> Result<()> {
        let name = meta_name(name)?;
        let copied = source.record.read().meta.get(&name).map(Key::dup);
        let mut record = self.record.write();
        match copied {
            Some(entry) => record.meta.insert(entry),
            None => {
                record.meta.remove(&name);
            }
        }
        Ok(())
    }

    /// Copy every meta entry of `source`, in its enumeration order
    ///
    /// Same-named entries are replaced in place; `source` is not modified.
    pub fn copy_all_meta(&self, source: &Key) {
        let copied: Vec<Key> = source.record.read().meta.iter().map(Key::dup).collect();
        let mut record = self.record.write();
        for entry in copied {
            record.meta.insert(entry);
        }
    }

    /// Reset the meta cursor before the first entry
    pub fn rewind_meta(&mut self) {
        self.cursor.rewind();
    }

    /// Meta entry at the cursor
    pub fn current_meta(&mut self) -> Option<Key> {
        let record = self.record.read();
        self.cursor.current(&record.meta).cloned()
    }

    /// Advance the meta cursor and return the entry there
    pub fn next_meta(&mut self) -> Option<Key> {
        let record = self.record.read();
        self.cursor.advance(&record.meta).cloned()
    }

    // ========== Relations ==========

    fn with_names<R>(&self, other: &Key, f: impl FnOnce(&KeyName, &KeyName) -> R) -> R {
        let own = self.key_name();
        other.with_name(|theirs| f(&own, theirs))
    }

    /// Order of the two names
    pub fn compare(&self, other: &Key) -> Ordering {
        self.with_names(other, relation::compare)
    }

    /// Relation of `other` to this key
    pub fn rel(&self, other: &Key) -> Relation {
        self.with_names(other, relation::relation)
    }

    /// This key lies strictly below `other`
    pub fn is_below(&self, other: &Key) -> bool {
        self.with_names(other, relation::is_below)
    }

    /// This key equals `other` or lies below it
    pub fn is_below_or_same(&self, other: &Key) -> bool {
        self.with_names(other, relation::is_below_or_same)
    }

    /// This key lies exactly one level below `other`
    pub fn is_direct_below(&self, other: &Key) -> bool {
        self.with_names(other, relation::is_direct_below)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record.read();
        let mut out = f.debug_struct("Key");
        out.field("name", &record.name);
        if record.binary {
            out.field("binary", &record.value.len());
        } else {
            out.field("value", &String::from_utf8_lossy(&record.value));
        }
        out.field("meta", &record.meta.len()).finish()
    }
}

/// Value equality: same name, same value bytes and same binary flag
///
/// Metadata and identity are not compared; see [`Key::same_identity`].
impl PartialEq for Key {
    fn eq(&self, other: &Key) -> bool {
        if self.same_identity(other) {
            return true;
        }
        let (name, value, binary) = {
            let record = self.record.read();
            (record.name.clone(), record.value.clone(), record.binary)
        };
        let other = other.record.read();
        other.name == name && other.value == value && other.binary == binary
    }
}

impl Eq for Key {}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.record.read().name)
    }
}
