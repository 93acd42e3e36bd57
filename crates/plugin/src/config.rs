//! Plugin configuration
//!
//! A plugin receives its configuration as a cascading key set
//! (`/from`, `/to`, `/readonly`, ...). Hosts usually write it as TOML:
//!
//! ```toml
//! from = "ISO-8859-1"
//! to = "UTF-8"
//!
//! [cache]
//! size = 128
//! paths = ["/tmp", "/var/tmp"]
//! ```
//!
//! Tables become path segments, scalars become string values (booleans as
//! `true` / `false`), and array elements become the segments `#0`, `#1`, ...
//! The example yields `/from`, `/to`, `/cache/size`, `/cache/paths/#0` and
//! `/cache/paths/#1`.

use std::path::{Path, PathBuf};
use thiserror::Error;

use keytree_core::{meta_name, Key, KeyName, KeySet, FALSE_TOKEN, TRUE_TOKEN};

/// Errors that can occur while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file '{}': {source}", .path.display())]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A table or entry name does not form a valid key name
    #[error("invalid config key: {0}")]
    Key(#[from] keytree_core::Error),
}

/// Configuration of one plugin instance
#[derive(Debug, Clone, Default)]
pub struct PluginConfig {
    keys: KeySet,
}

impl PluginConfig {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing key set
    pub fn from_keyset(keys: KeySet) -> Self {
        PluginConfig { keys }
    }

    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = text.parse()?;
        let mut keys = KeySet::new();
        flatten_table(&KeyName::cascading_root(), &table, &mut keys)?;
        Ok(PluginConfig { keys })
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Configuration keys
    pub fn keyset(&self) -> &KeySet {
        &self.keys
    }

    /// Consume and return the configuration keys
    pub fn into_keyset(self) -> KeySet {
        self.keys
    }

    /// Whether no entries are configured
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Entry value; names without a root are taken below `/`
    pub fn get(&self, name: &str) -> Option<String> {
        let name = meta_name(name).ok()?;
        self.keys.lookup_name(&name).map(|key| key.string())
    }

    /// Whether the entry is exactly `true`
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).as_deref() == Some(TRUE_TOKEN)
    }

    /// Set an entry
    pub fn set(&mut self, name: &str, value: &str) -> keytree_core::Result<()> {
        let key = Key::from_name(meta_name(name)?);
        key.set_string(value);
        self.keys.append(key);
        Ok(())
    }
}

fn child(parent: &KeyName, segment: &str) -> keytree_core::Result<KeyName> {
    KeyName::from_segments(parent.segments().chain(std::iter::once(segment)))
}

fn flatten_table(
    parent: &KeyName,
    table: &toml::Table,
    keys: &mut KeySet,
) -> keytree_core::Result<()> {
    for (name, value) in table {
        flatten_value(child(parent, name)?, value, keys)?;
    }
    Ok(())
}

fn flatten_value(name: KeyName, value: &toml::Value, keys: &mut KeySet) -> keytree_core::Result<()> {
    let text = match value {
        toml::Value::Table(table) => return flatten_table(&name, table, keys),
        toml::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(child(&name, &format!("#{}", index))?, item, keys)?;
            }
            return Ok(());
        }
        toml::Value::String(text) => text.clone(),
        toml::Value::Boolean(true) => TRUE_TOKEN.to_string(),
        toml::Value::Boolean(false) => FALSE_TOKEN.to_string(),
        toml::Value::Integer(number) => number.to_string(),
        toml::Value::Float(number) => number.to_string(),
        toml::Value::Datetime(datetime) => datetime.to_string(),
    };
    let key = Key::from_name(name);
    key.set_string(&text);
    keys.append(key);
    Ok(())
}
