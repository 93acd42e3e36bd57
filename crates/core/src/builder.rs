//! Key construction
//!
//! Keys are built from a name plus a list of tagged options:
//!
//! ```
//! use keytree_core::{Key, KeyOption};
//!
//! let key = Key::create(
//!     "/key_test/1/key_name",
//!     [KeyOption::Value("key_value_1".into()), KeyOption::End],
//! )
//! .unwrap();
//! assert_eq!(key.string(), "key_value_1");
//!
//! let key = Key::builder("user/app/colour")
//!     .value("blue")
//!     .meta("comment", "favourite")
//!     .build()
//!     .unwrap();
//! assert_eq!(key.meta_string("comment").as_deref(), Some("favourite"));
//! ```

use crate::error::{Error, Result};
use crate::key::Key;
use crate::name::KeyName;

/// A tagged construction option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOption {
    /// Text value
    Value(String),
    /// Binary value
    Binary(Vec<u8>),
    /// Meta entry (name, value)
    Meta(String, String),
    /// Shorthand for the `comment` meta entry
    Comment(String),
    /// Terminator; options after it are ignored
    End,
}

impl KeyOption {
    /// Parse a textual tag
    ///
    /// Known tags are `value`, `binary`, `comment`, `end` and `meta:<name>`.
    pub fn from_tag(tag: &str, value: &str) -> Result<KeyOption> {
        match tag {
            "value" => Ok(KeyOption::Value(value.to_string())),
            "binary" => Ok(KeyOption::Binary(value.as_bytes().to_vec())),
            "comment" => Ok(KeyOption::Comment(value.to_string())),
            "end" => Ok(KeyOption::End),
            _ => match tag.strip_prefix("meta:") {
                Some(name) if !name.is_empty() => {
                    Ok(KeyOption::Meta(name.to_string(), value.to_string()))
                }
                _ => Err(Error::UnknownOption {
                    tag: tag.to_string(),
                }),
            },
        }
    }
}

/// Builder for a [`Key`]
#[derive(Debug)]
#[must_use]
pub struct KeyBuilder {
    name: Result<KeyName>,
    options: Vec<KeyOption>,
}

impl KeyBuilder {
    /// Set a text value
    pub fn value(self, value: impl Into<String>) -> Self {
        self.option(KeyOption::Value(value.into()))
    }

    /// Set a binary value
    pub fn binary(self, value: impl Into<Vec<u8>>) -> Self {
        self.option(KeyOption::Binary(value.into()))
    }

    /// Add a meta entry
    pub fn meta(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.option(KeyOption::Meta(name.into(), value.into()))
    }

    /// Apply a tagged option
    pub fn option(mut self, option: KeyOption) -> Self {
        self.options.push(option);
        self
    }

    /// Build the key
    ///
    /// Fails when the name or a meta name is invalid.
    pub fn build(self) -> Result<Key> {
        let key = Key::from_name(self.name?);
        for option in self.options {
            match option {
                KeyOption::Value(value) => key.set_string(&value),
                KeyOption::Binary(value) => key.set_binary(value),
                KeyOption::Meta(name, value) => key.set_meta(&name, &value)?,
                KeyOption::Comment(value) => key.set_meta("comment", &value)?,
                KeyOption::End => break,
            }
        }
        Ok(key)
    }
}

impl Key {
    /// Start building a key
    pub fn builder(name: &str) -> KeyBuilder {
        KeyBuilder {
            name: KeyName::parse(name),
            options: Vec::new(),
        }
    }

    /// Create a key from a name and a list of tagged options
    pub fn create<I>(name: &str, options: I) -> Result<Key>
    where
        I: IntoIterator<Item = KeyOption>,
    {
        options
            .into_iter()
            .fold(Key::builder(name), KeyBuilder::option)
            .build()
    }
}
