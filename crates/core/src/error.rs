//! Error types for keytree
//!
//! This module defines all error types used by the key model.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Lookup misses are not errors: key set and metadata lookups return
//! `Option` and report absence as `None`.

use thiserror::Error;

/// Result type alias for keytree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the key model
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A raw name could not be parsed into a canonical key name
    #[error("Invalid key name '{name}': {reason}")]
    InvalidName {
        /// The rejected input
        name: String,
        /// Why it was rejected
        reason: NameError,
    },

    /// A key value could not be converted to the requested type
    #[error("Cannot convert value '{value}' to {target}")]
    ValueConversion {
        /// Name of the requested type (e.g. `i16`)
        target: &'static str,
        /// The textual value that failed to convert
        value: String,
    },

    /// The key is a member of a key set, so its name cannot change
    #[error("Key name is locked while the key is in a key set: {name}")]
    NameLocked {
        /// Canonical name of the locked key
        name: String,
    },

    /// A construction option tag is not recognized
    #[error("Unknown key option: {tag}")]
    UnknownOption {
        /// The rejected tag
        tag: String,
    },
}

impl Error {
    /// Build an `InvalidName` error for `name`
    pub fn invalid_name(name: impl Into<String>, reason: NameError) -> Self {
        Error::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Build a `ValueConversion` error
    pub fn conversion(target: &'static str, value: impl Into<String>) -> Self {
        Error::ValueConversion {
            target,
            value: value.into(),
        }
    }

    /// Whether this is an `InvalidName` error
    pub fn is_invalid_name(&self) -> bool {
        matches!(self, Error::InvalidName { .. })
    }

    /// Whether this is a `ValueConversion` error
    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::ValueConversion { .. })
    }
}

/// Key name validation errors
///
/// Each variant carries a stable reason code (see [`NameError::reason_code`]).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    /// Name is empty
    #[error("name cannot be empty")]
    Empty,

    /// Name starts with neither `/` nor a known namespace
    #[error("name must start with '/' or a namespace")]
    MissingRoot,

    /// Name ends in a single escape character
    #[error("dangling escape character at byte {position}")]
    DanglingEscape {
        /// Byte offset of the escape character
        position: usize,
    },

    /// Escape character followed by a character that cannot be escaped
    #[error("invalid escape sequence at byte {position}")]
    InvalidEscape {
        /// Byte offset of the escape character
        position: usize,
    },

    /// Name exceeds maximum length
    #[error("name too long: {actual} bytes exceeds maximum {max}")]
    TooLong {
        /// Actual length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Name has more segments than allowed
    #[error("name too deep: {actual} segments exceeds maximum {max}")]
    TooDeep {
        /// Actual number of segments
        actual: usize,
        /// Maximum allowed number of segments
        max: usize,
    },

    /// The operation needs a base name, but the name is only a root
    #[error("name has no base name below its root")]
    RootOnly,
}

impl NameError {
    /// Get the machine-readable reason code
    pub fn reason_code(&self) -> &'static str {
        match self {
            NameError::Empty => "empty_name",
            NameError::MissingRoot => "missing_root",
            NameError::DanglingEscape { .. } => "dangling_escape",
            NameError::InvalidEscape { .. } => "invalid_escape",
            NameError::TooLong { .. } => "name_too_long",
            NameError::TooDeep { .. } => "name_too_deep",
            NameError::RootOnly => "root_only",
        }
    }
}
