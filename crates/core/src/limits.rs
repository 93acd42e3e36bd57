//! Size limits for key names
//!
//! Limits are enforced whenever a raw name is parsed. Violations surface as
//! `InvalidName` errors carrying a `TooLong` or `TooDeep` reason.
//!
//! `Limits` deserializes with serde so hosts can keep it in their own
//! configuration files; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

use crate::error::NameError;

/// Default maximum canonical name length in bytes
pub const DEFAULT_MAX_NAME_BYTES: usize = 64 * 1024;

/// Default maximum number of segments (root marker included)
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Size limits for key names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum raw name length in bytes (default: 64KB)
    pub max_name_bytes: usize,

    /// Maximum number of segments, root marker included (default: 1024)
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_name_bytes: DEFAULT_MAX_NAME_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_name_bytes: 64,
            max_depth: 8,
        }
    }

    /// Validate a raw name length
    pub fn validate_name_length(&self, raw: &str) -> Result<(), NameError> {
        let len = raw.len();
        if len > self.max_name_bytes {
            return Err(NameError::TooLong {
                actual: len,
                max: self.max_name_bytes,
            });
        }
        Ok(())
    }

    /// Validate a segment count
    pub fn validate_depth(&self, depth: usize) -> Result<(), NameError> {
        if depth > self.max_depth {
            return Err(NameError::TooDeep {
                actual: depth,
                max: self.max_depth,
            });
        }
        Ok(())
    }
}
