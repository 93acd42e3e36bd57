//! Core types for keytree
//!
//! This crate defines the configuration key model:
//! - KeyName: canonical hierarchical names with escaping and namespaces
//! - Relation: how two names stand to each other in the hierarchy
//! - Key: shared key records with a value and per-key metadata
//! - KeyValue: typed reading and writing of key values
//! - KeySet: ordered, name-unique collections of keys
//! - Limits: bounds applied while parsing names
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod convert;
pub mod error;
pub mod key;
pub mod keyset;
pub mod limits;
pub mod meta;
pub mod name;
pub mod relation;

pub use builder::{KeyBuilder, KeyOption};
pub use convert::{KeyValue, FALSE_TOKEN, TRUE_TOKEN};
pub use error::{Error, NameError, Result};
pub use key::{Key, KeyHandle, KeyId};
pub use keyset::KeySet;
pub use limits::Limits;
pub use meta::{meta_name, MetaCursor, MetaRegistry};
pub use name::{KeyName, NameSegments, Namespace};
pub use relation::Relation;
