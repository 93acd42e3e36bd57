//! Typed access to key values
//!
//! Values are stored as text. [`KeyValue`] describes how a type is written
//! to and read back from that text:
//!
//! - `bool`: `"true"` reads as true, any other text as false
//! - `i8`..`i64`: base-10; out-of-range or malformed text fails
//! - `f32`, `f64`: decimal; overflow saturates to infinity
//!
//! Getters fail with `ValueConversion`; setters always succeed.

use crate::error::{Error, Result};
use crate::key::Key;

/// Canonical true token
pub const TRUE_TOKEN: &str = "true";

/// Canonical false token
pub const FALSE_TOKEN: &str = "false";

/// A type that can be stored in and read from a key value
pub trait KeyValue: Sized {
    /// Type name reported in conversion errors
    const TYPE_NAME: &'static str;

    /// Text form stored in the key
    fn to_key_string(&self) -> String;

    /// Parse the stored text, `None` when it does not represent a value
    fn from_key_str(text: &str) -> Option<Self>;
}

impl KeyValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn to_key_string(&self) -> String {
        let token = if *self { TRUE_TOKEN } else { FALSE_TOKEN };
        token.to_string()
    }

    fn from_key_str(text: &str) -> Option<Self> {
        Some(text == TRUE_TOKEN)
    }
}

macro_rules! impl_key_value_parse {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl KeyValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn to_key_string(&self) -> String {
                    self.to_string()
                }

                fn from_key_str(text: &str) -> Option<Self> {
                    text.parse().ok()
                }
            }
        )*
    };
}

impl_key_value_parse! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    f32 => "f32",
    f64 => "f64",
}

impl Key {
    /// Read the value as `T`
    pub fn get<T: KeyValue>(&self) -> Result<T> {
        let text = self.string();
        T::from_key_str(&text).ok_or_else(|| Error::conversion(T::TYPE_NAME, text))
    }

    /// Store `value` as text
    pub fn set<T: KeyValue>(&self, value: T) {
        self.set_string(&value.to_key_string());
    }

    /// Value as boolean; only `"true"` is true
    pub fn get_bool(&self) -> bool {
        self.string() == TRUE_TOKEN
    }

    /// Store a boolean as `"true"` or `"false"`
    pub fn set_bool(&self, value: bool) {
        self.set(value);
    }

    /// Value as 8-bit signed integer
    pub fn get_i8(&self) -> Result<i8> {
        self.get()
    }

    /// Store an 8-bit signed integer
    pub fn set_i8(&self, value: i8) {
        self.set(value);
    }

    /// Value as 16-bit signed integer
    pub fn get_i16(&self) -> Result<i16> {
        self.get()
    }

    /// Store a 16-bit signed integer
    pub fn set_i16(&self, value: i16) {
        self.set(value);
    }

    /// Value as 32-bit signed integer
    pub fn get_i32(&self) -> Result<i32> {
        self.get()
    }

    /// Store a 32-bit signed integer
    pub fn set_i32(&self, value: i32) {
        self.set(value);
    }

    /// Value as 64-bit signed integer
    pub fn get_i64(&self) -> Result<i64> {
        self.get()
    }

    /// Store a 64-bit signed integer
    pub fn set_i64(&self, value: i64) {
        self.set(value);
    }

    /// Value as single precision float
    pub fn get_f32(&self) -> Result<f32> {
        self.get()
    }

    /// Store a single precision float
    pub fn set_f32(&self, value: f32) {
        self.set(value);
    }

    /// Value as double precision float
    pub fn get_f64(&self) -> Result<f64> {
        self.get()
    }

    /// Store a double precision float
    pub fn set_f64(&self, value: f64) {
        self.set(value);
    }
}
