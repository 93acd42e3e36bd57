//! Error and warning reporting on keys
//!
//! Plugins have no return channel besides their [`Status`](crate::Status),
//! so failure details travel as metadata on the key the stage was given:
//!
//! ```text
//! error               = <number>
//! error/number        = <number>
//! error/description   = <description>
//! error/module        = <module>
//! error/reason        = <reason>
//!
//! warnings            = #NN          (last index written)
//! warnings/#NN/number = ...
//! ```
//!
//! Warning indices run `#00` to `#99` and wrap around.

use keytree_core::{Key, Result};

/// Resource could not be accessed
pub const RESOURCE: &str = "C01100";
/// Plugin is misconfigured or missing
pub const INSTALLATION: &str = "C01310";
/// Internal logic error
pub const LOGICAL: &str = "C01320";
/// Stage called out of order
pub const INTERFACE: &str = "C01330";
/// Configuration or value failed validation
pub const VALIDATION: &str = "C03200";

const MAX_WARNINGS: usize = 100;

const FIELDS: [&str; 4] = ["number", "description", "module", "reason"];

/// One error or warning
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorReport {
    /// Error code, e.g. [`RESOURCE`]
    pub number: String,
    /// Short description of the error class
    pub description: String,
    /// Reporting module
    pub module: String,
    /// Human readable reason
    pub reason: String,
}

impl ErrorReport {
    /// Create a report
    pub fn new(
        number: impl Into<String>,
        description: impl Into<String>,
        module: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ErrorReport {
            number: number.into(),
            description: description.into(),
            module: module.into(),
            reason: reason.into(),
        }
    }

    fn fields(&self) -> [&str; 4] {
        [&self.number, &self.description, &self.module, &self.reason]
    }

    fn write(&self, key: &Key, prefix: &str) -> Result<()> {
        for (field, value) in FIELDS.iter().zip(self.fields()) {
            key.set_meta(&format!("{}/{}", prefix, field), value)?;
        }
        Ok(())
    }

    fn read(key: &Key, prefix: &str) -> Option<ErrorReport> {
        let field = |name: &str| key.meta_string(&format!("{}/{}", prefix, name));
        Some(ErrorReport {
            number: field("number")?,
            description: field("description").unwrap_or_default(),
            module: field("module").unwrap_or_default(),
            reason: field("reason").unwrap_or_default(),
        })
    }
}

/// Record `report` as the error of `key`, replacing a previous one
pub fn set_error(key: &Key, report: &ErrorReport) -> Result<()> {
    key.set_meta("error", &report.number)?;
    report.write(key, "error")
}

/// Whether `key` carries an error
pub fn has_error(key: &Key) -> bool {
    key.meta("error").is_some()
}

/// The error recorded on `key`
pub fn error_report(key: &Key) -> Option<ErrorReport> {
    ErrorReport::read(key, "error")
}

/// Remove the error entries from `key`; warnings stay
pub fn clear_error(key: &Key) -> Result<()> {
    key.remove_meta("error")?;
    for field in FIELDS {
        key.remove_meta(&format!("error/{}", field))?;
    }
    Ok(())
}

fn warning_prefix(index: usize) -> String {
    format!("warnings/#{:02}", index)
}

fn last_warning(key: &Key) -> Option<usize> {
    key.meta_string("warnings")?
        .strip_prefix('#')?
        .parse()
        .ok()
}

/// Append a warning to `key`, returning its index
pub fn add_warning(key: &Key, report: &ErrorReport) -> Result<usize> {
    let index = last_warning(key).map_or(0, |last| (last + 1) % MAX_WARNINGS);
    let prefix = warning_prefix(index);
    report.write(key, &prefix)?;
    key.set_meta("warnings", &format!("#{:02}", index))?;
    Ok(index)
}

/// Warnings recorded on `key`, by index
pub fn warnings(key: &Key) -> Vec<ErrorReport> {
    if last_warning(key).is_none() {
        return Vec::new();
    }
    (0..MAX_WARNINGS)
        .filter_map(|index| ErrorReport::read(key, &warning_prefix(index)))
        .collect()
}
