//! Charset conversion filter
//!
//! [`Iconv`] converts string values and the `comment` meta entry between the
//! application charset (`/from`) and the storage charset (`/to`):
//!
//! - `get` converts stored text from `to` into `from`
//! - `set` converts application text from `from` into `to`
//! - `error` converts a set key set back into `from`
//!
//! Binary values are left alone; their comments are still converted. When
//! both charsets resolve to the same encoding every stage is a no-op.
//!
//! A stage converts every key or none: on the first failure the key set is
//! left as it was and the error is reported on the parent key.
//!
//! Charset names are WHATWG encoding labels (`UTF-8`, `ISO-8859-1`,
//! `Shift_JIS`, ...). Both default to `UTF-8`.

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

use keytree_core::{Key, KeySet};

use crate::config::PluginConfig;
use crate::info::PluginInfo;
use crate::plugin::{Plugin, Stage};
use crate::report::{self, ErrorReport};
use crate::status::Status;

/// Module name of the charset filter
pub const MODULE_NAME: &str = "iconv";

const COMMENT: &str = "comment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Charsets {
    from: &'static Encoding,
    to: &'static Encoding,
}

/// Filter plugin converting text between two charsets
pub struct Iconv {
    config: PluginConfig,
    charsets: Option<Charsets>,
}

impl Iconv {
    /// Create a filter; charsets are resolved in `open`
    pub fn new(config: PluginConfig) -> Self {
        Iconv {
            config,
            charsets: None,
        }
    }

    /// Canonical name of the application charset, once opened
    pub fn from_charset(&self) -> Option<&'static str> {
        self.charsets.map(|charsets| charsets.from.name())
    }

    /// Canonical name of the storage charset, once opened
    pub fn to_charset(&self) -> Option<&'static str> {
        self.charsets.map(|charsets| charsets.to.name())
    }

    /// Whether the stages rewrite anything
    pub fn needs_conversion(&self) -> bool {
        self.charsets
            .is_some_and(|charsets| charsets.from != charsets.to)
    }

    fn resolve(&self, entry: &str) -> Result<&'static Encoding, String> {
        let label = self
            .config
            .get(entry)
            .unwrap_or_else(|| UTF_8.name().to_string());
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| format!("unknown charset '{}' in /{}", label, entry))?;
        if encoding.output_encoding() != encoding {
            return Err(format!("charset '{}' in /{} cannot be written", label, entry));
        }
        Ok(encoding)
    }

    fn fail(&self, key: &Key, number: &str, description: &str, reason: String) -> Status {
        warn!(target: "keytree::iconv", parent = %key, reason = %reason, "{} failed", description);
        let report = ErrorReport::new(number, description, MODULE_NAME, reason);
        if let Err(err) = report::set_error(key, &report) {
            warn!(target: "keytree::iconv", error = %err, "could not attach error report");
        }
        Status::ERROR
    }

    fn opened(&self, stage: Stage, parent: &Key) -> Result<Charsets, Status> {
        self.charsets.ok_or_else(|| {
            self.fail(
                parent,
                report::INTERFACE,
                "Interface",
                format!("{} called before open", stage),
            )
        })
    }

    fn convert(
        &self,
        stage: Stage,
        ks: &KeySet,
        parent: &Key,
        source: &'static Encoding,
        target: &'static Encoding,
    ) -> Status {
        if source == target {
            return Status::NO_UPDATE;
        }

        let mut updates: Vec<(Key, Vec<u8>)> = Vec::new();
        for key in ks.iter() {
            let mut fields = Vec::with_capacity(2);
            if key.is_string() {
                fields.push(("value", key.clone()));
            }
            if let Some(comment) = key.meta(COMMENT) {
                fields.push(("comment", comment));
            }
            for (field, holder) in fields {
                match transcode(&holder.value(), source, target) {
                    Ok(bytes) => updates.push((holder, bytes)),
                    Err(cause) => {
                        return self.fail(
                            parent,
                            report::VALIDATION,
                            "Validation",
                            format!("{} of {}: {}", field, key, cause),
                        );
                    }
                }
            }
        }

        let mut changed = 0usize;
        for (holder, bytes) in updates {
            if holder.value() != bytes {
                holder.set_encoded_string(bytes);
                changed += 1;
            }
        }
        debug!(
            target: "keytree::iconv",
            %stage,
            from = source.name(),
            to = target.name(),
            changed,
            "converted"
        );
        if changed > 0 {
            Status::SUCCESS
        } else {
            Status::NO_UPDATE
        }
    }
}

fn transcode(
    bytes: &[u8],
    source: &'static Encoding,
    target: &'static Encoding,
) -> Result<Vec<u8>, String> {
    let (text, malformed) = source.decode_without_bom_handling(bytes);
    if malformed {
        return Err(format!("not valid {}", source.name()));
    }
    let (encoded, _, unmappable) = target.encode(&text);
    if unmappable {
        return Err(format!("not representable in {}", target.name()));
    }
    Ok(encoded.into_owned())
}

impl Plugin for Iconv {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn info(&self) -> PluginInfo {
        PluginInfo {
            licence: "BSD".to_string(),
            description: "Converts string values and comments between charsets".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            provides: vec!["conv".to_string()],
            ..PluginInfo::new(MODULE_NAME)
        }
    }

    fn open(&mut self, error_key: &Key) -> Status {
        let resolved = self
            .resolve("from")
            .and_then(|from| self.resolve("to").map(|to| Charsets { from, to }));
        match resolved {
            Ok(charsets) => {
                debug!(
                    target: "keytree::iconv",
                    from = charsets.from.name(),
                    to = charsets.to.name(),
                    "opened"
                );
                self.charsets = Some(charsets);
                Status::SUCCESS
            }
            Err(reason) => self.fail(error_key, report::INSTALLATION, "Installation", reason),
        }
    }

    fn get(&mut self, ks: &mut KeySet, parent: &Key) -> Status {
        match self.opened(Stage::Get, parent) {
            Ok(charsets) => self.convert(Stage::Get, ks, parent, charsets.to, charsets.from),
            Err(status) => status,
        }
    }

    fn set(&mut self, ks: &mut KeySet, parent: &Key) -> Status {
        match self.opened(Stage::Set, parent) {
            Ok(charsets) => self.convert(Stage::Set, ks, parent, charsets.from, charsets.to),
            Err(status) => status,
        }
    }

    fn error(&mut self, ks: &mut KeySet, parent: &Key) -> Status {
        match self.opened(Stage::Error, parent) {
            Ok(charsets) => self.convert(Stage::Error, ks, parent, charsets.to, charsets.from),
            Err(status) => status,
        }
    }

    fn close(&mut self, _parent: &Key) -> Status {
        self.charsets = None;
        Status::SUCCESS
    }
}
