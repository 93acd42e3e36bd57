//! Plugin self-description
//!
//! A plugin describes itself with a [`PluginInfo`], which renders as keys
//! under `system/elektra/modules/<name>`:
//!
//! ```text
//! system/elektra/modules/<name>                 = <name>
//! system/elektra/modules/<name>/exports/<stage> = true
//! system/elektra/modules/<name>/infos/<field>   = <text>
//! ```
//!
//! `provides` and `needs` are rendered space separated.

use serde::{Deserialize, Serialize};

use keytree_core::{Key, KeyName, KeySet, Result, TRUE_TOKEN};

use crate::plugin::Stage;

const MODULES_ROOT: [&str; 3] = ["system", "elektra", "modules"];

/// Descriptive information about a plugin
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    /// Module name
    pub name: String,
    /// Author and contact
    pub author: String,
    /// Licence identifier
    pub licence: String,
    /// One-line description
    pub description: String,
    /// Version string
    pub version: String,
    /// Capabilities provided
    pub provides: Vec<String>,
    /// Capabilities required
    pub needs: Vec<String>,
    /// Exported lifecycle stages
    pub exports: Vec<Stage>,
}

impl PluginInfo {
    /// Info exporting every stage, other fields empty
    pub fn new(name: impl Into<String>) -> Self {
        PluginInfo {
            name: name.into(),
            exports: Stage::ALL.to_vec(),
            ..Default::default()
        }
    }

    fn module_name(&self, path: &[&str]) -> Result<KeyName> {
        KeyName::from_segments(
            MODULES_ROOT
                .iter()
                .copied()
                .chain(std::iter::once(self.name.as_str()))
                .chain(path.iter().copied()),
        )
    }

    fn text_fields(&self) -> [(&'static str, String); 6] {
        [
            ("author", self.author.clone()),
            ("licence", self.licence.clone()),
            ("description", self.description.clone()),
            ("version", self.version.clone()),
            ("provides", self.provides.join(" ")),
            ("needs", self.needs.join(" ")),
        ]
    }

    /// Render the info as keys
    ///
    /// Fails when the module name does not fit the name limits.
    pub fn to_keyset(&self) -> Result<KeySet> {
        let mut ks = KeySet::new();

        let root = Key::from_name(self.module_name(&[])?);
        root.set_string(&self.name);
        ks.append(root);

        for stage in &self.exports {
            let key = Key::from_name(self.module_name(&["exports", stage.as_str()])?);
            key.set_string(TRUE_TOKEN);
            ks.append(key);
        }

        for (field, value) in self.text_fields() {
            let key = Key::from_name(self.module_name(&["infos", field])?);
            key.set_string(&value);
            ks.append(key);
        }
        Ok(ks)
    }

    /// Read the info of module `name` back from `ks`
    pub fn from_keyset(ks: &KeySet, name: &str) -> Option<PluginInfo> {
        let template = PluginInfo::new(name);
        let root = template.module_name(&[]).ok()?;
        ks.lookup_name(&root)?;

        let text = |field: &str| {
            template
                .module_name(&["infos", field])
                .ok()
                .and_then(|n| ks.lookup_name(&n))
                .map(|key| key.string())
                .unwrap_or_default()
        };
        let words = |field: &str| -> Vec<String> {
            text(field).split_whitespace().map(str::to_string).collect()
        };
        let exports = Stage::ALL
            .into_iter()
            .filter(|stage| {
                template
                    .module_name(&["exports", stage.as_str()])
                    .is_ok_and(|n| ks.contains(&n))
            })
            .collect();

        Some(PluginInfo {
            name: name.to_string(),
            author: text("author"),
            licence: text("licence"),
            description: text("description"),
            version: text("version"),
            provides: words("provides"),
            needs: words("needs"),
            exports,
        })
    }
}
