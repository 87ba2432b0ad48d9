//! Listing and exporting the registry
//!
//! [`ConfigSet::dump`] lists variables as structured entries,
//! [`ConfigSet::dump_text`] renders them as `set` commands and
//! [`ConfigSet::snapshot`] exports the values as TOML or JSON.

use std::collections::BTreeMap;

use bitflags::bitflags;
use serde::Serialize;

use crate::error::Result;
use crate::set::{ConfigSet, SCOPE_SEPARATOR, Variable};
use crate::subset::SubsetId;
use crate::value::Value;

/// Shown in place of sensitive values
pub const HIDDEN: &str = "***";

bitflags! {
    /// Options for [`ConfigSet::dump`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DumpFlags: u8 {
        /// Skip variables that still hold their default
        const ONLY_CHANGED = 1 << 0;
        /// Replace sensitive values with `***`
        const HIDE_SENSITIVE = 1 << 1;
        /// Add a comment with the default before each line of text output
        const SHOW_DEFAULTS = 1 << 2;
    }
}

/// One line of a dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpEntry {
    /// Name as addressed, `scope:var` for overrides
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub value: String,
    pub initial: String,
    /// Global entries: differs from the default. Overrides: differs from
    /// what the scope would inherit.
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip)]
    quoted: bool,
}

/// Every value of a registry, keyed by scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    pub global: BTreeMap<String, String>,
    pub scopes: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConfigSnapshot {
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ConfigSet {
    /// List the global variables sorted by name, followed by each scope's
    /// overrides.
    pub fn dump(&self, flags: DumpFlags) -> Vec<DumpEntry> {
        let mut entries = Vec::new();

        for (name, var) in &self.vars {
            let Some(value) = self
                .scopes
                .holder(SubsetId::ROOT, name)
                .and_then(|holder| holder.value.as_ref())
            else {
                continue;
            };
            let changed = differs_from_initial(var, value);
            entries.push(entry(var, name.clone(), None, value, changed, flags));
        }

        for id in self.scopes.ids().into_iter().filter(|id| !id.is_root()) {
            let Ok(scope) = self.scopes.get(id) else {
                continue;
            };
            let mut overrides: Vec<(&String, &Value)> = scope
                .holders
                .iter()
                .filter_map(|(var, holder)| holder.value.as_ref().map(|value| (var, value)))
                .collect();
            overrides.sort_by(|a, b| a.0.cmp(b.0));

            for (var_name, value) in overrides {
                let Some(var) = self.vars.get(var_name) else {
                    continue;
                };
                let inherited = scope
                    .parent
                    .and_then(|parent| self.scopes.effective(parent, var_name))
                    .map(|(value, _)| value);
                let changed = !inherited.is_some_and(|parent| var.ty.equal(parent, value));
                let name = format!("{}{SCOPE_SEPARATOR}{var_name}", scope.name);
                entries.push(entry(
                    var,
                    name,
                    Some(scope.name.clone()),
                    value,
                    changed,
                    flags,
                ));
            }
        }

        if flags.contains(DumpFlags::ONLY_CHANGED) {
            entries.retain(|e| e.changed);
        }
        entries
    }

    /// Render [`dump`](Self::dump) as `set` commands, one per line.
    ///
    /// ```
    /// use mailrc_core::{ConfigDef, ConfigSet, DumpFlags, TypeTag};
    ///
    /// let mut cs = ConfigSet::new();
    /// cs.register([
    ///     ConfigDef::new("greeting", TypeTag::STRING).initial("hi"),
    ///     ConfigDef::new("wrap", TypeTag::NUMBER).initial("72"),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(
    ///     cs.dump_text(DumpFlags::empty()),
    ///     "set greeting = \"hi\"\nset wrap = 72\n"
    /// );
    /// ```
    pub fn dump_text(&self, flags: DumpFlags) -> String {
        let mut out = String::new();
        for entry in self.dump(flags) {
            if flags.contains(DumpFlags::SHOW_DEFAULTS) {
                out.push_str(&format!(
                    "# {} = {}\n",
                    entry.name,
                    render(&entry.initial, entry.quoted)
                ));
            }
            out.push_str(&format!(
                "set {} = {}\n",
                entry.name,
                render(&entry.value, entry.quoted)
            ));
        }
        out
    }

    /// Export every value, global and per scope.
    ///
    /// Only [`DumpFlags::ONLY_CHANGED`] and [`DumpFlags::HIDE_SENSITIVE`]
    /// apply.
    pub fn snapshot(&self, flags: DumpFlags) -> ConfigSnapshot {
        let mut snapshot = ConfigSnapshot::default();
        for entry in self.dump(flags) {
            match entry.scope {
                None => {
                    snapshot.global.insert(entry.name, entry.value);
                }
                Some(scope) => {
                    let var = entry
                        .name
                        .split_once(SCOPE_SEPARATOR)
                        .map_or(entry.name.as_str(), |(_, var)| var)
                        .to_string();
                    snapshot
                        .scopes
                        .entry(scope)
                        .or_default()
                        .insert(var, entry.value);
                }
            }
        }
        snapshot
    }
}

fn differs_from_initial(var: &Variable, value: &Value) -> bool {
    !var.ty
        .reset(&var.def, &var.initial)
        .is_ok_and(|initial| var.ty.equal(value, &initial))
}

fn entry(
    var: &Variable,
    name: String,
    scope: Option<String>,
    value: &Value,
    changed: bool,
    flags: DumpFlags,
) -> DumpEntry {
    let hide = flags.contains(DumpFlags::HIDE_SENSITIVE) && var.def.is_sensitive();
    let (value, initial) = if hide {
        (HIDDEN.to_string(), HIDDEN.to_string())
    } else {
        (var.ty.string_get(value), var.initial.clone())
    };
    DumpEntry {
        name,
        type_name: var.ty.name(),
        value,
        initial,
        changed,
        scope,
        quoted: var.ty.quoted() || hide,
    }
}

fn render(text: &str, quoted: bool) -> String {
    if !quoted {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_escapes() {
        assert_eq!(render("a\"b\\c\nd", true), r#""a\"b\\c\nd""#);
        assert_eq!(render("42", false), "42");
    }
}
