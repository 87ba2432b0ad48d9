//! The configuration registry
//!
//! [`ConfigSet`] owns every definition, the scope tree with its value
//! holders, the type dispatch table and the observers. All operations take
//! a variable name, optionally prefixed by a scope (`"fruit:Strawberry"`).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::definition::{ConfigDef, Validation};
use crate::error::{Error, NativeSetError, Result};
use crate::flags::DefFlags;
use crate::notify::{ConfigEvent, EventKind, EventMask, Notifier, ObserverId};
use crate::subset::{Scope, ScopeTree, SubsetId};
use crate::types::{ConfigType, TypeRegistry, TypeTag};
use crate::value::Value;

static VAR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid variable name regex")
});

/// Separates a scope name from a variable name
pub const SCOPE_SEPARATOR: char = ':';

/// Result of a successful mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetStatus {
    /// `false` when the value already matched and nothing was stored
    pub changed: bool,
    /// Message from a validator that accepted the value with a warning
    pub warning: Option<String>,
}

impl SetStatus {
    pub fn modified() -> Self {
        Self {
            changed: true,
            warning: None,
        }
    }

    pub fn no_change() -> Self {
        Self::default()
    }

    pub fn is_no_change(&self) -> bool {
        !self.changed
    }

    fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Variable {
    pub def: Arc<ConfigDef>,
    pub ty: Arc<dyn ConfigType>,
    /// Current default, starts as the definition's `initial`
    pub initial: String,
}

/// What the set checks decided
enum Verdict {
    /// The candidate equals the current value
    Unchanged(Option<String>),
    /// Store the candidate, with an optional validator warning
    Store(Option<String>),
}

/// A resolved `[scope:]name`
#[derive(Debug, Clone)]
struct Target {
    scope: SubsetId,
    scope_name: Option<String>,
    var: String,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope_name {
            Some(scope) => write!(f, "{scope}{SCOPE_SEPARATOR}{}", self.var),
            None => f.write_str(&self.var),
        }
    }
}

/// A registry of typed configuration variables.
///
/// # Example
///
/// ```
/// use mailrc_core::{ConfigDef, ConfigSet, SubsetId, TypeTag};
///
/// let mut cs = ConfigSet::new();
/// cs.register([ConfigDef::new("signature", TypeTag::STRING).initial("--")])
///     .unwrap();
///
/// cs.subset_new("work", SubsetId::ROOT).unwrap();
/// cs.create_inheritance("work:signature").unwrap();
///
/// cs.string_set("signature", "Regards").unwrap();
/// assert_eq!(cs.string_get("work:signature").unwrap(), "Regards");
///
/// cs.string_set("work:signature", "Cheers").unwrap();
/// assert_eq!(cs.string_get("signature").unwrap(), "Regards");
/// assert_eq!(cs.string_get("work:signature").unwrap(), "Cheers");
/// ```
#[derive(Debug)]
pub struct ConfigSet {
    types: TypeRegistry,
    pub(crate) vars: BTreeMap<String, Variable>,
    synonyms: HashMap<String, String>,
    pub(crate) scopes: ScopeTree,
    notifier: Notifier,
    startup_complete: bool,
}

impl Default for ConfigSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSet {
    /// Create an empty registry with the built-in types.
    pub fn new() -> Self {
        Self::with_types(TypeRegistry::with_builtins())
    }

    /// Create an empty registry using the given dispatch table.
    pub fn with_types(types: TypeRegistry) -> Self {
        Self {
            types,
            vars: BTreeMap::new(),
            synonyms: HashMap::new(),
            scopes: ScopeTree::new(),
            notifier: Notifier::new(),
            startup_complete: false,
        }
    }

    /// Add a value type to the dispatch table.
    pub fn register_type(&mut self, tag: TypeTag, ty: Arc<dyn ConfigType>) -> Result<()> {
        self.types.register(tag, ty)
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a list of definitions.
    ///
    /// Stops at the first failure. Definitions registered before it stay in
    /// place; callers treat any error here as fatal.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] for a malformed name
    /// - [`Error::DuplicateVariable`] if the name is taken
    /// - [`Error::UnknownType`] if the type tag has no implementation
    /// - the type's parse error if the default does not parse
    pub fn register<I>(&mut self, defs: I) -> Result<()>
    where
        I: IntoIterator<Item = ConfigDef>,
    {
        for def in defs {
            self.register_one(def)?;
        }
        Ok(())
    }

    fn register_one(&mut self, def: ConfigDef) -> Result<()> {
        if !VAR_NAME.is_match(&def.name) {
            return Err(Error::InvalidName { name: def.name });
        }
        if self.vars.contains_key(&def.name) || self.synonyms.contains_key(&def.name) {
            return Err(Error::DuplicateVariable { name: def.name });
        }

        let ty = self.types.get(def.type_tag)?;
        let value = ty.string_set(&def, &def.initial)?;
        tracing::debug!(name = %def.name, r#type = ty.name(), "Registered config variable");

        self.scopes.holder_mut(SubsetId::ROOT, &def.name)?.value = Some(value);
        self.vars.insert(
            def.name.clone(),
            Variable {
                initial: def.initial.clone(),
                def: Arc::new(def),
                ty,
            },
        );
        Ok(())
    }

    /// Register `alias` as another name for `target`.
    pub fn register_synonym(&mut self, alias: &str, target: &str) -> Result<()> {
        if !VAR_NAME.is_match(alias) {
            return Err(Error::InvalidName {
                name: alias.to_string(),
            });
        }
        if self.vars.contains_key(alias) || self.synonyms.contains_key(alias) {
            return Err(Error::DuplicateVariable {
                name: alias.to_string(),
            });
        }
        if !self.vars.contains_key(target) {
            return Err(Error::UnknownVariable {
                name: target.to_string(),
            });
        }
        tracing::debug!(alias, target, "Registered synonym");
        self.synonyms.insert(alias.to_string(), target.to_string());
        Ok(())
    }

    /// The definition of a variable.
    pub fn def(&self, name: &str) -> Result<&ConfigDef> {
        let target = self.resolve(name)?;
        Ok(self.variable(&target.var)?.def.as_ref())
    }

    /// Registered variable names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    // ------------------------------------------------------------------
    // Startup
    // ------------------------------------------------------------------

    /// Mark startup as finished. From then on, variables flagged
    /// [`DefFlags::ON_STARTUP`] refuse changes.
    pub fn set_startup_complete(&mut self, complete: bool) {
        self.startup_complete = complete;
    }

    pub fn is_startup_complete(&self) -> bool {
        self.startup_complete
    }

    // ------------------------------------------------------------------
    // Get / set
    // ------------------------------------------------------------------

    /// Set a variable from text.
    ///
    /// The text is parsed by the variable's type, then checked in order
    /// against the not-empty flag, the validator, the current value and
    /// the startup lock. A value equal to the current one succeeds with
    /// [`SetStatus::no_change`] and publishes nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use mailrc_core::{ConfigDef, ConfigSet, TypeTag};
    ///
    /// let mut cs = ConfigSet::new();
    /// cs.register([ConfigDef::new("wrap", TypeTag::NUMBER).initial("72")]).unwrap();
    ///
    /// assert!(cs.string_set("wrap", "80").unwrap().changed);
    /// assert!(cs.string_set("wrap", "80").unwrap().is_no_change());
    /// assert!(cs.string_set("wrap", "eighty").is_err());
    /// assert_eq!(cs.string_get("wrap").unwrap(), "80");
    /// ```
    pub fn string_set(&mut self, name: &str, text: &str) -> Result<SetStatus> {
        let target = self.resolve(name)?;
        let var = self.variable(&target.var)?.clone();
        let candidate = var.ty.string_set(&var.def, text)?;
        Ok(self.store(&target, &var, candidate)?)
    }

    /// Render the value seen from the name's scope as text.
    pub fn string_get(&self, name: &str) -> Result<String> {
        let target = self.resolve(name)?;
        let var = self.variable(&target.var)?;
        let value = self.effective(&target)?;
        Ok(var.ty.string_get(value))
    }

    /// Set a variable from an already-built value.
    ///
    /// The value goes through the same checks as [`string_set`](Self::string_set).
    /// On success the registry keeps it; on failure it is returned inside
    /// the error.
    pub fn native_set(
        &mut self,
        name: &str,
        value: Value,
    ) -> std::result::Result<SetStatus, NativeSetError> {
        let prepared = self.resolve(name).and_then(|target| {
            let var = self.variable(&target.var)?.clone();
            var.ty.native_check(&var.def, &value)?;
            Ok((target, var))
        });
        match prepared {
            Ok((target, var)) => self.store(&target, &var, value),
            Err(error) => Err(NativeSetError::new(error, value)),
        }
    }

    /// The value seen from the name's scope.
    pub fn native_get(&self, name: &str) -> Result<&Value> {
        let target = self.resolve(name)?;
        let var = self.variable(&target.var)?;
        let value = self.effective(&target)?;
        Ok(var.ty.native_get(value))
    }

    /// Append to a variable, e.g. `set index_format += " %c"`.
    ///
    /// The combined value goes through the full [`string_set`](Self::string_set)
    /// checks. Appending nothing is a no-op.
    pub fn plus_equals(&mut self, name: &str, text: &str) -> Result<SetStatus> {
        let target = self.resolve(name)?;
        let var = self.variable(&target.var)?.clone();
        if text.is_empty() {
            return Ok(SetStatus::no_change());
        }

        let current = self.effective(&target)?;
        let candidate = var.ty.plus_equals(&var.def, current, text)?;
        Ok(self.store(&target, &var, candidate)?)
    }

    /// Restore a variable.
    ///
    /// In the global scope the default is parsed, validated and stored. In
    /// a child scope the override is dropped and the variable follows its
    /// parent again.
    ///
    /// # Errors
    ///
    /// - [`Error::Rejected`] if the validator refuses the default
    /// - [`Error::StartupOnly`] if startup is complete, the variable is
    ///   flagged [`DefFlags::ON_STARTUP`] and the reset would change it
    pub fn reset(&mut self, name: &str) -> Result<SetStatus> {
        let target = self.resolve(name)?;
        let var = self.variable(&target.var)?.clone();
        if target.scope.is_root() {
            self.reset_global(&target, &var)
        } else {
            self.reset_scoped(&target, &var)
        }
    }

    fn reset_global(&mut self, target: &Target, var: &Variable) -> Result<SetStatus> {
        let (def, ty) = (var.def.as_ref(), var.ty.as_ref());
        let default = ty.reset(def, &var.initial)?;

        let current = self.own_value(target);
        if current.is_some_and(|cur| ty.equal(cur, &default)) {
            ty.destroy(default);
            return Ok(SetStatus::no_change());
        }
        self.check_startup(target, def)?;

        let warning = match def.validate(&default) {
            Validation::Accept => None,
            Validation::Warn(message) => Some(message),
            Validation::Reject(message) => {
                tracing::debug!(name = %target, %message, "Reset refused by validator");
                return Err(Error::Rejected {
                    name: target.to_string(),
                    message,
                });
            }
        };

        let holder = self.scopes.holder_mut(target.scope, &target.var)?;
        let old = holder.value.replace(default);
        holder.touched = true;
        tracing::debug!(name = %target, "Reset to default");
        self.publish(EventKind::Reset, target, def, old.as_ref());
        if let Some(old) = old {
            ty.destroy(old);
        }
        Ok(SetStatus::modified().with_warning(warning))
    }

    fn reset_scoped(&mut self, target: &Target, var: &Variable) -> Result<SetStatus> {
        let (def, ty) = (var.def.as_ref(), var.ty.as_ref());
        let Some(own) = self.own_value(target) else {
            return Ok(SetStatus::no_change());
        };

        if def.flags.contains(DefFlags::ON_STARTUP) && self.startup_complete {
            let parent = self.scopes.get(target.scope)?.parent;
            let inherited = parent
                .and_then(|p| self.scopes.effective(p, &target.var))
                .map(|(value, _)| value);
            if !inherited.is_some_and(|value| ty.equal(value, own)) {
                return Err(Error::StartupOnly {
                    name: target.to_string(),
                });
            }
        }

        let holder = self.scopes.holder_mut(target.scope, &target.var)?;
        let old = holder.value.take();
        holder.touched = true;
        tracing::debug!(name = %target, "Dropped scope override");
        self.publish(EventKind::Reset, target, def, old.as_ref());
        if let Some(old) = old {
            ty.destroy(old);
        }
        Ok(SetStatus::modified())
    }

    /// The default text a reset restores.
    pub fn initial_get(&self, name: &str) -> Result<String> {
        let target = self.resolve(name)?;
        Ok(self.variable(&target.var)?.initial.clone())
    }

    /// Replace the default a reset restores, leaving the live value alone.
    ///
    /// Only possible in the global scope.
    pub fn initial_set(&mut self, name: &str, text: &str) -> Result<SetStatus> {
        let target = self.resolve(name)?;
        if !target.scope.is_root() {
            return Err(Error::InitialInScope {
                name: target.to_string(),
            });
        }
        let var = self.variable(&target.var)?.clone();
        let (def, ty) = (var.def.as_ref(), var.ty.as_ref());

        let value = ty.string_set(def, text)?;
        let warning = match def.validate(&value) {
            Validation::Accept => None,
            Validation::Warn(message) => Some(message),
            Validation::Reject(message) => {
                return Err(Error::Rejected {
                    name: target.to_string(),
                    message,
                });
            }
        };
        if var.initial == text {
            return Ok(SetStatus::no_change().with_warning(warning));
        }

        if let Some(entry) = self.vars.get_mut(&target.var) {
            entry.initial = text.to_string();
        }
        tracing::debug!(name = %target, initial = text, "Initial value replaced");
        emit(
            &mut self.notifier,
            EventKind::InitialSet,
            &target,
            def,
            None,
            &value,
        );
        ty.destroy(value);
        Ok(SetStatus::modified().with_warning(warning))
    }

    /// Whether the value seen from the name's scope differs from the default.
    pub fn has_been_set(&self, name: &str) -> Result<bool> {
        let target = self.resolve(name)?;
        let var = self.variable(&target.var)?;
        let initial = var.ty.reset(&var.def, &var.initial)?;
        let current = self.effective(&target)?;
        Ok(!var.ty.equal(current, &initial))
    }

    /// Whether a value was ever stored (or reset) in the name's scope.
    ///
    /// Unlike [`has_been_set`](Self::has_been_set), this never goes back to
    /// `false`, and changes suppressed as no-ops do not count.
    pub fn was_touched(&self, name: &str) -> Result<bool> {
        let target = self.resolve(name)?;
        Ok(self
            .scopes
            .holder(target.scope, &target.var)
            .is_some_and(|holder| holder.touched))
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Call `callback` after every change whose kind is in `mask`.
    pub fn observe<F>(&mut self, mask: EventMask, callback: F) -> ObserverId
    where
        F: FnMut(&ConfigEvent<'_>) + Send + 'static,
    {
        self.notifier.observe(mask, callback)
    }

    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        self.notifier.unobserve(id)
    }

    // ------------------------------------------------------------------
    // Subsets
    // ------------------------------------------------------------------

    /// Create a child scope of `parent`.
    pub fn subset_new(&mut self, name: &str, parent: SubsetId) -> Result<SubsetId> {
        let id = self.scopes.create(name, parent)?;
        tracing::debug!(subset = name, %id, %parent, "Created subset");
        Ok(id)
    }

    /// Tear a scope down, releasing its overrides.
    ///
    /// # Errors
    ///
    /// - [`Error::RootSubset`] for the global scope
    /// - [`Error::SubsetInUse`] while the scope has children
    pub fn subset_free(&mut self, id: SubsetId) -> Result<()> {
        let scope = self.scopes.remove(id)?;
        tracing::debug!(subset = %scope.name, %id, "Freed subset");
        self.release(scope);
        Ok(())
    }

    pub fn subset_by_name(&self, name: &str) -> Option<SubsetId> {
        self.scopes.by_name(name)
    }

    /// The scope's name; the global scope's name is empty.
    pub fn subset_name(&self, id: SubsetId) -> Result<&str> {
        Ok(&self.scopes.get(id)?.name)
    }

    pub fn subset_parent(&self, id: SubsetId) -> Result<Option<SubsetId>> {
        Ok(self.scopes.get(id)?.parent)
    }

    /// The name that addresses `var` in scope `id`.
    pub fn scoped_name(&self, id: SubsetId, var: &str) -> Result<String> {
        let scope = self.scopes.get(id)?;
        if id.is_root() {
            Ok(var.to_string())
        } else {
            Ok(format!("{}{SCOPE_SEPARATOR}{var}", scope.name))
        }
    }

    /// Make a scope hold its own (initially inherited) cell for a variable.
    ///
    /// Idempotent. Intermediate scopes between it and the root get a cell
    /// too.
    pub fn create_inheritance(&mut self, name: &str) -> Result<()> {
        let target = self.resolve(name)?;
        for id in self.scopes.chain(target.scope) {
            self.scopes.holder_mut(id, &target.var)?;
        }
        tracing::trace!(name = %target, "Created inheritance point");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn resolve(&self, name: &str) -> Result<Target> {
        let (scope, scope_name, var) = match name.split_once(SCOPE_SEPARATOR) {
            Some((scope_name, var)) => {
                let scope = self
                    .scopes
                    .by_name(scope_name)
                    .ok_or_else(|| Error::UnknownSubset {
                        name: scope_name.to_string(),
                    })?;
                (scope, Some(scope_name.to_string()), var)
            }
            None => (SubsetId::ROOT, None, name),
        };

        let var = if self.vars.contains_key(var) {
            var.to_string()
        } else if let Some(canonical) = self.synonyms.get(var) {
            tracing::debug!(synonym = var, name = %canonical, "Resolved synonym");
            canonical.clone()
        } else {
            return Err(Error::UnknownVariable {
                name: name.to_string(),
            });
        };

        Ok(Target {
            scope,
            scope_name,
            var,
        })
    }

    fn variable(&self, var: &str) -> Result<&Variable> {
        self.vars.get(var).ok_or_else(|| Error::UnknownVariable {
            name: var.to_string(),
        })
    }

    fn own_value(&self, target: &Target) -> Option<&Value> {
        self.scopes
            .holder(target.scope, &target.var)
            .and_then(|holder| holder.value.as_ref())
    }

    fn effective(&self, target: &Target) -> Result<&Value> {
        self.scopes
            .effective(target.scope, &target.var)
            .map(|(value, _)| value)
            .ok_or_else(|| Error::UnknownVariable {
                name: target.to_string(),
            })
    }

    fn check_startup(&self, target: &Target, def: &ConfigDef) -> Result<()> {
        if def.flags.contains(DefFlags::ON_STARTUP) && self.startup_complete {
            return Err(Error::StartupOnly {
                name: target.to_string(),
            });
        }
        Ok(())
    }

    /// Decide whether `candidate` may be stored.
    fn check_set(&self, target: &Target, var: &Variable, candidate: &Value) -> Result<Verdict> {
        let (def, ty) = (var.def.as_ref(), var.ty.as_ref());

        if def.flags.contains(DefFlags::NOT_EMPTY) && ty.is_empty(candidate) {
            return Err(Error::EmptyValue {
                name: target.to_string(),
            });
        }

        let warning = match def.validate(candidate) {
            Validation::Accept => None,
            Validation::Warn(message) => Some(message),
            Validation::Reject(message) => {
                return Err(Error::Rejected {
                    name: target.to_string(),
                    message,
                });
            }
        };

        if self
            .own_value(target)
            .is_some_and(|current| ty.equal(current, candidate))
        {
            return Ok(Verdict::Unchanged(warning));
        }

        // A startup-only value may still be "set" to what it already is
        if def.flags.contains(DefFlags::ON_STARTUP) && self.startup_complete {
            let unchanged = self
                .scopes
                .effective(target.scope, &target.var)
                .is_some_and(|(current, _)| ty.equal(current, candidate));
            if !unchanged {
                return Err(Error::StartupOnly {
                    name: target.to_string(),
                });
            }
        }

        Ok(Verdict::Store(warning))
    }

    /// Run the set checks, then store and publish.
    fn store(
        &mut self,
        target: &Target,
        var: &Variable,
        candidate: Value,
    ) -> std::result::Result<SetStatus, NativeSetError> {
        let verdict = match self.check_set(target, var, &candidate) {
            Ok(verdict) => verdict,
            Err(error) => {
                tracing::debug!(name = %target, %error, "Set refused");
                return Err(NativeSetError::new(error, candidate));
            }
        };
        let warning = match verdict {
            Verdict::Store(warning) => warning,
            Verdict::Unchanged(warning) => {
                tracing::trace!(name = %target, "Value unchanged");
                var.ty.destroy(candidate);
                return Ok(SetStatus::no_change().with_warning(warning));
            }
        };
        if let Some(message) = &warning {
            tracing::warn!(name = %target, %message, "Validator warning");
        }

        let holder = match self.scopes.holder_mut(target.scope, &target.var) {
            Ok(holder) => holder,
            Err(error) => return Err(NativeSetError::new(error, candidate)),
        };
        let old = holder.value.replace(candidate);
        holder.touched = true;
        tracing::debug!(name = %target, "Value stored");

        self.publish(EventKind::Set, target, &var.def, old.as_ref());
        if let Some(old) = old {
            var.ty.destroy(old);
        }
        Ok(SetStatus::modified().with_warning(warning))
    }

    /// Announce a change, with the value now seen from the target's scope.
    fn publish(&mut self, kind: EventKind, target: &Target, def: &ConfigDef, old: Option<&Value>) {
        if let Some((new, _)) = self.scopes.effective(target.scope, &target.var) {
            emit(&mut self.notifier, kind, target, def, old, new);
        }
    }

    fn release(&self, scope: Scope) {
        for (var, holder) in scope.holders {
            if let (Some(value), Some(entry)) = (holder.value, self.vars.get(&var)) {
                entry.ty.destroy(value);
            }
        }
    }
}

fn emit(
    notifier: &mut Notifier,
    kind: EventKind,
    target: &Target,
    def: &ConfigDef,
    old: Option<&Value>,
    new: &Value,
) {
    let name = target.to_string();
    notifier.publish(&ConfigEvent {
        kind,
        name: &name,
        var: &target.var,
        scope: target.scope_name.as_deref(),
        def,
        old,
        new,
    });
}

impl Drop for ConfigSet {
    fn drop(&mut self) {
        for scope in self.scopes.drain() {
            self.release(scope);
        }
    }
}
