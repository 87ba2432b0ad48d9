//! Scoped subsets
//!
//! Scopes form a tree rooted at the global scope. Each scope owns holders
//! only for the variables it overrides; reads walk up the parent chain until
//! a holder with a value is found. Scopes live in an arena of slots. A freed
//! slot is reused, but its generation moves on, so a stale [`SubsetId`]
//! fails lookup instead of reaching the scope that took its place.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// Handle to a scope of a [`ConfigSet`](crate::ConfigSet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubsetId {
    index: usize,
    generation: u32,
}

impl SubsetId {
    /// The global scope
    pub const ROOT: Self = Self {
        index: 0,
        generation: 0,
    };

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for SubsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// Storage cell for one variable in one scope
#[derive(Debug, Clone, Default)]
pub(crate) struct Holder {
    /// `None` means "inherit from the parent"
    pub value: Option<Value>,
    /// Set by every stored mutation, never cleared
    pub touched: bool,
}

#[derive(Debug)]
pub(crate) struct Scope {
    pub name: String,
    pub parent: Option<SubsetId>,
    pub holders: HashMap<String, Holder>,
    children: usize,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    scope: Option<Scope>,
}

#[derive(Debug)]
pub(crate) struct ScopeTree {
    slots: Vec<Slot>,
    /// Indices of empty slots, reused before the arena grows
    free: Vec<usize>,
    by_name: HashMap<String, SubsetId>,
}

impl ScopeTree {
    pub fn new() -> Self {
        let root = Scope {
            name: String::new(),
            parent: None,
            holders: HashMap::new(),
            children: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                scope: Some(root),
            }],
            free: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn create(&mut self, name: &str, parent: SubsetId) -> Result<SubsetId> {
        if name.is_empty() || name.contains(':') || name.contains(char::is_whitespace) {
            return Err(Error::InvalidName {
                name: name.to_string(),
            });
        }
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateSubset {
                name: name.to_string(),
            });
        }
        self.get_mut(parent)?.children += 1;

        let scope = Scope {
            name: name.to_string(),
            parent: Some(parent),
            holders: HashMap::new(),
            children: 0,
        };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.scope = Some(scope);
        let id = SubsetId {
            index,
            generation: slot.generation,
        };
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Detach a scope, handing back its holders.
    ///
    /// The parent's holders are never touched.
    pub fn remove(&mut self, id: SubsetId) -> Result<Scope> {
        if id.is_root() {
            return Err(Error::RootSubset);
        }
        let scope = self.get(id)?;
        if scope.children > 0 {
            return Err(Error::SubsetInUse {
                name: scope.name.clone(),
            });
        }

        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .ok_or_else(|| unknown(id))?;
        let scope = slot.scope.take().ok_or_else(|| unknown(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.by_name.remove(&scope.name);
        if let Some(parent) = scope.parent {
            self.get_mut(parent)?.children -= 1;
        }
        Ok(scope)
    }

    pub fn get(&self, id: SubsetId) -> Result<&Scope> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.scope.as_ref())
            .ok_or_else(|| unknown(id))
    }

    pub fn get_mut(&mut self, id: SubsetId) -> Result<&mut Scope> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.scope.as_mut())
            .ok_or_else(|| unknown(id))
    }

    pub fn by_name(&self, name: &str) -> Option<SubsetId> {
        self.by_name.get(name).copied()
    }

    pub fn holder(&self, id: SubsetId, var: &str) -> Option<&Holder> {
        self.get(id).ok()?.holders.get(var)
    }

    /// The holder of `var` in `id`, created as "inherit" if missing.
    pub fn holder_mut(&mut self, id: SubsetId, var: &str) -> Result<&mut Holder> {
        Ok(self
            .get_mut(id)?
            .holders
            .entry(var.to_string())
            .or_default())
    }

    /// `id` followed by each of its ancestors, ending at the root.
    pub fn chain(&self, id: SubsetId) -> Vec<SubsetId> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            match self.get(current) {
                Ok(scope) => {
                    chain.push(current);
                    next = scope.parent;
                }
                Err(_) => break,
            }
        }
        chain
    }

    /// The value `var` has as seen from `id`, and the scope that holds it.
    pub fn effective(&self, id: SubsetId, var: &str) -> Option<(&Value, SubsetId)> {
        let mut current = id;
        loop {
            let scope = self.get(current).ok()?;
            if let Some(value) = scope.holders.get(var).and_then(|h| h.value.as_ref()) {
                return Some((value, current));
            }
            current = scope.parent?;
        }
    }

    /// Live scopes in slot order, root first.
    pub fn ids(&self) -> Vec<SubsetId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.scope.is_some())
            .map(|(index, slot)| SubsetId {
                index,
                generation: slot.generation,
            })
            .collect()
    }

    /// Take every scope out of the tree, leaving it empty.
    pub fn drain(&mut self) -> Vec<Scope> {
        self.by_name.clear();
        self.free.clear();
        self.slots.drain(..).filter_map(|slot| slot.scope).collect()
    }
}

fn unknown(id: SubsetId) -> Error {
    Error::UnknownSubset {
        name: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(tree: &mut ScopeTree, id: SubsetId, var: &str, value: &str) {
        tree.holder_mut(id, var).unwrap().value = Some(Value::from(value));
    }

    #[test]
    fn test_effective_walks_to_the_root() {
        let mut tree = ScopeTree::new();
        let account = tree.create("account", SubsetId::ROOT).unwrap();
        let folder = tree.create("folder", account).unwrap();
        set(&mut tree, SubsetId::ROOT, "Apple", "global");

        let (value, from) = tree.effective(folder, "Apple").unwrap();
        assert_eq!(value, &Value::from("global"));
        assert_eq!(from, SubsetId::ROOT);

        set(&mut tree, account, "Apple", "local");
        let (value, from) = tree.effective(folder, "Apple").unwrap();
        assert_eq!(value, &Value::from("local"));
        assert_eq!(from, account);
    }

    #[test]
    fn test_inherit_holder_is_skipped() {
        let mut tree = ScopeTree::new();
        let account = tree.create("account", SubsetId::ROOT).unwrap();
        set(&mut tree, SubsetId::ROOT, "Apple", "global");
        tree.holder_mut(account, "Apple").unwrap();

        assert!(tree.holder(account, "Apple").unwrap().value.is_none());
        assert_eq!(tree.effective(account, "Apple").unwrap().1, SubsetId::ROOT);
    }

    #[test]
    fn test_remove_keeps_parent_holders() {
        let mut tree = ScopeTree::new();
        let account = tree.create("account", SubsetId::ROOT).unwrap();
        set(&mut tree, SubsetId::ROOT, "Apple", "global");
        set(&mut tree, account, "Apple", "local");

        let removed = tree.remove(account).unwrap();
        assert_eq!(removed.holders.len(), 1);
        assert!(tree.get(account).is_err());
        assert!(tree.by_name("account").is_none());
        assert_eq!(
            tree.effective(SubsetId::ROOT, "Apple").unwrap().0,
            &Value::from("global")
        );
    }

    #[test]
    fn test_remove_refuses_parent_and_root() {
        let mut tree = ScopeTree::new();
        let account = tree.create("account", SubsetId::ROOT).unwrap();
        let folder = tree.create("folder", account).unwrap();

        assert!(matches!(tree.remove(SubsetId::ROOT), Err(Error::RootSubset)));
        assert!(matches!(tree.remove(account), Err(Error::SubsetInUse { .. })));

        tree.remove(folder).unwrap();
        tree.remove(account).unwrap();
        assert_eq!(tree.ids(), vec![SubsetId::ROOT]);
    }

    #[test]
    fn test_create_validates_names() {
        let mut tree = ScopeTree::new();
        assert!(matches!(
            tree.create("a:b", SubsetId::ROOT),
            Err(Error::InvalidName { .. })
        ));
        tree.create("account", SubsetId::ROOT).unwrap();
        assert!(matches!(
            tree.create("account", SubsetId::ROOT),
            Err(Error::DuplicateSubset { .. })
        ));
        assert!(matches!(
            tree.create(
                "orphan",
                SubsetId {
                    index: 99,
                    generation: 0
                }
            ),
            Err(Error::UnknownSubset { .. })
        ));
    }

    #[test]
    fn test_freed_slot_is_reused_by_a_new_generation() {
        let mut tree = ScopeTree::new();
        let first = tree.create("account", SubsetId::ROOT).unwrap();
        set(&mut tree, first, "Apple", "first");
        tree.remove(first).unwrap();

        let second = tree.create("other", SubsetId::ROOT).unwrap();
        assert_eq!(second.index, first.index);
        assert_ne!(first, second);
        assert!(tree.get(first).is_err());
        assert!(tree.holder(first, "Apple").is_none());
        assert!(matches!(tree.remove(first), Err(Error::UnknownSubset { .. })));
        assert_eq!(tree.get(second).unwrap().name, "other");
    }

    #[test]
    fn test_churn_does_not_grow_the_arena() {
        let mut tree = ScopeTree::new();
        for round in 0..100 {
            let id = tree.create(&format!("account{round}"), SubsetId::ROOT).unwrap();
            tree.remove(id).unwrap();
        }
        assert_eq!(tree.slots.len(), 2);
        assert_eq!(tree.ids(), vec![SubsetId::ROOT]);
    }

    #[test]
    fn test_effective_from_freed_scope_is_none() {
        let mut tree = ScopeTree::new();
        let account = tree.create("account", SubsetId::ROOT).unwrap();
        set(&mut tree, SubsetId::ROOT, "Apple", "global");
        tree.remove(account).unwrap();

        assert!(tree.effective(account, "Apple").is_none());
        assert!(tree.effective(SubsetId::ROOT, "Banana").is_none());
    }
}
