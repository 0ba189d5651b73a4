//! Named types discovered while walking schemas.
//!
//! One registry lives for exactly one generation run. Entries are unique by
//! name and keep discovery order; the first registration of a name wins.

use indexmap::IndexMap;

use crate::derive::TypeExpr;

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredType {
    pub name: String,
    pub base: Option<TypeExpr>,
    /// Already rendered as a top-level declaration; never re-emitted as an alias.
    pub skip: bool,
}

#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: IndexMap<String, DiscoveredType>,
}

impl TypeRegistry {
    pub fn new() -> Self { Self::default() }

    /// Register an auxiliary alias. Returns `false` when the name was already known.
    pub fn register(&mut self, name: &str, base: TypeExpr) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        tracing::debug!(name, base = %base, "discovered named type");
        self.entries.insert(name.to_string(), DiscoveredType {
            name: name.to_string(),
            base: Some(base),
            skip: false,
        });
        true
    }

    /// Record a top-level declaration. An alias discovered earlier under the
    /// same name keeps its slot but is no longer emitted.
    pub fn register_rendered(&mut self, name: &str) {
        self.entries
            .entry(name.to_string())
            .and_modify(|e| e.skip = true)
            .or_insert_with(|| DiscoveredType {
                name: name.to_string(),
                base: None,
                skip: true,
            });
    }

    pub fn len(&self) -> usize { self.entries.len() }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&DiscoveredType> { self.entries.get(name) }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Entries still needing an alias declaration, first-discovered first.
    pub fn pending(&self) -> impl Iterator<Item = (&str, &TypeExpr)> {
        self.entries.values().filter(|e| !e.skip).filter_map(|e| {
            e.base.as_ref().map(|base| (e.name.as_str(), base))
        })
    }
}
