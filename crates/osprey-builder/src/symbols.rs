//! The symbol table: one authoritative map from symbol path to locator.
//!
//! Every descriptor kind registers its path here exactly once; path
//! uniqueness is enforced across all kinds. Insertion order is the
//! serialized symbol order.

use indexmap::IndexMap;
use osprey_object::{Locator, SymbolIdx};

use crate::error::{BuildError, Result};

#[derive(Debug, Default)]
pub struct SymbolTable {
    map: IndexMap<String, Locator>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path → locator binding. The path must be unused; the first
    /// binding is never overwritten.
    pub fn insert(&mut self, path: &str, locator: Locator) -> Result<SymbolIdx> {
        if self.map.contains_key(path) {
            return Err(BuildError::DuplicateSymbol(path.to_owned()));
        }
        let idx = SymbolIdx(self.map.len() as u32);
        self.map.insert(path.to_owned(), locator);
        Ok(idx)
    }

    pub fn lookup(&self, path: &str) -> Option<Locator> {
        self.map.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.map.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Symbols in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Locator)> {
        self.map.iter().map(|(path, &locator)| (path.as_str(), locator))
    }
}
