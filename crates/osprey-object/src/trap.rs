//! Trap table: ordered name → numeric slot mapping for native hooks.
//!
//! The table is exported by a native plugin and must be identical at build
//! time (symbolic name resolution in the assembler) and at run time (native
//! dispatch by slot). It lives in the format crate because both sides
//! depend on the same name↔slot binding.

use std::collections::HashMap;

/// Ordered name → slot table. Slots are assigned in registration order.
#[derive(Debug, Clone, Default)]
pub struct TrapTable {
    names: Vec<String>,
    slots: HashMap<String, u16>,
}

impl TrapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from names in slot order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for name in names {
            table.register(&name.into());
        }
        table
    }

    /// Register a name, assigning the next slot. Re-registering an existing
    /// name returns its original slot; the binding never drifts.
    pub fn register(&mut self, name: &str) -> u16 {
        if let Some(&slot) = self.slots.get(name) {
            return slot;
        }
        let slot = self.names.len() as u16;
        self.names.push(name.to_owned());
        self.slots.insert(name.to_owned(), slot);
        slot
    }

    /// Resolve a symbolic name to its slot.
    pub fn resolve(&self, name: &str) -> Option<u16> {
        self.slots.get(name).copied()
    }

    /// Name registered at a slot.
    pub fn name(&self, slot: u16) -> Option<&str> {
        self.names.get(slot as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
