//! The type graph.
//!
//! An append-only table of type nodes forming a DAG through super-type
//! references. Each node gets a stable insertion-order index (`TypeIdx`);
//! nothing is ever removed or mutated after insertion, so any reference a
//! node carries is guaranteed to point at an earlier node and the super
//! chain is acyclic by construction.

use osprey_object::{Section, SpecialTag, TypeIdx};

use crate::error::{BuildError, Result};

/// Kind-specific payload of a type node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypePayload {
    /// Backed by a descriptor in `section` at `index`.
    Concrete { section: Section, index: u32 },
    /// Generic placeholder: owning template and ordinal within it.
    Placeholder { template: u32, ordinal: u32 },
    /// Union of the types in `params`.
    Union,
    /// Sentinel type.
    Special(SpecialTag),
}

/// One node of the type graph.
#[derive(Debug, Clone)]
pub struct Type {
    pub super_type: Option<TypeIdx>,
    /// Type parameters for concrete nodes; member types for unions.
    pub params: Vec<TypeIdx>,
    pub payload: TypePayload,
}

/// Append-only type table.
///
/// Index 0 is always the reserved no-return sentinel.
#[derive(Debug)]
pub struct TypeGraph {
    nodes: Vec<Type>,
}

impl TypeGraph {
    pub fn new() -> Self {
        let no_return = Type {
            super_type: None,
            params: Vec::new(),
            payload: TypePayload::Special(SpecialTag::NoReturn),
        };
        Self {
            nodes: vec![no_return],
        }
    }

    /// The reserved no-return sentinel type.
    pub fn no_return(&self) -> TypeIdx {
        TypeIdx(0)
    }

    fn check(&self, idx: TypeIdx) -> Result<()> {
        if (idx.get() as usize) < self.nodes.len() {
            Ok(())
        } else {
            Err(BuildError::UnknownType(idx.get()))
        }
    }

    fn push(&mut self, node: Type) -> TypeIdx {
        let idx = TypeIdx(self.nodes.len() as u32);
        self.nodes.push(node);
        idx
    }

    /// Append a concrete type backed by a descriptor.
    ///
    /// The super type and every parameter must already be in the table.
    pub fn add_concrete_type(
        &mut self,
        super_type: Option<TypeIdx>,
        section: Section,
        index: u32,
        params: &[TypeIdx],
    ) -> Result<TypeIdx> {
        if let Some(s) = super_type {
            self.check(s)?;
        }
        for &p in params {
            self.check(p)?;
        }
        Ok(self.push(Type {
            super_type,
            params: params.to_vec(),
            payload: TypePayload::Concrete { section, index },
        }))
    }

    /// Append a union of already-inserted member types.
    pub fn add_union_type(&mut self, members: &[TypeIdx]) -> Result<TypeIdx> {
        for &m in members {
            self.check(m)?;
        }
        Ok(self.push(Type {
            super_type: None,
            params: members.to_vec(),
            payload: TypePayload::Union,
        }))
    }

    /// Append a placeholder node owned by a template.
    pub(crate) fn add_placeholder(&mut self, template: u32, ordinal: u32) -> TypeIdx {
        self.push(Type {
            super_type: None,
            params: Vec::new(),
            payload: TypePayload::Placeholder { template, ordinal },
        })
    }

    pub fn get(&self, idx: TypeIdx) -> Option<&Type> {
        self.nodes.get(idx.get() as usize)
    }

    /// Validate that an index refers to an inserted node.
    pub fn validate(&self, idx: TypeIdx) -> Result<TypeIdx> {
        self.check(idx)?;
        Ok(idx)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The sentinel is always present.
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeIdx, &Type)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeIdx(i as u32), t))
    }
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}
