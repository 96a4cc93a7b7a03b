//! Template registry: generic placeholder lists with variance and bounds.
//!
//! Each placeholder materializes as a placeholder node in the type graph,
//! tagged with its owning template and ordinal. Constraints are resolved
//! against placeholder names registered in the same `add` call.

use osprey_object::{BoundKind, TemplateIdx, TypeIdx, Variance};

use crate::error::{BuildError, Result};
use crate::types::TypeGraph;

/// Placeholder declaration, as supplied by the caller.
#[derive(Debug, Clone)]
pub struct PlaceholderSpec {
    pub name: String,
    pub variance: Variance,
}

impl PlaceholderSpec {
    pub fn new(name: impl Into<String>, variance: Variance) -> Self {
        Self {
            name: name.into(),
            variance,
        }
    }

    pub fn invariant(name: impl Into<String>) -> Self {
        Self::new(name, Variance::Invariant)
    }
}

/// Bound constraint on a placeholder, referenced by name.
#[derive(Debug, Clone)]
pub struct BoundSpec {
    pub placeholder: String,
    pub kind: BoundKind,
    pub bound: TypeIdx,
}

/// A materialized placeholder.
#[derive(Debug, Clone)]
pub struct Placeholder {
    pub name: String,
    pub variance: Variance,
    /// The placeholder's type-graph node.
    pub ty: TypeIdx,
    pub bound: Option<(BoundKind, TypeIdx)>,
}

/// A registered template.
#[derive(Debug)]
pub struct Template {
    pub path: String,
    pub placeholders: Vec<Placeholder>,
}

impl Template {
    /// Type node of the placeholder with the given name.
    pub fn type_of(&self, name: &str) -> Option<TypeIdx> {
        self.placeholders
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.ty)
    }
}

/// Registry of all templates in one build session.
#[derive(Debug, Default)]
pub struct Templates {
    templates: Vec<Template>,
}

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, materializing its placeholders as type nodes.
    ///
    /// Fails if a placeholder name repeats or a constraint names a
    /// placeholder not declared in this same call.
    pub fn add(
        &mut self,
        path: &str,
        specs: &[PlaceholderSpec],
        bounds: &[BoundSpec],
        types: &mut TypeGraph,
    ) -> Result<TemplateIdx> {
        let idx = TemplateIdx(self.templates.len() as u32);

        let mut placeholders: Vec<Placeholder> = Vec::with_capacity(specs.len());
        for (ordinal, spec) in specs.iter().enumerate() {
            if placeholders.iter().any(|p| p.name == spec.name) {
                return Err(BuildError::DuplicatePlaceholder {
                    template: path.to_owned(),
                    name: spec.name.clone(),
                });
            }
            let ty = types.add_placeholder(idx.get(), ordinal as u32);
            placeholders.push(Placeholder {
                name: spec.name.clone(),
                variance: spec.variance,
                ty,
                bound: None,
            });
        }

        for bound in bounds {
            types.validate(bound.bound)?;
            let placeholder = placeholders
                .iter_mut()
                .find(|p| p.name == bound.placeholder)
                .ok_or_else(|| BuildError::UnknownPlaceholder {
                    template: path.to_owned(),
                    name: bound.placeholder.clone(),
                })?;
            placeholder.bound = Some((bound.kind, bound.bound));
        }

        self.templates.push(Template {
            path: path.to_owned(),
            placeholders,
        });
        Ok(idx)
    }

    pub fn get(&self, idx: TemplateIdx) -> Option<&Template> {
        self.templates.get(idx.get() as usize)
    }

    /// Validate that an index refers to a registered template.
    pub fn validate(&self, idx: TemplateIdx) -> Result<TemplateIdx> {
        if (idx.get() as usize) < self.templates.len() {
            Ok(idx)
        } else {
            Err(BuildError::UnknownTemplate(idx.get()))
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }
}
