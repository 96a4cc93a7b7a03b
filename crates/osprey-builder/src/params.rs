//! Shared parameter processing.
//!
//! Every descriptor with a parameter list — functions, constructors,
//! methods, concept actions, impl extensions — runs its specs through
//! [`process_params`]. The canonical order is fixed: positional
//! (`List`/`ListOptional`) parameters first, then uniquely named
//! `Named`/`NamedOptional`/`Context` parameters, then at most one trailing
//! rest parameter with no name and no default. Anything else is a
//! build-time precondition failure.

use std::collections::HashSet;

use osprey_object::{ParamKind, TypeIdx};

use crate::error::{BuildError, Result};

/// Caller-supplied parameter specification.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: Option<String>,
    pub ty: TypeIdx,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub fn list(name: impl Into<String>, ty: TypeIdx) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            kind: ParamKind::List,
        }
    }

    pub fn list_optional(name: impl Into<String>, ty: TypeIdx) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            kind: ParamKind::ListOptional,
        }
    }

    pub fn named(name: impl Into<String>, ty: TypeIdx) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            kind: ParamKind::Named,
        }
    }

    pub fn named_optional(name: impl Into<String>, ty: TypeIdx) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            kind: ParamKind::NamedOptional,
        }
    }

    pub fn context(name: impl Into<String>, ty: TypeIdx) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            kind: ParamKind::Context,
        }
    }

    /// The rest parameter: unnamed, required, last.
    pub fn rest(ty: TypeIdx) -> Self {
        Self {
            name: None,
            ty,
            kind: ParamKind::Rest,
        }
    }
}

/// A validated parameter in canonical order.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeIdx,
    pub kind: ParamKind,
}

/// Result of parameter processing.
#[derive(Debug, Clone, Default)]
pub struct ProcessedParams {
    pub params: Vec<Param>,
    /// Declared parameter count, recorded in the procedure prologue.
    pub num_args: u16,
}

/// Partition state: the groups must appear in this order.
#[derive(PartialEq)]
enum Group {
    Positional,
    Named,
    Rest,
}

/// Validate and canonicalize a parameter list.
pub fn process_params(specs: &[ParamSpec]) -> Result<ProcessedParams> {
    let mut group = Group::Positional;
    let mut seen_optional = false;
    let mut names: HashSet<&str> = HashSet::new();
    let mut params = Vec::with_capacity(specs.len());

    for spec in specs {
        if group == Group::Rest {
            return Err(BuildError::RestNotLast);
        }

        match spec.kind {
            ParamKind::List | ParamKind::ListOptional => {
                let name = spec.name.as_deref().unwrap_or("_");
                if group != Group::Positional {
                    return Err(BuildError::PositionalAfterNamed(name.to_owned()));
                }
                if spec.kind == ParamKind::ListOptional {
                    seen_optional = true;
                } else if seen_optional {
                    return Err(BuildError::RequiredAfterOptional(name.to_owned()));
                }
            }
            ParamKind::Named | ParamKind::NamedOptional | ParamKind::Context => {
                if spec.name.is_none() {
                    return Err(BuildError::MissingParamName);
                }
                group = Group::Named;
            }
            ParamKind::Rest => {
                if spec.name.is_some() {
                    return Err(BuildError::RestNamed);
                }
                group = Group::Rest;
            }
        }

        if let Some(name) = spec.name.as_deref()
            && !names.insert(name)
        {
            return Err(BuildError::DuplicateParam(name.to_owned()));
        }

        params.push(Param {
            name: spec.name.clone(),
            ty: spec.ty,
            kind: spec.kind,
        });
    }

    let num_args = params.len() as u16;
    Ok(ProcessedParams { params, num_args })
}
