//! Descriptor graph builder and object serializer for the Osprey toolchain.
//!
//! A driving compiler constructs one [`ObjectBuilder`] per output object,
//! registers templates, types, declarations, fields, and calls in
//! dependency order, assembles procedure bodies with [`CodeWriter`], and
//! serializes everything with [`ObjectBuilder::to_bytes`] or
//! [`ObjectBuilder::write_to_file`]. The resulting buffer loads back
//! through `osprey_object::Object`.

mod builder;
mod code;
mod descriptors;
mod emit;
mod error;
mod params;
mod symbols;
mod templates;
mod types;

#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod code_tests;
#[cfg(test)]
mod params_tests;
#[cfg(test)]
mod templates_tests;
#[cfg(test)]
mod types_tests;

pub use builder::{ObjectBuilder, Signature};
pub use code::{CodeBody, CodeWriter, JumpSite, Label};
pub use descriptors::{ActionDesc, CallDesc, Decl, FieldDesc, ImplDesc};
pub use error::{BuildError, EmitError, Result};
pub use params::{Param, ParamSpec, ProcessedParams, process_params};
pub use symbols::SymbolTable;
pub use templates::{BoundSpec, Placeholder, PlaceholderSpec, Template, Templates};
pub use types::{Type, TypeGraph, TypePayload};
