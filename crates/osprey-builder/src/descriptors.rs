//! In-memory descriptor representations.
//!
//! These are the builder-side shapes; the serializer flattens them into the
//! fixed-width records of `osprey-object`. Every cross-reference is already
//! a typed index — descriptors never hold pointers to each other.

use osprey_object::{ActionIdx, CallIdx, ConceptIdx, FieldIdx, ImplIdx, Locator, TemplateIdx, TypeIdx};

use crate::code::CodeBody;
use crate::params::Param;

/// A type declaration: existential, concept, class, struct, instance, or
/// enum. The section it was pushed into determines its kind.
#[derive(Debug)]
pub struct Decl {
    pub path: String,
    pub own_type: TypeIdx,
    pub super_type: Option<TypeIdx>,
    pub template: Option<TemplateIdx>,
    pub flags: u32,
    pub members: Vec<FieldIdx>,
    pub methods: Vec<CallIdx>,
    /// Declared actions; concepts only.
    pub actions: Vec<ActionIdx>,
    pub impls: Vec<ImplIdx>,
    /// Own types of the permitted direct subtypes; sealed receivers only.
    pub sealed: Vec<TypeIdx>,
    pub ctor: Option<CallIdx>,
}

impl Decl {
    pub(crate) fn new(
        path: String,
        own_type: TypeIdx,
        super_type: Option<TypeIdx>,
        template: Option<TemplateIdx>,
        flags: u32,
    ) -> Self {
        Self {
            path,
            own_type,
            super_type,
            template,
            flags,
            members: Vec::new(),
            methods: Vec::new(),
            actions: Vec::new(),
            impls: Vec::new(),
            sealed: Vec::new(),
            ctor: None,
        }
    }
}

/// A field or static variable.
#[derive(Debug)]
pub struct FieldDesc {
    pub path: String,
    pub ty: TypeIdx,
    pub flags: u32,
}

/// A function, method, constructor, or impl-extension body.
#[derive(Debug)]
pub struct CallDesc {
    pub path: String,
    pub template: Option<TemplateIdx>,
    pub receiver: Option<Locator>,
    pub flags: u32,
    pub return_type: TypeIdx,
    pub params: Vec<Param>,
    pub code: Option<CodeBody>,
}

/// A concept method signature without a body.
#[derive(Debug)]
pub struct ActionDesc {
    pub path: String,
    pub template: Option<TemplateIdx>,
    pub concept: ConceptIdx,
    pub return_type: TypeIdx,
    pub params: Vec<Param>,
}

/// A concept bound to a receiver, with its action → call extension pairs.
#[derive(Debug)]
pub struct ImplDesc {
    pub concept: ConceptIdx,
    pub receiver: Locator,
    /// Receiver path, kept for naming extension calls.
    pub receiver_path: String,
    pub impl_type: TypeIdx,
    pub extensions: Vec<(ActionIdx, CallIdx)>,
}
