//! The descriptor builder.
//!
//! One [`ObjectBuilder`] accumulates every descriptor of one build session:
//! an external driver (bootstrap compiler or general assembler) calls the
//! `add_*` operations in dependency order — super before sub, receiver
//! before member — and finishes with [`ObjectBuilder::to_bytes`], which
//! consumes the builder. Each operation appends to exactly one descriptor
//! table; indices equal the table length before the push and never change
//! afterwards.

use std::path::Path;

use osprey_object::{
    ActionIdx, CallIdx, ClassIdx, ConceptIdx, EnumIdx, ExistentialIdx, FieldIdx, ImplIdx,
    InstanceIdx, Locator, Section, StaticIdx, StructIdx, TemplateIdx, TypeIdx, call_flags,
    decl_flags,
};

use crate::code::CodeBody;
use crate::descriptors::{ActionDesc, CallDesc, Decl, FieldDesc, ImplDesc};
use crate::emit;
use crate::error::{BuildError, EmitError, Result};
use crate::params::{ParamSpec, process_params};
use crate::symbols::SymbolTable;
use crate::templates::{BoundSpec, PlaceholderSpec, Templates};
use crate::types::TypeGraph;

/// Template, parameters, and return type of a call-shaped descriptor.
#[derive(Debug, Default)]
pub struct Signature {
    pub template: Option<TemplateIdx>,
    pub params: Vec<ParamSpec>,
    pub return_type: TypeIdx,
}

impl Signature {
    pub fn returning(return_type: TypeIdx) -> Self {
        Self {
            template: None,
            params: Vec::new(),
            return_type,
        }
    }

    pub fn with_params(mut self, params: Vec<ParamSpec>) -> Self {
        self.params = params;
        self
    }

    pub fn with_template(mut self, template: TemplateIdx) -> Self {
        self.template = Some(template);
        self
    }
}

/// Accumulates one object's descriptor graph and bytecode.
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    types: TypeGraph,
    templates: Templates,
    symbols: SymbolTable,

    existentials: Vec<Decl>,
    concepts: Vec<Decl>,
    classes: Vec<Decl>,
    structs: Vec<Decl>,
    instances: Vec<Decl>,
    enums: Vec<Decl>,

    statics: Vec<FieldDesc>,
    fields: Vec<FieldDesc>,
    calls: Vec<CallDesc>,
    impls: Vec<ImplDesc>,
    actions: Vec<ActionDesc>,

    plugin: Option<String>,
}

/// Receiver kinds that may own fields and constructors.
const DATA_SECTIONS: &[Section] = &[
    Section::Class,
    Section::Struct,
    Section::Instance,
    Section::Enum,
];

/// Receiver kinds that may own methods.
const METHOD_SECTIONS: &[Section] = &[
    Section::Class,
    Section::Struct,
    Section::Instance,
    Section::Enum,
    Section::Existential,
];

/// Receiver kinds that may carry impls.
const IMPL_SECTIONS: &[Section] = &[
    Section::Class,
    Section::Concept,
    Section::Enum,
    Section::Existential,
    Section::Instance,
    Section::Struct,
];

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // --- type graph and templates -------------------------------------

    pub fn types(&self) -> &TypeGraph {
        &self.types
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The reserved no-return sentinel type.
    pub fn no_return(&self) -> TypeIdx {
        self.types.no_return()
    }

    /// Append a concrete type node referencing an existing descriptor.
    pub fn add_concrete_type(
        &mut self,
        super_type: Option<TypeIdx>,
        section: Section,
        index: u32,
        params: &[TypeIdx],
    ) -> Result<TypeIdx> {
        self.types.add_concrete_type(super_type, section, index, params)
    }

    /// Append a union of already-inserted member types.
    pub fn add_union_type(&mut self, members: &[TypeIdx]) -> Result<TypeIdx> {
        self.types.add_union_type(members)
    }

    /// Register a template. Placeholders materialize as placeholder type
    /// nodes; constraints resolve against placeholders of this same call.
    pub fn add_template(
        &mut self,
        path: &str,
        placeholders: &[PlaceholderSpec],
        bounds: &[BoundSpec],
    ) -> Result<TemplateIdx> {
        if self.symbols.contains(path) {
            return Err(BuildError::DuplicateSymbol(path.to_owned()));
        }
        let idx = self.templates.add(path, placeholders, bounds, &mut self.types)?;
        self.symbols
            .insert(path, Locator::new(Section::Template, idx.get()))?;
        Ok(idx)
    }

    // --- type declarations --------------------------------------------

    pub fn add_existential(
        &mut self,
        path: &str,
        super_type: Option<TypeIdx>,
        template: Option<TemplateIdx>,
        flags: u32,
    ) -> Result<(ExistentialIdx, TypeIdx)> {
        let (index, ty) = self.add_decl(Section::Existential, path, super_type, template, flags)?;
        Ok((ExistentialIdx(index), ty))
    }

    pub fn add_concept(
        &mut self,
        path: &str,
        super_type: Option<TypeIdx>,
        template: Option<TemplateIdx>,
        flags: u32,
    ) -> Result<(ConceptIdx, TypeIdx)> {
        let (index, ty) = self.add_decl(Section::Concept, path, super_type, template, flags)?;
        Ok((ConceptIdx(index), ty))
    }

    pub fn add_class(
        &mut self,
        path: &str,
        super_type: Option<TypeIdx>,
        template: Option<TemplateIdx>,
        flags: u32,
    ) -> Result<(ClassIdx, TypeIdx)> {
        let (index, ty) = self.add_decl(Section::Class, path, super_type, template, flags)?;
        Ok((ClassIdx(index), ty))
    }

    pub fn add_struct(
        &mut self,
        path: &str,
        super_type: Option<TypeIdx>,
        template: Option<TemplateIdx>,
        flags: u32,
    ) -> Result<(StructIdx, TypeIdx)> {
        let (index, ty) = self.add_decl(Section::Struct, path, super_type, template, flags)?;
        Ok((StructIdx(index), ty))
    }

    pub fn add_instance(
        &mut self,
        path: &str,
        super_type: Option<TypeIdx>,
        template: Option<TemplateIdx>,
        flags: u32,
    ) -> Result<(InstanceIdx, TypeIdx)> {
        let (index, ty) = self.add_decl(Section::Instance, path, super_type, template, flags)?;
        Ok((InstanceIdx(index), ty))
    }

    pub fn add_enum(
        &mut self,
        path: &str,
        super_type: Option<TypeIdx>,
        template: Option<TemplateIdx>,
        flags: u32,
    ) -> Result<(EnumIdx, TypeIdx)> {
        let (index, ty) = self.add_decl(Section::Enum, path, super_type, template, flags)?;
        Ok((EnumIdx(index), ty))
    }

    fn decl_table_mut(&mut self, section: Section) -> Option<&mut Vec<Decl>> {
        Some(match section {
            Section::Existential => &mut self.existentials,
            Section::Concept => &mut self.concepts,
            Section::Class => &mut self.classes,
            Section::Struct => &mut self.structs,
            Section::Instance => &mut self.instances,
            Section::Enum => &mut self.enums,
            _ => return None,
        })
    }

    fn decl_table(&self, section: Section) -> Option<&Vec<Decl>> {
        Some(match section {
            Section::Existential => &self.existentials,
            Section::Concept => &self.concepts,
            Section::Class => &self.classes,
            Section::Struct => &self.structs,
            Section::Instance => &self.instances,
            Section::Enum => &self.enums,
            _ => return None,
        })
    }

    /// Declaration behind a locator.
    pub fn decl(&self, locator: Locator) -> Option<&Decl> {
        self.decl_table(locator.section)?.get(locator.index as usize)
    }

    fn decl_mut(&mut self, locator: Locator) -> Option<&mut Decl> {
        self.decl_table_mut(locator.section)?
            .get_mut(locator.index as usize)
    }

    fn add_decl(
        &mut self,
        section: Section,
        path: &str,
        super_type: Option<TypeIdx>,
        template: Option<TemplateIdx>,
        flags: u32,
    ) -> Result<(u32, TypeIdx)> {
        if self.symbols.contains(path) {
            return Err(BuildError::DuplicateSymbol(path.to_owned()));
        }
        if let Some(s) = super_type {
            self.types.validate(s)?;
        }

        // The declaration's own type carries its template placeholders as
        // type parameters.
        let params: Vec<TypeIdx> = match template {
            Some(t) => {
                self.templates.validate(t)?;
                self.templates
                    .get(t)
                    .expect("validated template")
                    .placeholders
                    .iter()
                    .map(|p| p.ty)
                    .collect()
            }
            None => Vec::new(),
        };

        let table = self.decl_table_mut(section).expect("type-decl section");
        let index = table.len() as u32;
        let own_type = self
            .types
            .add_concrete_type(super_type, section, index, &params)?;

        let table = self.decl_table_mut(section).expect("type-decl section");
        table.push(Decl::new(path.to_owned(), own_type, super_type, template, flags));
        self.symbols.insert(path, Locator::new(section, index))?;
        Ok((index, own_type))
    }

    // --- fields and statics -------------------------------------------

    /// Add a field to a class, struct, instance, or enum.
    pub fn add_field(
        &mut self,
        owner_path: &str,
        name: &str,
        ty: TypeIdx,
        flags: u32,
    ) -> Result<FieldIdx> {
        let owner = self.lookup_receiver(owner_path, DATA_SECTIONS, "field")?;
        self.types.validate(ty)?;

        let path = format!("{owner_path}.{name}");
        if self.symbols.contains(&path) {
            return Err(BuildError::DuplicateSymbol(path));
        }

        let idx = FieldIdx(self.fields.len() as u32);
        self.fields.push(FieldDesc {
            path: path.clone(),
            ty,
            flags,
        });
        self.symbols
            .insert(&path, Locator::new(Section::Field, idx.get()))?;
        self.decl_mut(owner)
            .expect("receiver just looked up")
            .members
            .push(idx);
        Ok(idx)
    }

    /// Add a static variable.
    pub fn add_static(&mut self, path: &str, ty: TypeIdx, flags: u32) -> Result<StaticIdx> {
        self.types.validate(ty)?;
        if self.symbols.contains(path) {
            return Err(BuildError::DuplicateSymbol(path.to_owned()));
        }
        let idx = StaticIdx(self.statics.len() as u32);
        self.statics.push(FieldDesc {
            path: path.to_owned(),
            ty,
            flags,
        });
        self.symbols
            .insert(path, Locator::new(Section::Static, idx.get()))?;
        Ok(idx)
    }

    // --- calls ---------------------------------------------------------

    /// Add a free function.
    pub fn add_function(
        &mut self,
        path: &str,
        sig: Signature,
        code: CodeBody,
        flags: u32,
    ) -> Result<CallIdx> {
        self.build_call(path.to_owned(), None, sig, Some(code), flags)
    }

    /// Add the constructor of a receiver. At most one per receiver; the
    /// return type is always the receiver's own type.
    pub fn add_ctor(
        &mut self,
        receiver_path: &str,
        template: Option<TemplateIdx>,
        params: Vec<ParamSpec>,
        code: CodeBody,
        flags: u32,
    ) -> Result<CallIdx> {
        let receiver = self.lookup_receiver(receiver_path, DATA_SECTIONS, "constructor")?;
        let decl = self.decl(receiver).expect("receiver just looked up");
        if decl.ctor.is_some() {
            return Err(BuildError::DuplicateCtor(receiver_path.to_owned()));
        }
        let sig = Signature {
            template,
            params,
            return_type: decl.own_type,
        };

        let path = format!("{receiver_path}.$ctor");
        let idx = self.build_call(path, Some(receiver), sig, Some(code), flags | call_flags::CTOR)?;

        let decl = self.decl_mut(receiver).expect("receiver just looked up");
        decl.ctor = Some(idx);
        decl.methods.push(idx);
        Ok(idx)
    }

    /// Add a method to a receiver.
    pub fn add_method(
        &mut self,
        receiver_path: &str,
        name: &str,
        sig: Signature,
        code: CodeBody,
        flags: u32,
    ) -> Result<CallIdx> {
        let receiver = self.lookup_receiver(receiver_path, METHOD_SECTIONS, "method")?;
        let path = format!("{receiver_path}.{name}");
        let idx = self.build_call(path, Some(receiver), sig, Some(code), flags)?;
        self.decl_mut(receiver)
            .expect("receiver just looked up")
            .methods
            .push(idx);
        Ok(idx)
    }

    /// Add an action (bodiless method signature) to a concept.
    pub fn add_concept_action(
        &mut self,
        concept_path: &str,
        name: &str,
        sig: Signature,
    ) -> Result<ActionIdx> {
        let receiver = self.lookup_receiver(concept_path, &[Section::Concept], "action")?;
        if let Some(t) = sig.template {
            self.templates.validate(t)?;
        }
        self.types.validate(sig.return_type)?;
        for spec in &sig.params {
            self.types.validate(spec.ty)?;
        }
        let processed = process_params(&sig.params)?;

        let path = format!("{concept_path}.{name}");
        if self.symbols.contains(&path) {
            return Err(BuildError::DuplicateSymbol(path));
        }

        let idx = ActionIdx(self.actions.len() as u32);
        self.actions.push(ActionDesc {
            path: path.clone(),
            template: sig.template,
            concept: ConceptIdx(receiver.index),
            return_type: sig.return_type,
            params: processed.params,
        });
        self.symbols
            .insert(&path, Locator::new(Section::Action, idx.get()))?;
        self.decl_mut(receiver)
            .expect("receiver just looked up")
            .actions
            .push(idx);
        Ok(idx)
    }

    // --- impls ----------------------------------------------------------

    /// Bind a concept to a receiver.
    pub fn add_impl(
        &mut self,
        receiver_path: &str,
        impl_type: TypeIdx,
        concept: ConceptIdx,
    ) -> Result<ImplIdx> {
        let receiver = self.lookup_receiver(receiver_path, IMPL_SECTIONS, "impl")?;
        self.types.validate(impl_type)?;
        if concept.get() as usize >= self.concepts.len() {
            return Err(BuildError::UnknownConcept(concept.get()));
        }

        let idx = ImplIdx(self.impls.len() as u32);
        self.impls.push(ImplDesc {
            concept,
            receiver,
            receiver_path: receiver_path.to_owned(),
            impl_type,
            extensions: Vec::new(),
        });
        self.decl_mut(receiver)
            .expect("receiver just looked up")
            .impls
            .push(idx);
        Ok(idx)
    }

    /// Implement one concept action inside an impl.
    ///
    /// The action is resolved by name against the bound concept's declared
    /// actions; the body is built exactly like a bound method and the
    /// `(action, call)` pair is recorded for dynamic dispatch.
    pub fn add_impl_extension(
        &mut self,
        imp: ImplIdx,
        action_name: &str,
        sig: Signature,
        code: CodeBody,
        flags: u32,
    ) -> Result<CallIdx> {
        let desc = self
            .impls
            .get(imp.get() as usize)
            .ok_or(BuildError::UnknownImpl(imp.get()))?;
        let concept = &self.concepts[desc.concept.get() as usize];

        let action = concept
            .actions
            .iter()
            .copied()
            .find(|a| {
                let path = &self.actions[a.get() as usize].path;
                path.rsplit('.').next() == Some(action_name)
            })
            .ok_or_else(|| BuildError::UnknownAction {
                concept: concept.path.clone(),
                name: action_name.to_owned(),
            })?;

        let concept_name = concept.path.rsplit('.').next().unwrap_or(&concept.path);
        let path = format!("{}.{concept_name}.{action_name}", desc.receiver_path);
        let receiver = desc.receiver;

        let call = self.build_call(path, Some(receiver), sig, Some(code), flags)?;
        self.impls[imp.get() as usize].extensions.push((action, call));
        Ok(call)
    }

    // --- sealed hierarchies ---------------------------------------------

    /// Register `subtype_path` as a permitted direct subtype of the sealed
    /// declaration at `receiver_path`.
    ///
    /// Requires: the receiver is flagged Sealed, the subtype is flagged
    /// Final, and the subtype's recorded super type is exactly the
    /// receiver's own type.
    pub fn add_sealed_subtype(&mut self, receiver_path: &str, subtype_path: &str) -> Result<()> {
        let receiver = self.lookup_decl(receiver_path)?;
        let subtype = self.lookup_decl(subtype_path)?;

        let receiver_decl = self.decl(receiver).expect("receiver just looked up");
        if receiver_decl.flags & decl_flags::SEALED == 0 {
            return Err(BuildError::SealedReceiverNotSealed(receiver_path.to_owned()));
        }
        let receiver_type = receiver_decl.own_type;

        let subtype_decl = self.decl(subtype).expect("subtype just looked up");
        if subtype_decl.flags & decl_flags::FINAL == 0 {
            return Err(BuildError::SealedSubtypeNotFinal(subtype_path.to_owned()));
        }
        if subtype_decl.super_type != Some(receiver_type) {
            return Err(BuildError::SealedSuperMismatch {
                subtype: subtype_path.to_owned(),
                receiver: receiver_path.to_owned(),
            });
        }
        let subtype_type = subtype_decl.own_type;

        self.decl_mut(receiver)
            .expect("receiver just looked up")
            .sealed
            .push(subtype_type);
        Ok(())
    }

    // --- plugin ---------------------------------------------------------

    /// Record the native plugin location shipped with the object.
    pub fn set_plugin(&mut self, location: &str) {
        self.plugin = Some(location.to_owned());
    }

    // --- lookup helpers -------------------------------------------------

    fn lookup_decl(&self, path: &str) -> Result<Locator> {
        let locator = self
            .symbols
            .lookup(path)
            .ok_or_else(|| BuildError::UnknownReceiver(path.to_owned()))?;
        if !locator.section.is_type_decl() {
            return Err(BuildError::invalid_receiver(
                path,
                locator.section,
                "sealed hierarchy entry",
            ));
        }
        Ok(locator)
    }

    fn lookup_receiver(
        &self,
        path: &str,
        sections: &[Section],
        what: &'static str,
    ) -> Result<Locator> {
        let locator = self
            .symbols
            .lookup(path)
            .ok_or_else(|| BuildError::UnknownReceiver(path.to_owned()))?;
        if !sections.contains(&locator.section) {
            return Err(BuildError::invalid_receiver(path, locator.section, what));
        }
        Ok(locator)
    }

    /// Shared call construction: parameter processing, automatic `BOUND`
    /// and `NO_RETURN` flags, symbol registration.
    fn build_call(
        &mut self,
        path: String,
        receiver: Option<Locator>,
        sig: Signature,
        code: Option<CodeBody>,
        mut flags: u32,
    ) -> Result<CallIdx> {
        if self.symbols.contains(&path) {
            return Err(BuildError::DuplicateSymbol(path));
        }
        if let Some(t) = sig.template {
            self.templates.validate(t)?;
        }
        self.types.validate(sig.return_type)?;
        for spec in &sig.params {
            self.types.validate(spec.ty)?;
        }
        let processed = process_params(&sig.params)?;

        if receiver.is_some() {
            flags |= call_flags::BOUND;
        }
        if sig.return_type == self.types.no_return() {
            flags |= call_flags::NO_RETURN;
        }

        let idx = CallIdx(self.calls.len() as u32);
        self.calls.push(CallDesc {
            path: path.clone(),
            template: sig.template,
            receiver,
            flags,
            return_type: sig.return_type,
            params: processed.params,
            code,
        });
        self.symbols
            .insert(&path, Locator::new(Section::Call, idx.get()))?;
        Ok(idx)
    }

    // --- accessors for drivers and the serializer -----------------------

    pub fn call(&self, idx: CallIdx) -> Option<&CallDesc> {
        self.calls.get(idx.get() as usize)
    }

    pub fn action(&self, idx: ActionIdx) -> Option<&ActionDesc> {
        self.actions.get(idx.get() as usize)
    }

    pub fn impl_desc(&self, idx: ImplIdx) -> Option<&ImplDesc> {
        self.impls.get(idx.get() as usize)
    }

    pub(crate) fn tables(&self) -> Tables<'_> {
        Tables {
            existentials: &self.existentials,
            concepts: &self.concepts,
            classes: &self.classes,
            structs: &self.structs,
            instances: &self.instances,
            enums: &self.enums,
            statics: &self.statics,
            fields: &self.fields,
            calls: &self.calls,
            impls: &self.impls,
            actions: &self.actions,
            plugin: self.plugin.as_deref(),
        }
    }

    // --- serialization ---------------------------------------------------

    /// Serialize the whole graph into one immutable object buffer.
    ///
    /// Consumes the builder: a build session is serialized exactly once and
    /// its descriptors are reclaimed en masse afterwards.
    pub fn to_bytes(self) -> std::result::Result<Vec<u8>, EmitError> {
        emit::emit(&self)
    }

    /// Serialize and write to `path`, all-or-nothing.
    ///
    /// The object is fully serialized in memory, written to a temporary
    /// sibling, then renamed over the destination; a failed build never
    /// leaves a partial file at `path`.
    pub fn write_to_file(self, path: impl AsRef<Path>) -> std::result::Result<(), EmitError> {
        let path = path.as_ref();
        let bytes = emit::emit(&self)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);
        std::fs::write(&tmp, &bytes)?;
        if let Err(err) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

/// Borrowed view of every descriptor table, for the serializer.
pub(crate) struct Tables<'a> {
    pub existentials: &'a [Decl],
    pub concepts: &'a [Decl],
    pub classes: &'a [Decl],
    pub structs: &'a [Decl],
    pub instances: &'a [Decl],
    pub enums: &'a [Decl],
    pub statics: &'a [FieldDesc],
    pub fields: &'a [FieldDesc],
    pub calls: &'a [CallDesc],
    pub impls: &'a [ImplDesc],
    pub actions: &'a [ActionDesc],
    pub plugin: Option<&'a str>,
}
