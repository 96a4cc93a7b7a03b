//! The object serializer.
//!
//! Flattens a finished [`ObjectBuilder`] into the section layout that
//! `osprey-object` reads back: every section is built as a byte vector
//! first, then assembled at the offsets `Header::compute_offsets` derives
//! from the counts, so the writer and the reader can never disagree about
//! where a section lives. The checksum over everything after the header is
//! computed last.

use osprey_object::{
    Header, INVALID_INDEX, PROC_HEADER_SIZE, PoolRange, SECTION_ALIGN, ActionRecord, CallRecord,
    DeclRecord, FieldRecord, HEADER_SIZE, ImplRecord, ParamRecord, PlaceholderRecord, PluginRecord,
    ProcedureHeader, SymbolRecord, TemplateRecord, TypeRecord, align_up,
};

use crate::builder::ObjectBuilder;
use crate::descriptors::Decl;
use crate::error::EmitError;
use crate::params::Param;
use crate::types::TypePayload;

use super::string_table::StringTableBuilder;

/// No concrete descriptor behind this type node.
const NO_SECTION: u8 = 0xFF;

/// Working state shared by the per-section passes.
#[derive(Default)]
struct Emitter {
    strings: StringTableBuilder,
    index_pool: Vec<u32>,
    params: Vec<u8>,
    params_count: u32,
    code: Vec<u8>,
}

impl Emitter {
    /// Append u32 entries to the shared pool, returning their span.
    fn push_pool(&mut self, entries: impl IntoIterator<Item = u32>) -> PoolRange {
        let start = self.index_pool.len() as u32;
        self.index_pool.extend(entries);
        PoolRange {
            start,
            count: self.index_pool.len() as u32 - start,
        }
    }

    /// Serialize a parameter list, returning its span in the Params section.
    fn push_params(&mut self, params: &[Param]) -> PoolRange {
        let start = self.params_count;
        for param in params {
            let name = match &param.name {
                Some(name) => self.strings.intern(name).get(),
                None => INVALID_INDEX,
            };
            let record = ParamRecord {
                name,
                ty: param.ty.get(),
                kind: param.kind as u8,
            };
            self.params.extend_from_slice(&record.to_bytes());
            self.params_count += 1;
        }
        PoolRange {
            start,
            count: self.params_count - start,
        }
    }

    /// Append one procedure to the code segment, returning its offset.
    ///
    /// Procedure headers start 4-byte aligned within the segment.
    fn push_code(&mut self, body: &crate::code::CodeBody) -> u32 {
        while self.code.len() % 4 != 0 {
            self.code.push(0);
        }
        let offset = self.code.len() as u32;
        let header = ProcedureHeader {
            size: (PROC_HEADER_SIZE + body.bytes().len()) as u32,
            num_args: body.num_args(),
            num_locals: body.num_locals(),
            num_lexicals: body.num_lexicals(),
        };
        self.code.extend_from_slice(&header.to_bytes());
        self.code.extend_from_slice(body.bytes());
        offset
    }

    fn decl_section(&mut self, decls: &[Decl], is_concept: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(decls.len() * osprey_object::DECL_RECORD_SIZE);
        for decl in decls {
            let path = self.strings.intern(&decl.path).get();
            let members = self.push_pool(decl.members.iter().map(|f| f.get()));
            // Concepts keep their actions where other kinds keep methods.
            let methods = if is_concept {
                self.push_pool(decl.actions.iter().map(|a| a.get()))
            } else {
                self.push_pool(decl.methods.iter().map(|c| c.get()))
            };
            let impls = self.push_pool(decl.impls.iter().map(|i| i.get()));
            let sealed = self.push_pool(decl.sealed.iter().map(|t| t.get()));
            let record = DeclRecord {
                path,
                own_type: decl.own_type.get(),
                super_type: decl.super_type.map_or(INVALID_INDEX, |t| t.get()),
                template: decl.template.map_or(INVALID_INDEX, |t| t.get()),
                flags: decl.flags,
                members,
                methods,
                impls,
                sealed,
            };
            out.extend_from_slice(&record.to_bytes());
        }
        out
    }
}

fn count(section: &'static str, len: usize) -> Result<u32, EmitError> {
    u32::try_from(len).map_err(|_| EmitError::SectionTooLarge { section, len })
}

/// Pad to the target offset, then append the section bytes.
fn emit_section(out: &mut Vec<u8>, offset: u32, bytes: &[u8]) {
    debug_assert!(out.len() <= offset as usize, "section offset overrun");
    out.resize(offset as usize, 0);
    out.extend_from_slice(bytes);
}

/// Serialize the builder into one complete object buffer.
pub(crate) fn emit(builder: &ObjectBuilder) -> Result<Vec<u8>, EmitError> {
    let tables = builder.tables();
    let mut em = Emitter::default();

    // Types. Every cross-referenced list goes through the shared pool.
    let mut types = Vec::with_capacity(builder.types().len() * osprey_object::TYPE_RECORD_SIZE);
    for (_, node) in builder.types().iter() {
        let params = em.push_pool(node.params.iter().map(|t| t.get()));
        let (kind, tag, section, data0, data1) = match &node.payload {
            TypePayload::Concrete { section, index } => (0u8, 0u8, *section as u8, *index, 0),
            TypePayload::Placeholder { template, ordinal } => {
                (1, 0, NO_SECTION, *template, *ordinal)
            }
            TypePayload::Union => (2, 0, NO_SECTION, 0, 0),
            TypePayload::Special(tag) => (3, *tag as u8, NO_SECTION, 0, 0),
        };
        let record = TypeRecord {
            kind,
            tag,
            section,
            _pad: 0,
            super_type: node.super_type.map_or(INVALID_INDEX, |t| t.get()),
            data0,
            data1,
            params,
        };
        types.extend_from_slice(&record.to_bytes());
    }

    // Templates and their placeholders. Placeholder records are laid out
    // contiguously per template, so the range indexes the Placeholders
    // section directly.
    let mut templates = Vec::new();
    let mut placeholders = Vec::new();
    let mut placeholders_count = 0u32;
    for template in builder.templates().iter() {
        let path = em.strings.intern(&template.path).get();
        let start = placeholders_count;
        for placeholder in &template.placeholders {
            let (bound_kind, bound_type) = match placeholder.bound {
                Some((kind, ty)) => (kind as u8, ty.get()),
                None => (0, INVALID_INDEX),
            };
            let record = PlaceholderRecord {
                name: em.strings.intern(&placeholder.name).get(),
                ty: placeholder.ty.get(),
                variance: placeholder.variance as u8,
                bound_kind,
                bound_type,
            };
            placeholders.extend_from_slice(&record.to_bytes());
            placeholders_count += 1;
        }
        let record = TemplateRecord {
            path,
            placeholders: PoolRange {
                start,
                count: placeholders_count - start,
            },
        };
        templates.extend_from_slice(&record.to_bytes());
    }

    // The six declaration sections.
    let existentials = em.decl_section(tables.existentials, false);
    let concepts = em.decl_section(tables.concepts, true);
    let classes = em.decl_section(tables.classes, false);
    let structs = em.decl_section(tables.structs, false);
    let instances = em.decl_section(tables.instances, false);
    let enums = em.decl_section(tables.enums, false);

    // Statics and fields share the record shape.
    let mut statics = Vec::new();
    for desc in tables.statics {
        let record = FieldRecord {
            path: em.strings.intern(&desc.path).get(),
            ty: desc.ty.get(),
            flags: desc.flags,
        };
        statics.extend_from_slice(&record.to_bytes());
    }
    let mut fields = Vec::new();
    for desc in tables.fields {
        let record = FieldRecord {
            path: em.strings.intern(&desc.path).get(),
            ty: desc.ty.get(),
            flags: desc.flags,
        };
        fields.extend_from_slice(&record.to_bytes());
    }

    // Calls. Bodies are appended to the code segment in call order.
    let mut calls = Vec::new();
    for desc in tables.calls {
        let path = em.strings.intern(&desc.path).get();
        let params = em.push_params(&desc.params);
        let code_offset = match &desc.code {
            Some(body) => em.push_code(body),
            None => INVALID_INDEX,
        };
        let (receiver_section, receiver_index) = match desc.receiver {
            Some(locator) => (locator.section as u32, locator.index),
            None => (INVALID_INDEX, INVALID_INDEX),
        };
        let record = CallRecord {
            path,
            template: desc.template.map_or(INVALID_INDEX, |t| t.get()),
            receiver_section,
            receiver_index,
            flags: desc.flags,
            return_type: desc.return_type.get(),
            params,
            code_offset,
        };
        calls.extend_from_slice(&record.to_bytes());
    }

    // Impls: extension pairs flatten to (action, call) u32 pairs.
    let mut impls = Vec::new();
    for desc in tables.impls {
        let extensions = em.push_pool(
            desc.extensions
                .iter()
                .flat_map(|&(action, call)| [action.get(), call.get()]),
        );
        let record = ImplRecord {
            concept: desc.concept.get(),
            receiver_section: desc.receiver.section as u32,
            receiver_index: desc.receiver.index,
            impl_type: desc.impl_type.get(),
            extensions,
        };
        impls.extend_from_slice(&record.to_bytes());
    }

    // Actions.
    let mut actions = Vec::new();
    for desc in tables.actions {
        let path = em.strings.intern(&desc.path).get();
        let params = em.push_params(&desc.params);
        let record = ActionRecord {
            path,
            template: desc.template.map_or(INVALID_INDEX, |t| t.get()),
            concept: desc.concept.get(),
            return_type: desc.return_type.get(),
            params,
        };
        actions.extend_from_slice(&record.to_bytes());
    }

    // Symbols in insertion order, plus the path-sorted lookup index.
    let mut symbols = Vec::new();
    let mut by_path: Vec<(u32, &str)> = Vec::with_capacity(builder.symbols().len());
    for (index, (path, locator)) in builder.symbols().iter().enumerate() {
        let record = SymbolRecord {
            path: em.strings.intern(path).get(),
            section: locator.section as u32,
            index: locator.index,
        };
        symbols.extend_from_slice(&record.to_bytes());
        by_path.push((index as u32, path));
    }
    by_path.sort_by(|a, b| a.1.cmp(b.1));
    let mut sorted_symbols = Vec::with_capacity(by_path.len() * 4);
    for (index, _) in &by_path {
        sorted_symbols.extend_from_slice(&index.to_le_bytes());
    }

    let mut plugin = Vec::new();
    if let Some(location) = tables.plugin {
        let record = PluginRecord {
            location: em.strings.intern(location).get(),
        };
        plugin.extend_from_slice(&record.to_bytes());
    }

    if u32::try_from(em.code.len()).is_err() {
        return Err(EmitError::CodeTooLarge(em.code.len()));
    }

    let mut index_pool = Vec::with_capacity(em.index_pool.len() * 4);
    for entry in &em.index_pool {
        index_pool.extend_from_slice(&entry.to_le_bytes());
    }

    let str_table_count = count("string table", em.strings.len())?;
    let (blob, str_table) = em.strings.finish()?;

    let mut header = Header {
        checksum: 0,
        total_size: 0,
        str_blob_size: blob.len() as u32,
        code_size: em.code.len() as u32,
        str_table_count,
        index_pool_count: count("index pool", em.index_pool.len())?,
        types_count: count("types", builder.types().len())?,
        templates_count: count("templates", builder.templates().len())?,
        placeholders_count,
        existentials_count: count("existentials", tables.existentials.len())?,
        statics_count: count("statics", tables.statics.len())?,
        fields_count: count("fields", tables.fields.len())?,
        params_count: em.params_count,
        calls_count: count("calls", tables.calls.len())?,
        impls_count: count("impls", tables.impls.len())?,
        actions_count: count("actions", tables.actions.len())?,
        concepts_count: count("concepts", tables.concepts.len())?,
        classes_count: count("classes", tables.classes.len())?,
        structs_count: count("structs", tables.structs.len())?,
        instances_count: count("instances", tables.instances.len())?,
        enums_count: count("enums", tables.enums.len())?,
        symbols_count: count("symbols", builder.symbols().len())?,
        plugin_count: if tables.plugin.is_some() { 1 } else { 0 },
        ..Header::default()
    };

    let offsets = header.compute_offsets().ok_or(EmitError::ObjectTooLarge)?;
    let total = align_up(offsets.code + header.code_size, SECTION_ALIGN as u32);
    header.total_size = total;

    let mut out = Vec::with_capacity(total as usize);
    out.resize(HEADER_SIZE, 0);
    emit_section(&mut out, offsets.str_blob, &blob);
    emit_section(&mut out, offsets.str_table, &str_table);
    emit_section(&mut out, offsets.index_pool, &index_pool);
    emit_section(&mut out, offsets.types, &types);
    emit_section(&mut out, offsets.templates, &templates);
    emit_section(&mut out, offsets.placeholders, &placeholders);
    emit_section(&mut out, offsets.existentials, &existentials);
    emit_section(&mut out, offsets.statics, &statics);
    emit_section(&mut out, offsets.fields, &fields);
    emit_section(&mut out, offsets.params, &em.params);
    emit_section(&mut out, offsets.calls, &calls);
    emit_section(&mut out, offsets.impls, &impls);
    emit_section(&mut out, offsets.actions, &actions);
    emit_section(&mut out, offsets.concepts, &concepts);
    emit_section(&mut out, offsets.classes, &classes);
    emit_section(&mut out, offsets.structs, &structs);
    emit_section(&mut out, offsets.instances, &instances);
    emit_section(&mut out, offsets.enums, &enums);
    emit_section(&mut out, offsets.symbols, &symbols);
    emit_section(&mut out, offsets.sorted_symbols, &sorted_symbols);
    emit_section(&mut out, offsets.plugin, &plugin);
    emit_section(&mut out, offsets.code, &em.code);
    out.resize(total as usize, 0);

    header.checksum = crc32fast::hash(&out[HEADER_SIZE..]);
    out[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
    Ok(out)
}
