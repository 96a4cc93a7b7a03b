//! Human-readable object dump for debugging.

use std::fmt::Write as _;

use crate::constants::{INVALID_INDEX, PROC_HEADER_SIZE};
use crate::ids::{ActionIdx, CallIdx, FieldIdx, ImplIdx, Section, StringId, SymbolIdx, TemplateIdx, TypeIdx};
use crate::opcode::Opcode;
use crate::reader::Object;
use crate::records::{BoundKind, ParamKind, TypeKind, Variance};

/// Render every section of an object as text.
pub fn dump(object: &Object) -> String {
    let mut out = String::new();
    let h = object.header();

    let _ = writeln!(
        out,
        "osprey object v{}.{}.{} ({} bytes)",
        h.version_major, h.version_minor, h.version_patch, h.total_size
    );

    dump_types(&mut out, object);
    dump_templates(&mut out, object);
    dump_decls(&mut out, object);
    dump_calls(&mut out, object);
    dump_symbols(&mut out, object);

    if let Some(plugin) = object.plugin() {
        let _ = writeln!(out, "\nplugin: {}", object.string(StringId(plugin.location)));
    }

    out
}

fn fmt_ref(raw: u32) -> String {
    if raw == INVALID_INDEX {
        "-".to_string()
    } else {
        raw.to_string()
    }
}

fn dump_types(out: &mut String, object: &Object) {
    let count = object.header().types_count;
    let _ = writeln!(out, "\ntypes ({count})");
    for i in 0..count {
        let Some(t) = object.type_record(TypeIdx(i)) else {
            continue;
        };
        let kind = match TypeKind::from_u8(t.kind) {
            Some(TypeKind::Concrete) => {
                let section = Section::from_u8(t.section)
                    .map(|s| s.name())
                    .unwrap_or("?");
                format!("concrete {section}#{}", t.data0)
            }
            Some(TypeKind::Placeholder) => format!("placeholder tpl#{} ord {}", t.data0, t.data1),
            Some(TypeKind::Union) => format!("union of {}", t.params.count),
            Some(TypeKind::Special) => format!("special tag {}", t.tag),
            None => format!("?kind {}", t.kind),
        };
        let _ = writeln!(out, "  T{i}: {kind} super={}", fmt_ref(t.super_type));
    }
}

fn dump_templates(out: &mut String, object: &Object) {
    let count = object.header().templates_count;
    if count == 0 {
        return;
    }
    let _ = writeln!(out, "\ntemplates ({count})");
    for i in 0..count {
        let Some(t) = object.template(TemplateIdx(i)) else {
            continue;
        };
        let _ = writeln!(out, "  P{i}: {}", object.string(StringId(t.path)));
        for p in t.placeholders.range() {
            let Some(ph) = object.placeholder(p as u32) else {
                continue;
            };
            let variance = match Variance::from_u8(ph.variance) {
                Some(Variance::Invariant) => "",
                Some(Variance::Covariant) => "+",
                Some(Variance::Contravariant) => "-",
                None => "?",
            };
            let bound = match BoundKind::from_u8(ph.bound_kind) {
                Some(BoundKind::Extends) => format!(" extends T{}", ph.bound_type),
                Some(BoundKind::Super) => format!(" super T{}", ph.bound_type),
                _ => String::new(),
            };
            let _ = writeln!(
                out,
                "    {variance}{} = T{}{bound}",
                object.string(StringId(ph.name)),
                ph.ty
            );
        }
    }
}

fn dump_decls(out: &mut String, object: &Object) {
    let sections = [
        Section::Existential,
        Section::Concept,
        Section::Class,
        Section::Struct,
        Section::Instance,
        Section::Enum,
    ];
    for section in sections {
        let count = match section {
            Section::Existential => object.header().existentials_count,
            Section::Concept => object.header().concepts_count,
            Section::Class => object.header().classes_count,
            Section::Struct => object.header().structs_count,
            Section::Instance => object.header().instances_count,
            Section::Enum => object.header().enums_count,
            _ => 0,
        };
        if count == 0 {
            continue;
        }
        let _ = writeln!(out, "\n{}s ({count})", section.name());
        for i in 0..count {
            let Some(d) = object.decl(section, i) else {
                continue;
            };
            let _ = writeln!(
                out,
                "  {i}: {} type=T{} super={} flags={:#x} members={} methods={} impls={} sealed={}",
                object.string(StringId(d.path)),
                d.own_type,
                fmt_ref(d.super_type),
                d.flags,
                d.members.count,
                d.methods.count,
                d.impls.count,
                d.sealed.count,
            );
            for f in object.pool(d.members) {
                if let Some(field) = object.field(FieldIdx(f)) {
                    let _ = writeln!(
                        out,
                        "    field {}: T{}",
                        object.string(StringId(field.path)),
                        field.ty
                    );
                }
            }
            for i in object.pool(d.impls) {
                if let Some(imp) = object.impl_record(ImplIdx(i)) {
                    let _ = writeln!(
                        out,
                        "    impl concept#{} ({} extensions)",
                        imp.concept,
                        imp.extensions.count / 2
                    );
                }
            }
        }
    }
}

fn dump_calls(out: &mut String, object: &Object) {
    let count = object.header().calls_count;
    let _ = writeln!(out, "\ncalls ({count})");
    for i in 0..count {
        let Some(c) = object.call(CallIdx(i)) else {
            continue;
        };
        let _ = writeln!(
            out,
            "  C{i}: {} flags={:#x} ret=T{} code@{}",
            object.string(StringId(c.path)),
            c.flags,
            c.return_type,
            fmt_ref(c.code_offset),
        );
        for p in c.params.range() {
            let Some(param) = object.param(p as u32) else {
                continue;
            };
            let name = if param.name == INVALID_INDEX {
                "..."
            } else {
                object.string(StringId(param.name))
            };
            let kind = match ParamKind::from_u8(param.kind) {
                Some(k) => format!("{k:?}"),
                None => format!("?{}", param.kind),
            };
            let _ = writeln!(out, "    {name}: T{} ({kind})", param.ty);
        }
        if let Some((proc_header, body)) = object.call_code(CallIdx(i)) {
            let _ = writeln!(
                out,
                "    frame: args={} locals={} lexicals={}",
                proc_header.num_args, proc_header.num_locals, proc_header.num_lexicals
            );
            dump_code(out, body);
        }
    }

    let actions = object.header().actions_count;
    if actions > 0 {
        let _ = writeln!(out, "\nactions ({actions})");
        for i in 0..actions {
            if let Some(a) = object.action(ActionIdx(i)) {
                let _ = writeln!(
                    out,
                    "  A{i}: {} concept#{} ret=T{}",
                    object.string(StringId(a.path)),
                    a.concept,
                    a.return_type
                );
            }
        }
    }
}

/// Disassemble one procedure body. Offsets are relative to the body start,
/// matching the encoding of jump targets.
fn dump_code(out: &mut String, body: &[u8]) {
    let mut at = 0usize;
    while at < body.len() {
        let Some(op) = Opcode::from_u8(body[at]) else {
            let _ = writeln!(out, "    {at:04x}: .byte {:#04x}", body[at]);
            at += 1;
            continue;
        };
        let operand_len = op.operand_len();
        if at + 1 + operand_len > body.len() {
            let _ = writeln!(out, "    {at:04x}: {} <truncated>", op.name());
            break;
        }
        match operand_len {
            0 => {
                let _ = writeln!(out, "    {at:04x}: {}", op.name());
            }
            2 => {
                let operand = u16::from_le_bytes([body[at + 1], body[at + 2]]);
                if op.is_jump() {
                    let _ = writeln!(out, "    {at:04x}: {} -> {operand:04x}", op.name());
                } else {
                    let _ = writeln!(out, "    {at:04x}: {} {operand}", op.name());
                }
            }
            _ => {
                let slot = u16::from_le_bytes([body[at + 1], body[at + 2]]);
                let flags = body[at + 3];
                let _ = writeln!(out, "    {at:04x}: {} slot={slot} flags={flags:#04x}", op.name());
            }
        }
        at += 1 + operand_len;
    }
    let _ = writeln!(out, "    size: {} bytes (+{PROC_HEADER_SIZE} header)", body.len());
}

fn dump_symbols(out: &mut String, object: &Object) {
    let count = object.header().symbols_count;
    let _ = writeln!(out, "\nsymbols ({count})");
    for i in 0..count {
        let Some(s) = object.symbol(SymbolIdx(i)) else {
            continue;
        };
        let section = Section::from_u8(s.section as u8)
            .map(|s| s.name())
            .unwrap_or("?");
        let _ = writeln!(
            out,
            "  S{i}: {} -> {section}#{}",
            object.string(StringId(s.path)),
            s.index
        );
    }
}
