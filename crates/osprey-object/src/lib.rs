//! Binary object format and reader for the Osprey toolchain.
//!
//! This crate contains:
//! - Format constants and the versioned envelope header
//! - Typed section indices and fixed-width descriptor records
//! - Instruction opcodes and the trap table contract
//! - The [`Object`] reader with binary-search symbol lookup
//! - A human-readable `dump` for debugging
//!
//! The writer side lives in `osprey-builder`; an interpreter or loader only
//! needs this crate.

mod constants;
mod dump;
mod header;
mod ids;
mod opcode;
mod reader;
mod records;
mod trap;

#[cfg(test)]
mod header_tests;
#[cfg(test)]
mod opcode_tests;
#[cfg(test)]
mod records_tests;

pub use constants::{
    HEADER_SIZE, INVALID_INDEX, MAGIC, PROC_HEADER_SIZE, SECTION_ALIGN, VERSION_MAJOR,
    VERSION_MINOR, VERSION_PATCH, align_up,
};
pub use dump::dump;
pub use header::{Header, SectionOffsets};
pub use ids::{
    ActionIdx, CallIdx, ClassIdx, ConceptIdx, EnumIdx, ExistentialIdx, FieldIdx, ImplIdx,
    InstanceIdx, Locator, Section, StaticIdx, StringId, StructIdx, SymbolIdx, TemplateIdx, TypeIdx,
};
pub use opcode::{Opcode, TRAP_INDEX_FOLLOWS, TRAP_SLOT_INDEX_FOLLOWS};
pub use reader::{ByteStorage, Object, ObjectError};
pub use records::{
    ACTION_RECORD_SIZE, ActionRecord, BoundKind, CALL_RECORD_SIZE, CallRecord, DECL_RECORD_SIZE,
    DeclRecord, FIELD_RECORD_SIZE, FieldRecord, IMPL_RECORD_SIZE, ImplRecord, PARAM_RECORD_SIZE,
    PLACEHOLDER_RECORD_SIZE, PLUGIN_RECORD_SIZE, ParamKind, ParamRecord, PlaceholderRecord,
    PluginRecord, PoolRange, ProcedureHeader, SYMBOL_RECORD_SIZE, SpecialTag, STATIC_RECORD_SIZE,
    StaticRecord, SymbolRecord, TEMPLATE_RECORD_SIZE, TYPE_RECORD_SIZE, TemplateRecord, TypeKind,
    TypeRecord, Variance, call_flags, decl_flags, opt_index,
};
pub use trap::TrapTable;
