//! Fixed-width descriptor records.
//!
//! Every section is a vector of one of these records. Cross-references are
//! plain u32 indices into sibling sections (`INVALID_INDEX` = absent), and
//! variable-length per-descriptor lists are `PoolRange` spans into either
//! the shared IndexPool (u32 entries) or the Params section.
//!
//! All encodings are little-endian; each record serializes to a byte array
//! of its size constant, so a drifting field layout fails the encode/decode
//! tests.

use crate::constants::INVALID_INDEX;

pub const TYPE_RECORD_SIZE: usize = 24;
pub const TEMPLATE_RECORD_SIZE: usize = 12;
pub const PLACEHOLDER_RECORD_SIZE: usize = 16;
pub const DECL_RECORD_SIZE: usize = 52;
pub const FIELD_RECORD_SIZE: usize = 12;
pub const STATIC_RECORD_SIZE: usize = 12;
pub const PARAM_RECORD_SIZE: usize = 12;
pub const CALL_RECORD_SIZE: usize = 40;
pub const ACTION_RECORD_SIZE: usize = 24;
pub const IMPL_RECORD_SIZE: usize = 24;
pub const SYMBOL_RECORD_SIZE: usize = 12;
pub const PLUGIN_RECORD_SIZE: usize = 8;

#[inline]
fn rd16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
fn rd32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Span into a pool section: entries `[start, start + count)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct PoolRange {
    pub start: u32,
    pub count: u32,
}

impl PoolRange {
    pub const EMPTY: Self = Self { start: 0, count: 0 };

    #[inline]
    pub fn range(self) -> std::ops::Range<usize> {
        let start = self.start as usize;
        start..start + self.count as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.count == 0
    }
}

/// Type node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TypeKind {
    /// Backed by a descriptor (`section` + `data0` locate it).
    Concrete = 0,
    /// Generic placeholder (`data0` = owning template, `data1` = ordinal).
    Placeholder = 1,
    /// Union of the member types in the param range.
    Union = 2,
    /// Sentinel type (`tag` names it).
    Special = 3,
}

impl TypeKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Concrete,
            1 => Self::Placeholder,
            2 => Self::Union,
            3 => Self::Special,
            _ => return None,
        })
    }
}

/// Sentinel tag for `TypeKind::Special` nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SpecialTag {
    /// The reserved "no return" type; procedures declared with it never
    /// return normally.
    NoReturn = 0,
}

impl SpecialTag {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NoReturn),
            _ => None,
        }
    }
}

/// Generic parameter substitution direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Variance {
    Invariant = 0,
    Covariant = 1,
    Contravariant = 2,
}

impl Variance {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Invariant,
            1 => Self::Covariant,
            2 => Self::Contravariant,
            _ => return None,
        })
    }
}

/// Placeholder bound constraint kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BoundKind {
    None = 0,
    /// Placeholder must be a subtype of the bound.
    Extends = 1,
    /// Placeholder must be a supertype of the bound.
    Super = 2,
}

impl BoundKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::None,
            1 => Self::Extends,
            2 => Self::Super,
            _ => return None,
        })
    }
}

/// Parameter group kind. The serialized parameter list is already in the
/// canonical order: positional, then named/context, then at most one rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ParamKind {
    List = 0,
    ListOptional = 1,
    Named = 2,
    NamedOptional = 3,
    Context = 4,
    Rest = 5,
}

impl ParamKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::List,
            1 => Self::ListOptional,
            2 => Self::Named,
            3 => Self::NamedOptional,
            4 => Self::Context,
            5 => Self::Rest,
            _ => return None,
        })
    }

    /// Positional group: leading parameters bound by position.
    pub fn is_positional(self) -> bool {
        matches!(self, Self::List | Self::ListOptional)
    }

    pub fn is_optional(self) -> bool {
        matches!(self, Self::ListOptional | Self::NamedOptional)
    }
}

/// Flags on type declarations (existential/concept/class/struct/instance/enum).
pub mod decl_flags {
    /// No subtypes permitted.
    pub const FINAL: u32 = 1 << 0;
    /// Closed hierarchy: direct subtypes are enumerated in the sealed list.
    pub const SEALED: u32 = 1 << 1;
    /// Visible outside the declaring module.
    pub const GLOBAL: u32 = 1 << 2;
}

/// Flags on calls.
pub mod call_flags {
    /// Has a receiver; argument 0 slot is `this`.
    pub const BOUND: u32 = 1 << 0;
    /// Constructor.
    pub const CTOR: u32 = 1 << 1;
    /// Inline hint for the interpreter.
    pub const INLINE: u32 = 1 << 2;
    /// Visible outside the declaring module.
    pub const GLOBAL: u32 = 1 << 3;
    /// Declared return type is the reserved no-return sentinel.
    pub const NO_RETURN: u32 = 1 << 4;
}

/// Type node (24 bytes).
///
/// Kind-specific payload:
/// - Concrete: `section`/`data0` = target descriptor, `params` = type args
/// - Placeholder: `data0` = owning template, `data1` = ordinal
/// - Union: `params` = member types
/// - Special: `tag` = sentinel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeRecord {
    pub kind: u8,
    pub tag: u8,
    /// Target descriptor section for Concrete nodes, 0xFF otherwise.
    pub section: u8,
    pub _pad: u8,
    pub super_type: u32,
    pub data0: u32,
    pub data1: u32,
    pub params: PoolRange,
}

impl TypeRecord {
    pub fn to_bytes(&self) -> [u8; TYPE_RECORD_SIZE] {
        let mut b = [0u8; TYPE_RECORD_SIZE];
        b[0] = self.kind;
        b[1] = self.tag;
        b[2] = self.section;
        b[4..8].copy_from_slice(&self.super_type.to_le_bytes());
        b[8..12].copy_from_slice(&self.data0.to_le_bytes());
        b[12..16].copy_from_slice(&self.data1.to_le_bytes());
        b[16..20].copy_from_slice(&self.params.start.to_le_bytes());
        b[20..24].copy_from_slice(&self.params.count.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            kind: b[0],
            tag: b[1],
            section: b[2],
            _pad: 0,
            super_type: rd32(b, 4),
            data0: rd32(b, 8),
            data1: rd32(b, 12),
            params: PoolRange {
                start: rd32(b, 16),
                count: rd32(b, 20),
            },
        }
    }
}

/// Template (12 bytes): placeholders live in the Placeholders section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateRecord {
    pub path: u32,
    pub placeholders: PoolRange,
}

impl TemplateRecord {
    pub fn to_bytes(&self) -> [u8; TEMPLATE_RECORD_SIZE] {
        let mut b = [0u8; TEMPLATE_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.path.to_le_bytes());
        b[4..8].copy_from_slice(&self.placeholders.start.to_le_bytes());
        b[8..12].copy_from_slice(&self.placeholders.count.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            path: rd32(b, 0),
            placeholders: PoolRange {
                start: rd32(b, 4),
                count: rd32(b, 8),
            },
        }
    }
}

/// Template placeholder (16 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaceholderRecord {
    pub name: u32,
    /// The placeholder's materialized type node.
    pub ty: u32,
    pub variance: u8,
    pub bound_kind: u8,
    pub bound_type: u32,
}

impl PlaceholderRecord {
    pub fn to_bytes(&self) -> [u8; PLACEHOLDER_RECORD_SIZE] {
        let mut b = [0u8; PLACEHOLDER_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.name.to_le_bytes());
        b[4..8].copy_from_slice(&self.ty.to_le_bytes());
        b[8] = self.variance;
        b[9] = self.bound_kind;
        b[12..16].copy_from_slice(&self.bound_type.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            name: rd32(b, 0),
            ty: rd32(b, 4),
            variance: b[8],
            bound_kind: b[9],
            bound_type: rd32(b, 12),
        }
    }
}

/// Type declaration (52 bytes), shared by the six declaration sections.
///
/// Ranges index the shared IndexPool. Concepts use `methods` for their
/// actions; `sealed` lists the permitted direct subtypes' type indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeclRecord {
    pub path: u32,
    pub own_type: u32,
    pub super_type: u32,
    pub template: u32,
    pub flags: u32,
    pub members: PoolRange,
    pub methods: PoolRange,
    pub impls: PoolRange,
    pub sealed: PoolRange,
}

impl DeclRecord {
    pub fn to_bytes(&self) -> [u8; DECL_RECORD_SIZE] {
        let mut b = [0u8; DECL_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.path.to_le_bytes());
        b[4..8].copy_from_slice(&self.own_type.to_le_bytes());
        b[8..12].copy_from_slice(&self.super_type.to_le_bytes());
        b[12..16].copy_from_slice(&self.template.to_le_bytes());
        b[16..20].copy_from_slice(&self.flags.to_le_bytes());
        b[20..24].copy_from_slice(&self.members.start.to_le_bytes());
        b[24..28].copy_from_slice(&self.members.count.to_le_bytes());
        b[28..32].copy_from_slice(&self.methods.start.to_le_bytes());
        b[32..36].copy_from_slice(&self.methods.count.to_le_bytes());
        b[36..40].copy_from_slice(&self.impls.start.to_le_bytes());
        b[40..44].copy_from_slice(&self.impls.count.to_le_bytes());
        b[44..48].copy_from_slice(&self.sealed.start.to_le_bytes());
        b[48..52].copy_from_slice(&self.sealed.count.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            path: rd32(b, 0),
            own_type: rd32(b, 4),
            super_type: rd32(b, 8),
            template: rd32(b, 12),
            flags: rd32(b, 16),
            members: PoolRange {
                start: rd32(b, 20),
                count: rd32(b, 24),
            },
            methods: PoolRange {
                start: rd32(b, 28),
                count: rd32(b, 32),
            },
            impls: PoolRange {
                start: rd32(b, 36),
                count: rd32(b, 40),
            },
            sealed: PoolRange {
                start: rd32(b, 44),
                count: rd32(b, 48),
            },
        }
    }
}

/// Field (12 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRecord {
    pub path: u32,
    pub ty: u32,
    pub flags: u32,
}

impl FieldRecord {
    pub fn to_bytes(&self) -> [u8; FIELD_RECORD_SIZE] {
        let mut b = [0u8; FIELD_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.path.to_le_bytes());
        b[4..8].copy_from_slice(&self.ty.to_le_bytes());
        b[8..12].copy_from_slice(&self.flags.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            path: rd32(b, 0),
            ty: rd32(b, 4),
            flags: rd32(b, 8),
        }
    }
}

/// Static (12 bytes). Same wire shape as a field, different section.
pub type StaticRecord = FieldRecord;

/// Parameter (12 bytes). `name` is INVALID_INDEX for the rest parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamRecord {
    pub name: u32,
    pub ty: u32,
    pub kind: u8,
}

impl ParamRecord {
    pub fn to_bytes(&self) -> [u8; PARAM_RECORD_SIZE] {
        let mut b = [0u8; PARAM_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.name.to_le_bytes());
        b[4..8].copy_from_slice(&self.ty.to_le_bytes());
        b[8] = self.kind;
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            name: rd32(b, 0),
            ty: rd32(b, 4),
            kind: b[8],
        }
    }
}

/// Call (40 bytes): function, method, constructor, or impl extension body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallRecord {
    pub path: u32,
    pub template: u32,
    /// Receiver section tag, INVALID_INDEX for free functions.
    pub receiver_section: u32,
    pub receiver_index: u32,
    pub flags: u32,
    pub return_type: u32,
    pub params: PoolRange,
    /// Byte offset of the procedure header in the code segment;
    /// INVALID_INDEX for bodiless calls.
    pub code_offset: u32,
}

impl CallRecord {
    pub fn to_bytes(&self) -> [u8; CALL_RECORD_SIZE] {
        let mut b = [0u8; CALL_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.path.to_le_bytes());
        b[4..8].copy_from_slice(&self.template.to_le_bytes());
        b[8..12].copy_from_slice(&self.receiver_section.to_le_bytes());
        b[12..16].copy_from_slice(&self.receiver_index.to_le_bytes());
        b[16..20].copy_from_slice(&self.flags.to_le_bytes());
        b[20..24].copy_from_slice(&self.return_type.to_le_bytes());
        b[24..28].copy_from_slice(&self.params.start.to_le_bytes());
        b[28..32].copy_from_slice(&self.params.count.to_le_bytes());
        b[32..36].copy_from_slice(&self.code_offset.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            path: rd32(b, 0),
            template: rd32(b, 4),
            receiver_section: rd32(b, 8),
            receiver_index: rd32(b, 12),
            flags: rd32(b, 16),
            return_type: rd32(b, 20),
            params: PoolRange {
                start: rd32(b, 24),
                count: rd32(b, 28),
            },
            code_offset: rd32(b, 32),
        }
    }
}

/// Concept action (24 bytes): a method signature with no body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionRecord {
    pub path: u32,
    pub template: u32,
    pub concept: u32,
    pub return_type: u32,
    pub params: PoolRange,
}

impl ActionRecord {
    pub fn to_bytes(&self) -> [u8; ACTION_RECORD_SIZE] {
        let mut b = [0u8; ACTION_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.path.to_le_bytes());
        b[4..8].copy_from_slice(&self.template.to_le_bytes());
        b[8..12].copy_from_slice(&self.concept.to_le_bytes());
        b[12..16].copy_from_slice(&self.return_type.to_le_bytes());
        b[16..20].copy_from_slice(&self.params.start.to_le_bytes());
        b[20..24].copy_from_slice(&self.params.count.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            path: rd32(b, 0),
            template: rd32(b, 4),
            concept: rd32(b, 8),
            return_type: rd32(b, 12),
            params: PoolRange {
                start: rd32(b, 16),
                count: rd32(b, 20),
            },
        }
    }
}

/// Impl (24 bytes): binds a concept to a receiver.
///
/// `extensions` spans `(action, call)` u32 pairs in the IndexPool, so the
/// pool range covers `2 * pair_count` entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImplRecord {
    pub concept: u32,
    pub receiver_section: u32,
    pub receiver_index: u32,
    pub impl_type: u32,
    pub extensions: PoolRange,
}

impl ImplRecord {
    pub fn to_bytes(&self) -> [u8; IMPL_RECORD_SIZE] {
        let mut b = [0u8; IMPL_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.concept.to_le_bytes());
        b[4..8].copy_from_slice(&self.receiver_section.to_le_bytes());
        b[8..12].copy_from_slice(&self.receiver_index.to_le_bytes());
        b[12..16].copy_from_slice(&self.impl_type.to_le_bytes());
        b[16..20].copy_from_slice(&self.extensions.start.to_le_bytes());
        b[20..24].copy_from_slice(&self.extensions.count.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            concept: rd32(b, 0),
            receiver_section: rd32(b, 4),
            receiver_index: rd32(b, 8),
            impl_type: rd32(b, 12),
            extensions: PoolRange {
                start: rd32(b, 16),
                count: rd32(b, 20),
            },
        }
    }
}

/// Symbol (12 bytes): `path → (section, index)` in insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolRecord {
    pub path: u32,
    pub section: u32,
    pub index: u32,
}

impl SymbolRecord {
    pub fn to_bytes(&self) -> [u8; SYMBOL_RECORD_SIZE] {
        let mut b = [0u8; SYMBOL_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.path.to_le_bytes());
        b[4..8].copy_from_slice(&self.section.to_le_bytes());
        b[8..12].copy_from_slice(&self.index.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            path: rd32(b, 0),
            section: rd32(b, 4),
            index: rd32(b, 8),
        }
    }
}

/// Plugin location (8 bytes). At most one per object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PluginRecord {
    pub location: u32,
}

impl PluginRecord {
    pub fn to_bytes(&self) -> [u8; PLUGIN_RECORD_SIZE] {
        let mut b = [0u8; PLUGIN_RECORD_SIZE];
        b[0..4].copy_from_slice(&self.location.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            location: rd32(b, 0),
        }
    }
}

/// Per-procedure header at the start of each call's code (16 bytes).
///
/// The interpreter uses the frame counts to size the call frame before
/// stepping into the instruction stream that follows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcedureHeader {
    /// Total procedure size in bytes, header included.
    pub size: u32,
    pub num_args: u16,
    pub num_locals: u16,
    pub num_lexicals: u16,
}

impl ProcedureHeader {
    pub fn to_bytes(&self) -> [u8; crate::constants::PROC_HEADER_SIZE] {
        let mut b = [0u8; crate::constants::PROC_HEADER_SIZE];
        b[0..4].copy_from_slice(&self.size.to_le_bytes());
        b[4..6].copy_from_slice(&self.num_args.to_le_bytes());
        b[6..8].copy_from_slice(&self.num_locals.to_le_bytes());
        b[8..10].copy_from_slice(&self.num_lexicals.to_le_bytes());
        b
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            size: rd32(b, 0),
            num_args: rd16(b, 4),
            num_locals: rd16(b, 6),
            num_lexicals: rd16(b, 8),
        }
    }
}

/// Wrap a raw cross-reference, mapping INVALID_INDEX to `None`.
#[inline]
pub fn opt_index(raw: u32) -> Option<u32> {
    if raw == INVALID_INDEX { None } else { Some(raw) }
}
