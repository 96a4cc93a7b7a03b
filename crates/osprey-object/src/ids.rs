//! Typed section indices.
//!
//! Every cross-reference in the object format is a plain u32 index into a
//! named section. On the Rust side each section gets its own newtype so a
//! call index cannot be handed to a field lookup by accident; the raw u32
//! only appears at the serialization boundary.

use crate::constants::INVALID_INDEX;

macro_rules! section_index {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// The reserved "absent" value.
            pub const INVALID: Self = Self(INVALID_INDEX);

            #[inline]
            pub fn get(self) -> u32 {
                self.0
            }

            #[inline]
            pub fn is_invalid(self) -> bool {
                self.0 == INVALID_INDEX
            }
        }
    };
}

section_index!(
    /// Index into the StringTable section.
    StringId
);
section_index!(
    /// Index into the Types section (insertion order of the type graph).
    TypeIdx
);
section_index!(
    /// Index into the Templates section.
    TemplateIdx
);
section_index!(
    /// Index into the Existentials section.
    ExistentialIdx
);
section_index!(
    /// Index into the Statics section.
    StaticIdx
);
section_index!(
    /// Index into the Fields section.
    FieldIdx
);
section_index!(
    /// Index into the Calls section.
    CallIdx
);
section_index!(
    /// Index into the Impls section.
    ImplIdx
);
section_index!(
    /// Index into the Actions section.
    ActionIdx
);
section_index!(
    /// Index into the Concepts section.
    ConceptIdx
);
section_index!(
    /// Index into the Classes section.
    ClassIdx
);
section_index!(
    /// Index into the Structs section.
    StructIdx
);
section_index!(
    /// Index into the Instances section.
    InstanceIdx
);
section_index!(
    /// Index into the Enums section.
    EnumIdx
);
section_index!(
    /// Index into the Symbols section.
    SymbolIdx
);

/// Descriptor section tag. Together with an index it locates one descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Section {
    Type = 0,
    Template = 1,
    Existential = 2,
    Static = 3,
    Field = 4,
    Call = 5,
    Impl = 6,
    Action = 7,
    Concept = 8,
    Class = 9,
    Struct = 10,
    Instance = 11,
    Enum = 12,
}

impl Section {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Type,
            1 => Self::Template,
            2 => Self::Existential,
            3 => Self::Static,
            4 => Self::Field,
            5 => Self::Call,
            6 => Self::Impl,
            7 => Self::Action,
            8 => Self::Concept,
            9 => Self::Class,
            10 => Self::Struct,
            11 => Self::Instance,
            12 => Self::Enum,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Template => "template",
            Self::Existential => "existential",
            Self::Static => "static",
            Self::Field => "field",
            Self::Call => "call",
            Self::Impl => "impl",
            Self::Action => "action",
            Self::Concept => "concept",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Instance => "instance",
            Self::Enum => "enum",
        }
    }

    /// Sections that declare a named type (one `DeclRecord` each).
    pub fn is_type_decl(self) -> bool {
        matches!(
            self,
            Self::Existential
                | Self::Concept
                | Self::Class
                | Self::Struct
                | Self::Instance
                | Self::Enum
        )
    }
}

/// A `(section, index)` pair locating one descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Locator {
    pub section: Section,
    pub index: u32,
}

impl Locator {
    pub fn new(section: Section, index: u32) -> Self {
        Self { section, index }
    }
}
