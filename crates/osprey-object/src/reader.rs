//! Object reader.
//!
//! [`Object`] owns the raw bytes and decodes records lazily at their
//! computed section offsets. Symbol paths resolve through a binary search
//! over the sorted symbol index.

use std::io;
use std::ops::Deref;
use std::path::Path;

use crate::constants::{HEADER_SIZE, INVALID_INDEX, PROC_HEADER_SIZE, VERSION_MAJOR};
use crate::header::{Header, SectionOffsets};
use crate::ids::{
    ActionIdx, CallIdx, FieldIdx, ImplIdx, Locator, Section, StaticIdx, StringId, SymbolIdx,
    TemplateIdx, TypeIdx,
};
use crate::records::{
    ACTION_RECORD_SIZE, ActionRecord, CALL_RECORD_SIZE, CallRecord, DECL_RECORD_SIZE, DeclRecord,
    FIELD_RECORD_SIZE, FieldRecord, IMPL_RECORD_SIZE, ImplRecord, PARAM_RECORD_SIZE,
    PLACEHOLDER_RECORD_SIZE, PLUGIN_RECORD_SIZE, ParamRecord, PlaceholderRecord, PluginRecord,
    PoolRange, STATIC_RECORD_SIZE, SYMBOL_RECORD_SIZE, StaticRecord, SymbolRecord,
    TEMPLATE_RECORD_SIZE, TYPE_RECORD_SIZE, TemplateRecord, TypeRecord,
};

/// Storage for object bytes.
#[derive(Debug)]
pub struct ByteStorage(Vec<u8>);

impl Deref for ByteStorage {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ByteStorage {
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self(bytes))
    }
}

/// Object load error.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid magic: expected OSPO")]
    InvalidMagic,
    #[error("unsupported format version: {0} (expected {VERSION_MAJOR})")]
    UnsupportedVersion(u16),
    #[error("file too small: {0} bytes (minimum {HEADER_SIZE})")]
    FileTooSmall(usize),
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: header says {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },
    #[error("section layout exceeds the u32 file size range")]
    LayoutOverflow,
    #[error("section `{0}` extends past end of file")]
    Truncated(&'static str),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A loaded Osprey object.
///
/// Cold data is decoded on access through the record getters; nothing is
/// copied out of the underlying buffer except the fixed-width records
/// themselves.
#[derive(Debug)]
pub struct Object {
    storage: ByteStorage,
    header: Header,
    /// Cached section offsets (computed from header counts).
    offsets: SectionOffsets,
}

impl Object {
    /// Load an object from owned bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ObjectError> {
        Self::from_storage(ByteStorage::from_vec(bytes))
    }

    /// Load an object from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ObjectError> {
        let storage = ByteStorage::from_file(&path)?;
        Self::from_storage(storage)
    }

    fn from_storage(storage: ByteStorage) -> Result<Self, ObjectError> {
        if storage.len() < HEADER_SIZE {
            return Err(ObjectError::FileTooSmall(storage.len()));
        }

        let header = Header::from_bytes(&storage[..HEADER_SIZE]);

        if !header.validate_magic() {
            return Err(ObjectError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(ObjectError::UnsupportedVersion(header.version_major));
        }
        if header.total_size as usize != storage.len() {
            return Err(ObjectError::SizeMismatch {
                header: header.total_size,
                actual: storage.len(),
            });
        }

        let computed = crc32fast::hash(&storage[HEADER_SIZE..]);
        if computed != header.checksum {
            return Err(ObjectError::ChecksumMismatch {
                stored: header.checksum,
                computed,
            });
        }

        let offsets = header.compute_offsets().ok_or(ObjectError::LayoutOverflow)?;
        // Sections are laid out back to back, so bounding the last one
        // bounds them all.
        if offsets.code as usize + header.code_size as usize > storage.len() {
            return Err(ObjectError::Truncated("code"));
        }

        Ok(Self {
            storage,
            header,
            offsets,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn offsets(&self) -> &SectionOffsets {
        &self.offsets
    }

    pub fn bytes(&self) -> &[u8] {
        &self.storage
    }

    /// Record bytes for entry `index` of a section, or None past the count.
    fn record(&self, section_offset: u32, size: usize, index: u32, count: u32) -> Option<&[u8]> {
        if index >= count {
            return None;
        }
        let start = section_offset as usize + index as usize * size;
        self.storage.get(start..start + size)
    }

    /// Resolve a string table entry.
    ///
    /// # Panics
    /// Panics if `id` is out of range or the blob is not valid UTF-8; both
    /// indicate a corrupt object that passed the checksum.
    pub fn string(&self, id: StringId) -> &str {
        let table = self.offsets.str_table as usize;
        let start = self.read_u32(table + id.get() as usize * 4);
        let end = self.read_u32(table + (id.get() as usize + 1) * 4);
        let blob = self.offsets.str_blob as usize;
        std::str::from_utf8(&self.storage[blob + start as usize..blob + end as usize])
            .expect("string blob is not valid UTF-8")
    }

    #[inline]
    fn read_u32(&self, at: usize) -> u32 {
        u32::from_le_bytes([
            self.storage[at],
            self.storage[at + 1],
            self.storage[at + 2],
            self.storage[at + 3],
        ])
    }

    /// Entries of an IndexPool range.
    pub fn pool(&self, range: PoolRange) -> impl Iterator<Item = u32> + '_ {
        let base = self.offsets.index_pool as usize;
        range.range().map(move |i| self.read_u32(base + i * 4))
    }

    pub fn type_record(&self, idx: TypeIdx) -> Option<TypeRecord> {
        self.record(
            self.offsets.types,
            TYPE_RECORD_SIZE,
            idx.get(),
            self.header.types_count,
        )
        .map(TypeRecord::from_bytes)
    }

    pub fn template(&self, idx: TemplateIdx) -> Option<TemplateRecord> {
        self.record(
            self.offsets.templates,
            TEMPLATE_RECORD_SIZE,
            idx.get(),
            self.header.templates_count,
        )
        .map(TemplateRecord::from_bytes)
    }

    pub fn placeholder(&self, index: u32) -> Option<PlaceholderRecord> {
        self.record(
            self.offsets.placeholders,
            PLACEHOLDER_RECORD_SIZE,
            index,
            self.header.placeholders_count,
        )
        .map(PlaceholderRecord::from_bytes)
    }

    /// Declaration record from one of the six type-declaration sections.
    pub fn decl(&self, section: Section, index: u32) -> Option<DeclRecord> {
        let (offset, count) = match section {
            Section::Existential => (self.offsets.existentials, self.header.existentials_count),
            Section::Concept => (self.offsets.concepts, self.header.concepts_count),
            Section::Class => (self.offsets.classes, self.header.classes_count),
            Section::Struct => (self.offsets.structs, self.header.structs_count),
            Section::Instance => (self.offsets.instances, self.header.instances_count),
            Section::Enum => (self.offsets.enums, self.header.enums_count),
            _ => return None,
        };
        self.record(offset, DECL_RECORD_SIZE, index, count)
            .map(DeclRecord::from_bytes)
    }

    pub fn field(&self, idx: FieldIdx) -> Option<FieldRecord> {
        self.record(
            self.offsets.fields,
            FIELD_RECORD_SIZE,
            idx.get(),
            self.header.fields_count,
        )
        .map(FieldRecord::from_bytes)
    }

    pub fn static_record(&self, idx: StaticIdx) -> Option<StaticRecord> {
        self.record(
            self.offsets.statics,
            STATIC_RECORD_SIZE,
            idx.get(),
            self.header.statics_count,
        )
        .map(StaticRecord::from_bytes)
    }

    pub fn param(&self, index: u32) -> Option<ParamRecord> {
        self.record(
            self.offsets.params,
            PARAM_RECORD_SIZE,
            index,
            self.header.params_count,
        )
        .map(ParamRecord::from_bytes)
    }

    pub fn call(&self, idx: CallIdx) -> Option<CallRecord> {
        self.record(
            self.offsets.calls,
            CALL_RECORD_SIZE,
            idx.get(),
            self.header.calls_count,
        )
        .map(CallRecord::from_bytes)
    }

    pub fn impl_record(&self, idx: ImplIdx) -> Option<ImplRecord> {
        self.record(
            self.offsets.impls,
            IMPL_RECORD_SIZE,
            idx.get(),
            self.header.impls_count,
        )
        .map(ImplRecord::from_bytes)
    }

    pub fn action(&self, idx: ActionIdx) -> Option<ActionRecord> {
        self.record(
            self.offsets.actions,
            ACTION_RECORD_SIZE,
            idx.get(),
            self.header.actions_count,
        )
        .map(ActionRecord::from_bytes)
    }

    pub fn symbol(&self, idx: SymbolIdx) -> Option<SymbolRecord> {
        self.record(
            self.offsets.symbols,
            SYMBOL_RECORD_SIZE,
            idx.get(),
            self.header.symbols_count,
        )
        .map(SymbolRecord::from_bytes)
    }

    pub fn plugin(&self) -> Option<PluginRecord> {
        self.record(self.offsets.plugin, PLUGIN_RECORD_SIZE, 0, self.header.plugin_count)
            .map(PluginRecord::from_bytes)
    }

    /// Path string of a symbol.
    pub fn symbol_path(&self, idx: SymbolIdx) -> Option<&str> {
        let record = self.symbol(idx)?;
        Some(self.string(StringId(record.path)))
    }

    /// Resolve a symbol path to its descriptor locator via binary search
    /// over the sorted symbol index.
    pub fn lookup_path(&self, path: &str) -> Option<Locator> {
        let count = self.header.symbols_count as usize;
        let base = self.offsets.sorted_symbols as usize;

        let mut lo = 0usize;
        let mut hi = count;
        while lo < hi {
            let mid = (lo + hi) / 2;
            let sym = SymbolIdx(self.read_u32(base + mid * 4));
            let mid_path = self.symbol_path(sym)?;
            match mid_path.cmp(path) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => {
                    let record = self.symbol(sym)?;
                    let section = Section::from_u8(record.section as u8)?;
                    return Some(Locator::new(section, record.index));
                }
            }
        }
        None
    }

    /// Procedure header and instruction stream for a call with a body.
    pub fn call_code(&self, idx: CallIdx) -> Option<(crate::records::ProcedureHeader, &[u8])> {
        let call = self.call(idx)?;
        if call.code_offset == INVALID_INDEX {
            return None;
        }
        let start = self.offsets.code as usize + call.code_offset as usize;
        let header_bytes = self.storage.get(start..start + PROC_HEADER_SIZE)?;
        let header = crate::records::ProcedureHeader::from_bytes(header_bytes);
        let body = self
            .storage
            .get(start + PROC_HEADER_SIZE..start + header.size as usize)?;
        Some((header, body))
    }
}
