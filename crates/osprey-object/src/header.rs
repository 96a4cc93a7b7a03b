//! Object file header (128 bytes).
//!
//! The envelope stores the format identity, sizes, and per-section element
//! counts. Section offsets are never stored: they are recomputed from the
//! counts and `SECTION_ALIGN`, so the object is relocatable by construction.
//!
//! Section order: Header → StringBlob → StringTable → IndexPool → Types →
//! Templates → Placeholders → Existentials → Statics → Fields → Params →
//! Calls → Impls → Actions → Concepts → Classes → Structs → Instances →
//! Enums → Symbols → SortedSymbols → Plugin → Code

use crate::constants::{HEADER_SIZE, MAGIC, SECTION_ALIGN, VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH};
use crate::records;

/// File header - first 128 bytes of the object file.
///
/// Layout:
/// - 0-11: magic, version major/minor/patch (3 × u16), pad
/// - 12-31: checksum, total_size, root_offset, str_blob_size, code_size
/// - 32-107: element counts (19 × u32) — order matches section order
/// - 108-127: reserved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Magic bytes: b"OSPO"
    pub magic: [u8; 4],
    pub version_major: u16,
    pub version_minor: u16,
    pub version_patch: u16,
    /// CRC32 checksum of everything after the header.
    pub checksum: u32,
    /// Total file size in bytes.
    pub total_size: u32,
    /// Offset of the first section (the string blob).
    pub root_offset: u32,
    /// Size of the string blob in bytes.
    pub str_blob_size: u32,
    /// Size of the bytecode segment in bytes.
    pub code_size: u32,

    // Element counts — order matches section order.
    pub str_table_count: u32,
    pub index_pool_count: u32,
    pub types_count: u32,
    pub templates_count: u32,
    pub placeholders_count: u32,
    pub existentials_count: u32,
    pub statics_count: u32,
    pub fields_count: u32,
    pub params_count: u32,
    pub calls_count: u32,
    pub impls_count: u32,
    pub actions_count: u32,
    pub concepts_count: u32,
    pub classes_count: u32,
    pub structs_count: u32,
    pub instances_count: u32,
    pub enums_count: u32,
    pub symbols_count: u32,
    pub plugin_count: u32,

    pub _reserved: [u8; 20],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            version_patch: VERSION_PATCH,
            checksum: 0,
            total_size: 0,
            root_offset: HEADER_SIZE as u32,
            str_blob_size: 0,
            code_size: 0,
            str_table_count: 0,
            index_pool_count: 0,
            types_count: 0,
            templates_count: 0,
            placeholders_count: 0,
            existentials_count: 0,
            statics_count: 0,
            fields_count: 0,
            params_count: 0,
            calls_count: 0,
            impls_count: 0,
            actions_count: 0,
            concepts_count: 0,
            classes_count: 0,
            structs_count: 0,
            instances_count: 0,
            enums_count: 0,
            symbols_count: 0,
            plugin_count: 0,
            _reserved: [0; 20],
        }
    }
}

/// Computed section offsets derived from header counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionOffsets {
    pub str_blob: u32,
    pub str_table: u32,
    pub index_pool: u32,
    pub types: u32,
    pub templates: u32,
    pub placeholders: u32,
    pub existentials: u32,
    pub statics: u32,
    pub fields: u32,
    pub params: u32,
    pub calls: u32,
    pub impls: u32,
    pub actions: u32,
    pub concepts: u32,
    pub classes: u32,
    pub structs: u32,
    pub instances: u32,
    pub enums: u32,
    pub symbols: u32,
    pub sorted_symbols: u32,
    pub plugin: u32,
    pub code: u32,
}

#[inline]
fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl Header {
    /// Decode header from 128 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        let mut reserved = [0u8; 20];
        reserved.copy_from_slice(&bytes[108..128]);

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version_major: read_u16_le(bytes, 4),
            version_minor: read_u16_le(bytes, 6),
            version_patch: read_u16_le(bytes, 8),
            checksum: read_u32_le(bytes, 12),
            total_size: read_u32_le(bytes, 16),
            root_offset: read_u32_le(bytes, 20),
            str_blob_size: read_u32_le(bytes, 24),
            code_size: read_u32_le(bytes, 28),
            str_table_count: read_u32_le(bytes, 32),
            index_pool_count: read_u32_le(bytes, 36),
            types_count: read_u32_le(bytes, 40),
            templates_count: read_u32_le(bytes, 44),
            placeholders_count: read_u32_le(bytes, 48),
            existentials_count: read_u32_le(bytes, 52),
            statics_count: read_u32_le(bytes, 56),
            fields_count: read_u32_le(bytes, 60),
            params_count: read_u32_le(bytes, 64),
            calls_count: read_u32_le(bytes, 68),
            impls_count: read_u32_le(bytes, 72),
            actions_count: read_u32_le(bytes, 76),
            concepts_count: read_u32_le(bytes, 80),
            classes_count: read_u32_le(bytes, 84),
            structs_count: read_u32_le(bytes, 88),
            instances_count: read_u32_le(bytes, 92),
            enums_count: read_u32_le(bytes, 96),
            symbols_count: read_u32_le(bytes, 100),
            plugin_count: read_u32_le(bytes, 104),
            _reserved: reserved,
        }
    }

    /// Encode header to 128 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version_major.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.version_minor.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.version_patch.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.total_size.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.root_offset.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.str_blob_size.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.code_size.to_le_bytes());
        bytes[32..36].copy_from_slice(&self.str_table_count.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.index_pool_count.to_le_bytes());
        bytes[40..44].copy_from_slice(&self.types_count.to_le_bytes());
        bytes[44..48].copy_from_slice(&self.templates_count.to_le_bytes());
        bytes[48..52].copy_from_slice(&self.placeholders_count.to_le_bytes());
        bytes[52..56].copy_from_slice(&self.existentials_count.to_le_bytes());
        bytes[56..60].copy_from_slice(&self.statics_count.to_le_bytes());
        bytes[60..64].copy_from_slice(&self.fields_count.to_le_bytes());
        bytes[64..68].copy_from_slice(&self.params_count.to_le_bytes());
        bytes[68..72].copy_from_slice(&self.calls_count.to_le_bytes());
        bytes[72..76].copy_from_slice(&self.impls_count.to_le_bytes());
        bytes[76..80].copy_from_slice(&self.actions_count.to_le_bytes());
        bytes[80..84].copy_from_slice(&self.concepts_count.to_le_bytes());
        bytes[84..88].copy_from_slice(&self.classes_count.to_le_bytes());
        bytes[88..92].copy_from_slice(&self.structs_count.to_le_bytes());
        bytes[92..96].copy_from_slice(&self.instances_count.to_le_bytes());
        bytes[96..100].copy_from_slice(&self.enums_count.to_le_bytes());
        bytes[100..104].copy_from_slice(&self.symbols_count.to_le_bytes());
        bytes[104..108].copy_from_slice(&self.plugin_count.to_le_bytes());
        bytes[108..128].copy_from_slice(&self._reserved);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version_major == VERSION_MAJOR
    }

    /// Compute section offsets from counts and blob sizes.
    ///
    /// All sections are 64-byte aligned; each offset follows from the
    /// previous section's offset plus its size. Counts come from an
    /// untrusted header, so the arithmetic runs in u64 and a layout that
    /// does not fit the u32 file-size range comes back as `None` instead
    /// of wrapping.
    pub fn compute_offsets(&self) -> Option<SectionOffsets> {
        let align = SECTION_ALIGN as u64;
        let align_up = |value: u64| (value + align - 1) & !(align - 1);

        let str_blob = HEADER_SIZE as u64;
        // String table has one sentinel end-offset entry past the count.
        let str_table = align_up(str_blob + self.str_blob_size as u64);
        let str_table_size = (self.str_table_count as u64 + 1) * 4;

        let index_pool = align_up(str_table + str_table_size);
        let index_pool_size = self.index_pool_count as u64 * 4;

        let types = align_up(index_pool + index_pool_size);
        let types_size = self.types_count as u64 * records::TYPE_RECORD_SIZE as u64;

        let templates = align_up(types + types_size);
        let templates_size = self.templates_count as u64 * records::TEMPLATE_RECORD_SIZE as u64;

        let placeholders = align_up(templates + templates_size);
        let placeholders_size =
            self.placeholders_count as u64 * records::PLACEHOLDER_RECORD_SIZE as u64;

        let decl = records::DECL_RECORD_SIZE as u64;

        let existentials = align_up(placeholders + placeholders_size);
        let statics = align_up(existentials + self.existentials_count as u64 * decl);
        let statics_size = self.statics_count as u64 * records::STATIC_RECORD_SIZE as u64;

        let fields = align_up(statics + statics_size);
        let fields_size = self.fields_count as u64 * records::FIELD_RECORD_SIZE as u64;

        let params = align_up(fields + fields_size);
        let params_size = self.params_count as u64 * records::PARAM_RECORD_SIZE as u64;

        let calls = align_up(params + params_size);
        let calls_size = self.calls_count as u64 * records::CALL_RECORD_SIZE as u64;

        let impls = align_up(calls + calls_size);
        let impls_size = self.impls_count as u64 * records::IMPL_RECORD_SIZE as u64;

        let actions = align_up(impls + impls_size);
        let actions_size = self.actions_count as u64 * records::ACTION_RECORD_SIZE as u64;

        let concepts = align_up(actions + actions_size);
        let classes = align_up(concepts + self.concepts_count as u64 * decl);
        let structs = align_up(classes + self.classes_count as u64 * decl);
        let instances = align_up(structs + self.structs_count as u64 * decl);
        let enums = align_up(instances + self.instances_count as u64 * decl);

        let symbols = align_up(enums + self.enums_count as u64 * decl);
        let symbols_size = self.symbols_count as u64 * records::SYMBOL_RECORD_SIZE as u64;

        let sorted_symbols = align_up(symbols + symbols_size);
        let sorted_symbols_size = self.symbols_count as u64 * 4;

        let plugin = align_up(sorted_symbols + sorted_symbols_size);
        let plugin_size = self.plugin_count as u64 * records::PLUGIN_RECORD_SIZE as u64;

        let code = align_up(plugin + plugin_size);
        if align_up(code + self.code_size as u64) > u32::MAX as u64 {
            return None;
        }

        // Offsets are monotonic, so the code-segment bound above covers
        // every narrowing below.
        Some(SectionOffsets {
            str_blob: str_blob as u32,
            str_table: str_table as u32,
            index_pool: index_pool as u32,
            types: types as u32,
            templates: templates as u32,
            placeholders: placeholders as u32,
            existentials: existentials as u32,
            statics: statics as u32,
            fields: fields as u32,
            params: params as u32,
            calls: calls as u32,
            impls: impls as u32,
            actions: actions as u32,
            concepts: concepts as u32,
            classes: classes as u32,
            structs: structs as u32,
            instances: instances as u32,
            enums: enums as u32,
            symbols: symbols as u32,
            sorted_symbols: sorted_symbols as u32,
            plugin: plugin as u32,
            code: code as u32,
        })
    }
}
