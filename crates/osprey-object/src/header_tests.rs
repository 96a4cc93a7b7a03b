use super::constants::{HEADER_SIZE, SECTION_ALIGN};
use super::header::Header;

#[test]
fn header_default() {
    let h = Header::default();
    assert!(h.validate_magic());
    assert!(h.validate_version());
    assert_eq!(h.total_size, 0);
    assert_eq!(h.root_offset, HEADER_SIZE as u32);
}

#[test]
fn header_roundtrip() {
    let h = Header {
        checksum: 0x12345678,
        total_size: 4096,
        str_blob_size: 100,
        code_size: 256,
        str_table_count: 10,
        index_pool_count: 7,
        types_count: 5,
        templates_count: 1,
        placeholders_count: 2,
        existentials_count: 3,
        statics_count: 1,
        fields_count: 4,
        params_count: 6,
        calls_count: 8,
        impls_count: 2,
        actions_count: 3,
        concepts_count: 1,
        classes_count: 2,
        structs_count: 1,
        instances_count: 0,
        enums_count: 1,
        symbols_count: 20,
        plugin_count: 1,
        ..Default::default()
    };

    let bytes = h.to_bytes();
    assert_eq!(bytes.len(), HEADER_SIZE);

    let decoded = Header::from_bytes(&bytes);
    assert_eq!(decoded, h);
}

#[test]
fn offsets_are_aligned_and_ordered() {
    let h = Header {
        str_blob_size: 37,
        code_size: 10,
        str_table_count: 3,
        index_pool_count: 5,
        types_count: 4,
        templates_count: 1,
        placeholders_count: 2,
        existentials_count: 1,
        statics_count: 1,
        fields_count: 2,
        params_count: 3,
        calls_count: 2,
        impls_count: 1,
        actions_count: 1,
        concepts_count: 1,
        classes_count: 1,
        structs_count: 1,
        instances_count: 1,
        enums_count: 1,
        symbols_count: 9,
        plugin_count: 1,
        ..Default::default()
    };
    let o = h.compute_offsets().unwrap();

    let sequence = [
        o.str_blob,
        o.str_table,
        o.index_pool,
        o.types,
        o.templates,
        o.placeholders,
        o.existentials,
        o.statics,
        o.fields,
        o.params,
        o.calls,
        o.impls,
        o.actions,
        o.concepts,
        o.classes,
        o.structs,
        o.instances,
        o.enums,
        o.symbols,
        o.sorted_symbols,
        o.plugin,
        o.code,
    ];
    for pair in sequence.windows(2) {
        assert!(pair[0] < pair[1], "sections out of order: {pair:?}");
    }
    for offset in sequence {
        assert_eq!(offset as usize % SECTION_ALIGN, 0, "unaligned offset {offset}");
    }
}

#[test]
fn empty_object_offsets() {
    let o = Header::default().compute_offsets().unwrap();
    assert_eq!(o.str_blob, HEADER_SIZE as u32);
    // The empty string table still carries its sentinel entry.
    assert!(o.index_pool > o.str_table);
}

#[test]
fn inflated_counts_do_not_wrap() {
    // 0x2000_0000 type records alone would need ~12 GiB; the layout must
    // come back as None, never as a wrapped offset.
    let h = Header {
        types_count: 0x2000_0000,
        ..Default::default()
    };
    assert!(h.compute_offsets().is_none());

    let h = Header {
        symbols_count: u32::MAX,
        ..Default::default()
    };
    assert!(h.compute_offsets().is_none());
}
