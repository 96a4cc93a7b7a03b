use super::constants::INVALID_INDEX;
use super::records::*;

#[test]
fn type_record_roundtrip() {
    let r = TypeRecord {
        kind: TypeKind::Concrete as u8,
        tag: 0,
        section: 9,
        _pad: 0,
        super_type: INVALID_INDEX,
        data0: 3,
        data1: 0,
        params: PoolRange { start: 4, count: 2 },
    };
    let decoded = TypeRecord::from_bytes(&r.to_bytes());
    assert_eq!(decoded, r);
    assert_eq!(r.to_bytes().len(), TYPE_RECORD_SIZE);
}

#[test]
fn decl_record_roundtrip() {
    let r = DeclRecord {
        path: 1,
        own_type: 2,
        super_type: INVALID_INDEX,
        template: INVALID_INDEX,
        flags: decl_flags::SEALED | decl_flags::GLOBAL,
        members: PoolRange { start: 0, count: 3 },
        methods: PoolRange { start: 3, count: 2 },
        impls: PoolRange::EMPTY,
        sealed: PoolRange { start: 5, count: 1 },
    };
    let bytes = r.to_bytes();
    assert_eq!(bytes.len(), DECL_RECORD_SIZE);
    assert_eq!(DeclRecord::from_bytes(&bytes), r);
}

#[test]
fn call_record_roundtrip() {
    let r = CallRecord {
        path: 7,
        template: INVALID_INDEX,
        receiver_section: 9,
        receiver_index: 0,
        flags: call_flags::BOUND | call_flags::CTOR,
        return_type: 2,
        params: PoolRange::EMPTY,
        code_offset: 64,
    };
    let bytes = r.to_bytes();
    assert_eq!(bytes.len(), CALL_RECORD_SIZE);
    assert_eq!(CallRecord::from_bytes(&bytes), r);
}

#[test]
fn misc_record_roundtrips() {
    let t = TemplateRecord {
        path: 9,
        placeholders: PoolRange { start: 1, count: 2 },
    };
    assert_eq!(TemplateRecord::from_bytes(&t.to_bytes()), t);

    let p = PlaceholderRecord {
        name: 3,
        ty: 11,
        variance: Variance::Covariant as u8,
        bound_kind: BoundKind::Extends as u8,
        bound_type: 4,
    };
    assert_eq!(PlaceholderRecord::from_bytes(&p.to_bytes()), p);

    let f = FieldRecord {
        path: 2,
        ty: 5,
        flags: 0,
    };
    assert_eq!(FieldRecord::from_bytes(&f.to_bytes()), f);

    let param = ParamRecord {
        name: INVALID_INDEX,
        ty: 1,
        kind: ParamKind::Rest as u8,
    };
    assert_eq!(ParamRecord::from_bytes(&param.to_bytes()), param);

    let a = ActionRecord {
        path: 1,
        template: INVALID_INDEX,
        concept: 0,
        return_type: 3,
        params: PoolRange { start: 2, count: 1 },
    };
    assert_eq!(ActionRecord::from_bytes(&a.to_bytes()), a);

    let i = ImplRecord {
        concept: 0,
        receiver_section: 9,
        receiver_index: 1,
        impl_type: 6,
        extensions: PoolRange { start: 8, count: 4 },
    };
    assert_eq!(ImplRecord::from_bytes(&i.to_bytes()), i);

    let s = SymbolRecord {
        path: 4,
        section: 5,
        index: 12,
    };
    assert_eq!(SymbolRecord::from_bytes(&s.to_bytes()), s);

    let plugin = PluginRecord { location: 3 };
    assert_eq!(PluginRecord::from_bytes(&plugin.to_bytes()), plugin);
}

#[test]
fn procedure_header_roundtrip() {
    let h = ProcedureHeader {
        size: 24,
        num_args: 2,
        num_locals: 1,
        num_lexicals: 0,
    };
    let bytes = h.to_bytes();
    assert_eq!(bytes.len(), crate::constants::PROC_HEADER_SIZE);
    assert_eq!(ProcedureHeader::from_bytes(&bytes), h);
}

#[test]
fn pool_range_indexing() {
    let r = PoolRange { start: 3, count: 2 };
    assert_eq!(r.range(), 3..5);
    assert!(PoolRange::EMPTY.is_empty());
}

#[test]
fn param_kind_groups() {
    assert!(ParamKind::List.is_positional());
    assert!(ParamKind::ListOptional.is_positional());
    assert!(!ParamKind::Named.is_positional());
    assert!(ParamKind::NamedOptional.is_optional());
    assert!(!ParamKind::Rest.is_optional());
}

#[test]
fn opt_index_maps_sentinel() {
    assert_eq!(opt_index(INVALID_INDEX), None);
    assert_eq!(opt_index(0), Some(0));
}
