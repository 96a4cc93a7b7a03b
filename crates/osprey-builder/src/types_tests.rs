use osprey_object::{Section, SpecialTag, TypeIdx};

use crate::error::BuildError;
use crate::types::{TypeGraph, TypePayload};

#[test]
fn sentinel_is_index_zero() {
    let graph = TypeGraph::new();
    assert_eq!(graph.no_return(), TypeIdx(0));
    assert_eq!(graph.len(), 1);
    let node = graph.get(TypeIdx(0)).unwrap();
    assert_eq!(node.payload, TypePayload::Special(SpecialTag::NoReturn));
}

#[test]
fn concrete_types_get_monotonic_indices() {
    let mut graph = TypeGraph::new();
    let a = graph
        .add_concrete_type(None, Section::Class, 0, &[])
        .unwrap();
    let b = graph
        .add_concrete_type(Some(a), Section::Class, 1, &[])
        .unwrap();
    assert_eq!(a, TypeIdx(1));
    assert_eq!(b, TypeIdx(2));
    assert_eq!(graph.get(b).unwrap().super_type, Some(a));
}

#[test]
fn super_type_must_exist() {
    let mut graph = TypeGraph::new();
    let err = graph
        .add_concrete_type(Some(TypeIdx(7)), Section::Class, 0, &[])
        .unwrap_err();
    assert!(matches!(err, BuildError::UnknownType(7)));
}

#[test]
fn type_params_must_exist() {
    let mut graph = TypeGraph::new();
    let err = graph
        .add_concrete_type(None, Section::Class, 0, &[TypeIdx(3)])
        .unwrap_err();
    assert!(matches!(err, BuildError::UnknownType(3)));
}

#[test]
fn union_members_must_exist() {
    let mut graph = TypeGraph::new();
    let a = graph
        .add_concrete_type(None, Section::Struct, 0, &[])
        .unwrap();
    let union = graph.add_union_type(&[a, graph.no_return()]).unwrap();
    let node = graph.get(union).unwrap();
    assert_eq!(node.payload, TypePayload::Union);
    assert_eq!(node.params, vec![a, TypeIdx(0)]);

    let err = graph.add_union_type(&[TypeIdx(99)]).unwrap_err();
    assert!(matches!(err, BuildError::UnknownType(99)));
}

#[test]
fn references_always_point_backwards() {
    let mut graph = TypeGraph::new();
    let mut prev = None;
    for i in 0..10 {
        let idx = graph
            .add_concrete_type(prev, Section::Class, i, &[])
            .unwrap();
        if let Some(p) = prev {
            assert!(p.get() < idx.get());
        }
        prev = Some(idx);
    }
    for (idx, node) in graph.iter() {
        if let Some(s) = node.super_type {
            assert!(s.get() < idx.get());
        }
    }
}
