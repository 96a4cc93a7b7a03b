use osprey_object::{BoundKind, Section, TemplateIdx, Variance};

use crate::error::BuildError;
use crate::templates::{BoundSpec, PlaceholderSpec, Templates};
use crate::types::{TypeGraph, TypePayload};

#[test]
fn placeholders_materialize_as_type_nodes() {
    let mut types = TypeGraph::new();
    let mut templates = Templates::new();

    let idx = templates
        .add(
            "List",
            &[PlaceholderSpec::new("T", Variance::Covariant)],
            &[],
            &mut types,
        )
        .unwrap();
    assert_eq!(idx, TemplateIdx(0));

    let template = templates.get(idx).unwrap();
    assert_eq!(template.placeholders.len(), 1);
    let ty = template.type_of("T").unwrap();
    let node = types.get(ty).unwrap();
    assert_eq!(
        node.payload,
        TypePayload::Placeholder {
            template: 0,
            ordinal: 0
        }
    );
}

#[test]
fn bounds_resolve_by_placeholder_name() {
    let mut types = TypeGraph::new();
    let mut templates = Templates::new();
    let number = types
        .add_concrete_type(None, Section::Class, 0, &[])
        .unwrap();

    let idx = templates
        .add(
            "Map",
            &[
                PlaceholderSpec::invariant("K"),
                PlaceholderSpec::invariant("V"),
            ],
            &[BoundSpec {
                placeholder: "K".to_owned(),
                kind: BoundKind::Extends,
                bound: number,
            }],
            &mut types,
        )
        .unwrap();

    let template = templates.get(idx).unwrap();
    assert_eq!(
        template.placeholders[0].bound,
        Some((BoundKind::Extends, number))
    );
    assert_eq!(template.placeholders[1].bound, None);
}

#[test]
fn duplicate_placeholder_name_rejected() {
    let mut types = TypeGraph::new();
    let mut templates = Templates::new();
    let err = templates
        .add(
            "Pair",
            &[
                PlaceholderSpec::invariant("T"),
                PlaceholderSpec::invariant("T"),
            ],
            &[],
            &mut types,
        )
        .unwrap_err();
    assert!(matches!(err, BuildError::DuplicatePlaceholder { .. }));
}

#[test]
fn bound_on_unknown_placeholder_rejected() {
    let mut types = TypeGraph::new();
    let mut templates = Templates::new();
    let err = templates
        .add(
            "Box",
            &[PlaceholderSpec::invariant("T")],
            &[BoundSpec {
                placeholder: "U".to_owned(),
                kind: BoundKind::Super,
                bound: types.no_return(),
            }],
            &mut types,
        )
        .unwrap_err();
    assert!(matches!(err, BuildError::UnknownPlaceholder { .. }));
}

#[test]
fn validate_checks_range() {
    let templates = Templates::new();
    let err = templates.validate(TemplateIdx(0)).unwrap_err();
    assert!(matches!(err, BuildError::UnknownTemplate(0)));
}
