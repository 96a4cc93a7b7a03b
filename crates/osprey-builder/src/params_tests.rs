use osprey_object::{ParamKind, TypeIdx};

use crate::error::BuildError;
use crate::params::{ParamSpec, process_params};

fn ty() -> TypeIdx {
    TypeIdx(0)
}

#[test]
fn empty_list_is_fine() {
    let processed = process_params(&[]).unwrap();
    assert!(processed.params.is_empty());
    assert_eq!(processed.num_args, 0);
}

#[test]
fn canonical_order_accepted() {
    let processed = process_params(&[
        ParamSpec::list("a", ty()),
        ParamSpec::list_optional("b", ty()),
        ParamSpec::named("c", ty()),
        ParamSpec::named_optional("d", ty()),
        ParamSpec::context("ctx", ty()),
        ParamSpec::rest(ty()),
    ])
    .unwrap();
    assert_eq!(processed.num_args, 6);
    assert_eq!(processed.params[5].kind, ParamKind::Rest);
    assert_eq!(processed.params[5].name, None);
}

#[test]
fn positional_after_named_rejected() {
    let err = process_params(&[ParamSpec::named("a", ty()), ParamSpec::list("b", ty())])
        .unwrap_err();
    assert!(matches!(err, BuildError::PositionalAfterNamed(name) if name == "b"));
}

#[test]
fn positional_after_context_rejected() {
    let err = process_params(&[ParamSpec::context("ctx", ty()), ParamSpec::list("b", ty())])
        .unwrap_err();
    assert!(matches!(err, BuildError::PositionalAfterNamed(_)));
}

#[test]
fn required_after_optional_rejected() {
    let err = process_params(&[
        ParamSpec::list_optional("a", ty()),
        ParamSpec::list("b", ty()),
    ])
    .unwrap_err();
    assert!(matches!(err, BuildError::RequiredAfterOptional(name) if name == "b"));
}

#[test]
fn optional_named_after_optional_positional_accepted() {
    // The required-after-optional rule binds the positional group only.
    process_params(&[
        ParamSpec::list_optional("a", ty()),
        ParamSpec::named("b", ty()),
    ])
    .unwrap();
}

#[test]
fn rest_must_be_last() {
    let err = process_params(&[ParamSpec::rest(ty()), ParamSpec::named("a", ty())]).unwrap_err();
    assert!(matches!(err, BuildError::RestNotLast));
}

#[test]
fn second_rest_rejected() {
    let err = process_params(&[ParamSpec::rest(ty()), ParamSpec::rest(ty())]).unwrap_err();
    assert!(matches!(err, BuildError::RestNotLast));
}

#[test]
fn named_rest_rejected() {
    let spec = ParamSpec {
        name: Some("extra".to_owned()),
        ty: ty(),
        kind: ParamKind::Rest,
    };
    let err = process_params(&[spec]).unwrap_err();
    assert!(matches!(err, BuildError::RestNamed));
}

#[test]
fn nameless_named_rejected() {
    let spec = ParamSpec {
        name: None,
        ty: ty(),
        kind: ParamKind::Named,
    };
    let err = process_params(&[spec]).unwrap_err();
    assert!(matches!(err, BuildError::MissingParamName));
}

#[test]
fn duplicate_name_rejected_across_groups() {
    let err = process_params(&[ParamSpec::list("x", ty()), ParamSpec::named("x", ty())])
        .unwrap_err();
    assert!(matches!(err, BuildError::DuplicateParam(name) if name == "x"));
}
