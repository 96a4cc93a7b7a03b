use osprey_object::{
    Locator, Opcode, Section, TrapTable, call_flags, decl_flags,
};

use crate::builder::{ObjectBuilder, Signature};
use crate::code::{CodeBody, CodeWriter};
use crate::error::BuildError;
use crate::params::ParamSpec;
use crate::templates::PlaceholderSpec;

fn return_body(num_args: u16) -> CodeBody {
    let traps = TrapTable::new();
    let mut w = CodeWriter::new(&traps, num_args);
    w.write_opcode(Opcode::Return);
    w.finish().unwrap()
}

#[test]
fn decl_indices_are_per_section() {
    let mut b = ObjectBuilder::new();
    let (c0, _) = b.add_class("app.A", None, None, 0).unwrap();
    let (s0, _) = b.add_struct("app.B", None, None, 0).unwrap();
    let (c1, _) = b.add_class("app.C", None, None, 0).unwrap();
    assert_eq!(c0.get(), 0);
    assert_eq!(s0.get(), 0);
    assert_eq!(c1.get(), 1);

    assert_eq!(b.symbols().lookup("app.C"), Some(Locator::new(Section::Class, 1)));
}

#[test]
fn duplicate_decl_path_rejected() {
    let mut b = ObjectBuilder::new();
    b.add_class("app.A", None, None, 0).unwrap();
    let err = b.add_enum("app.A", None, None, 0).unwrap_err();
    assert!(matches!(err, BuildError::DuplicateSymbol(path) if path == "app.A"));
}

#[test]
fn templated_decl_type_carries_placeholder_params() {
    let mut b = ObjectBuilder::new();
    let t = b
        .add_template("app.List", &[PlaceholderSpec::invariant("T")], &[])
        .unwrap();
    let (_, ty) = b.add_class("app.List.Impl", None, Some(t), 0).unwrap();

    let node = b.types().get(ty).unwrap();
    assert_eq!(node.params.len(), 1);
    let placeholder = b.templates().get(t).unwrap().type_of("T").unwrap();
    assert_eq!(node.params[0], placeholder);
}

#[test]
fn field_path_is_owner_dot_name() {
    let mut b = ObjectBuilder::new();
    let (_, ty) = b.add_class("app.Point", None, None, 0).unwrap();
    let f = b.add_field("app.Point", "x", ty, 0).unwrap();

    assert_eq!(
        b.symbols().lookup("app.Point.x"),
        Some(Locator::new(Section::Field, f.get()))
    );
    let decl = b.decl(Locator::new(Section::Class, 0)).unwrap();
    assert_eq!(decl.members, vec![f]);
}

#[test]
fn field_on_concept_rejected() {
    let mut b = ObjectBuilder::new();
    let (_, ty) = b.add_concept("app.Ordered", None, None, 0).unwrap();
    let err = b.add_field("app.Ordered", "x", ty, 0).unwrap_err();
    assert!(matches!(err, BuildError::InvalidReceiver { .. }));
}

#[test]
fn field_on_unknown_receiver_rejected() {
    let mut b = ObjectBuilder::new();
    let no_return = b.no_return();
    let err = b.add_field("app.Missing", "x", no_return, 0).unwrap_err();
    assert!(matches!(err, BuildError::UnknownReceiver(_)));
}

#[test]
fn free_function_is_unbound() {
    let mut b = ObjectBuilder::new();
    let (_, int) = b.add_struct("core.Int", None, None, 0).unwrap();
    let f = b
        .add_function(
            "app.main",
            Signature::returning(int).with_params(vec![ParamSpec::list("argc", int)]),
            return_body(1),
            call_flags::GLOBAL,
        )
        .unwrap();

    let call = b.call(f).unwrap();
    assert_eq!(call.flags & call_flags::BOUND, 0);
    assert_eq!(call.flags & call_flags::GLOBAL, call_flags::GLOBAL);
    assert_eq!(call.receiver, None);
    assert_eq!(call.params.len(), 1);
}

#[test]
fn no_return_flag_is_derived() {
    let mut b = ObjectBuilder::new();
    let no_return = b.no_return();
    let f = b
        .add_function("app.abort", Signature::returning(no_return), return_body(0), 0)
        .unwrap();
    let call = b.call(f).unwrap();
    assert_eq!(call.flags & call_flags::NO_RETURN, call_flags::NO_RETURN);
}

#[test]
fn ctor_returns_own_type_and_is_unique() {
    let mut b = ObjectBuilder::new();
    let (class, ty) = b.add_class("app.Foo", None, None, 0).unwrap();
    let ctor = b.add_ctor("app.Foo", None, vec![], return_body(0), 0).unwrap();

    let call = b.call(ctor).unwrap();
    assert_eq!(call.path, "app.Foo.$ctor");
    assert_eq!(call.return_type, ty);
    assert_eq!(
        call.flags & (call_flags::CTOR | call_flags::BOUND),
        call_flags::CTOR | call_flags::BOUND
    );

    let decl = b.decl(Locator::new(Section::Class, class.get())).unwrap();
    assert_eq!(decl.ctor, Some(ctor));
    assert!(decl.methods.contains(&ctor));

    let err = b
        .add_ctor("app.Foo", None, vec![], return_body(0), 0)
        .unwrap_err();
    assert!(matches!(err, BuildError::DuplicateCtor(_)));
}

#[test]
fn method_binds_to_receiver() {
    let mut b = ObjectBuilder::new();
    let (_, int) = b.add_struct("core.Int", None, None, 0).unwrap();
    b.add_class("app.Foo", None, None, 0).unwrap();
    let m = b
        .add_method(
            "app.Foo",
            "bar",
            Signature::returning(int).with_params(vec![ParamSpec::list("x", int)]),
            return_body(1),
            0,
        )
        .unwrap();

    let call = b.call(m).unwrap();
    assert_eq!(call.path, "app.Foo.bar");
    assert_eq!(call.receiver, Some(Locator::new(Section::Class, 0)));
    assert_eq!(call.flags & call_flags::BOUND, call_flags::BOUND);
}

#[test]
fn method_on_concept_rejected() {
    let mut b = ObjectBuilder::new();
    let (_, int) = b.add_struct("core.Int", None, None, 0).unwrap();
    b.add_concept("app.Ordered", None, None, 0).unwrap();
    let err = b
        .add_method("app.Ordered", "cmp", Signature::returning(int), return_body(0), 0)
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidReceiver { .. }));
}

#[test]
fn concept_actions_and_impl_extensions() {
    let mut b = ObjectBuilder::new();
    let (_, int) = b.add_struct("core.Int", None, None, 0).unwrap();
    let (concept, concept_ty) = b.add_concept("app.Ordered", None, None, 0).unwrap();
    let action = b
        .add_concept_action(
            "app.Ordered",
            "cmp",
            Signature::returning(int).with_params(vec![ParamSpec::list("other", int)]),
        )
        .unwrap();

    b.add_class("app.Foo", None, None, 0).unwrap();
    let imp = b.add_impl("app.Foo", concept_ty, concept).unwrap();
    let call = b
        .add_impl_extension(
            imp,
            "cmp",
            Signature::returning(int).with_params(vec![ParamSpec::list("other", int)]),
            return_body(1),
            0,
        )
        .unwrap();

    let desc = b.impl_desc(imp).unwrap();
    assert_eq!(desc.extensions, vec![(action, call)]);

    let call_desc = b.call(call).unwrap();
    assert_eq!(call_desc.path, "app.Foo.Ordered.cmp");
    assert_eq!(call_desc.receiver, Some(Locator::new(Section::Class, 0)));

    let decl = b.decl(Locator::new(Section::Class, 0)).unwrap();
    assert_eq!(decl.impls, vec![imp]);
}

#[test]
fn impl_extension_for_unknown_action_rejected() {
    let mut b = ObjectBuilder::new();
    let (_, int) = b.add_struct("core.Int", None, None, 0).unwrap();
    let (concept, concept_ty) = b.add_concept("app.Ordered", None, None, 0).unwrap();
    b.add_class("app.Foo", None, None, 0).unwrap();
    let imp = b.add_impl("app.Foo", concept_ty, concept).unwrap();

    let err = b
        .add_impl_extension(imp, "missing", Signature::returning(int), return_body(0), 0)
        .unwrap_err();
    assert!(matches!(err, BuildError::UnknownAction { .. }));
}

#[test]
fn sealed_hierarchy_checks() {
    let mut b = ObjectBuilder::new();
    let (_, base_ty) = b
        .add_class("app.Shape", None, None, decl_flags::SEALED)
        .unwrap();
    let (_, circle_ty) = b
        .add_class("app.Circle", Some(base_ty), None, decl_flags::FINAL)
        .unwrap();
    b.add_class("app.Open", Some(base_ty), None, 0).unwrap();
    b.add_class("app.Stray", None, None, decl_flags::FINAL).unwrap();

    b.add_sealed_subtype("app.Shape", "app.Circle").unwrap();
    let decl = b.decl(Locator::new(Section::Class, 0)).unwrap();
    assert_eq!(decl.sealed, vec![circle_ty]);

    let err = b.add_sealed_subtype("app.Shape", "app.Open").unwrap_err();
    assert!(matches!(err, BuildError::SealedSubtypeNotFinal(_)));

    let err = b.add_sealed_subtype("app.Shape", "app.Stray").unwrap_err();
    assert!(matches!(err, BuildError::SealedSuperMismatch { .. }));

    let err = b.add_sealed_subtype("app.Circle", "app.Circle").unwrap_err();
    assert!(matches!(err, BuildError::SealedReceiverNotSealed(_)));
}

#[test]
fn statics_are_standalone_symbols() {
    let mut b = ObjectBuilder::new();
    let (_, int) = b.add_struct("core.Int", None, None, 0).unwrap();
    let s = b.add_static("app.counter", int, decl_flags::GLOBAL).unwrap();
    assert_eq!(
        b.symbols().lookup("app.counter"),
        Some(Locator::new(Section::Static, s.get()))
    );
}

#[test]
fn template_path_is_a_symbol() {
    let mut b = ObjectBuilder::new();
    b.add_template("app.Box", &[PlaceholderSpec::invariant("T")], &[])
        .unwrap();
    let err = b.add_class("app.Box", None, None, 0).unwrap_err();
    assert!(matches!(err, BuildError::DuplicateSymbol(_)));
}
