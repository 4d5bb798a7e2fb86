use rell::{
    diagnostics::RuntimeError,
    heap::Param,
    runtime::{DispatchOutcome, DispatchSignal, Frame, Runtime},
    value::{Cell, Heart, Partner, TypeSet},
};

fn sum(_rt: &mut Runtime, frame: &mut Frame) -> Result<DispatchSignal, RuntimeError> {
    let x = frame.arg(1).as_integer().unwrap();
    let y = frame.arg(2).as_integer().unwrap();
    Ok(DispatchSignal::Done(Cell::integer(x + y)))
}

fn product(_rt: &mut Runtime, frame: &mut Frame) -> Result<DispatchSignal, RuntimeError> {
    let x = frame.arg(1).as_integer().unwrap();
    let y = frame.arg(2).as_integer().unwrap();
    Ok(DispatchSignal::Done(Cell::integer(x * y)))
}

fn binary_integer_action(rt: &mut Runtime) -> rell::heap::NodeId {
    let x = rt.symbols.intern("x");
    let y = rt.symbols.intern("y");
    let paramlist = rt.make_paramlist(vec![
        Param::normal(x, TypeSet::of(Heart::Integer)),
        Param::normal(y, TypeSet::of(Heart::Integer)),
    ]);
    rt.make_action(paramlist, sum, 0)
}

#[test]
fn the_archetype_names_its_own_details() {
    let mut rt = Runtime::new();
    let details = binary_integer_action(&mut rt);
    let archetype = rt.archetype(details);
    let payload = archetype.as_action().unwrap();
    assert_eq!(payload.details(), details);
    assert_eq!(payload.partner(), Partner::Archetype(details));
}

#[test]
fn labeled_copies_share_identity_with_the_archetype() {
    let mut rt = Runtime::new();
    let details = binary_integer_action(&mut rt);
    let add = rt.symbols.intern("add");
    let plus = rt.symbols.intern("plus");

    let as_add = rt.derive_label(&rt.archetype(details), add).unwrap();
    let as_plus = rt.derive_label(&rt.archetype(details), plus).unwrap();
    assert_eq!(as_add.as_action().unwrap().details(), details);
    assert_eq!(as_plus.as_action().unwrap().details(), details);
    assert_eq!(as_add.as_action().unwrap().partner(), Partner::Label(add));

    // The label changes diagnostics, not behavior.
    let err = rt.invoke(&as_add, vec![]).unwrap_err();
    assert!(err.to_string().contains("`add`"));
    let err = rt.invoke(&as_plus, vec![]).unwrap_err();
    assert!(err.to_string().contains("`plus`"));
}

#[test]
fn specialization_matches_the_base_with_arguments_prefilled() {
    let mut rt = Runtime::new();
    let details = binary_integer_action(&mut rt);
    let x = rt.symbols.intern("x");
    let y = rt.symbols.intern("y");

    let base = rt.archetype(details);
    let both = rt
        .specialize(details, &[(x, Cell::integer(5)), (y, Cell::integer(10))])
        .unwrap();
    let partial = rt.specialize(details, &[(y, Cell::integer(10))]).unwrap();

    let direct = rt
        .invoke(&base, vec![Cell::integer(5), Cell::integer(10)])
        .unwrap();
    let via_both = rt.invoke(&rt.archetype(both), vec![]).unwrap();
    let via_partial = rt
        .invoke(&rt.archetype(partial), vec![Cell::integer(5)])
        .unwrap();

    assert_eq!(direct, DispatchOutcome::Value(Cell::integer(15)));
    assert_eq!(via_both, direct);
    assert_eq!(via_partial, direct);
}

#[test]
fn specializing_an_unknown_parameter_fails() {
    let mut rt = Runtime::new();
    let details = binary_integer_action(&mut rt);
    let z = rt.symbols.intern("z");
    let err = rt.specialize(details, &[(z, Cell::integer(1))]).unwrap_err();
    assert!(matches!(err, RuntimeError::BindingFailure { .. }));
}

#[test]
fn specializations_chain_through_their_base() {
    let mut rt = Runtime::new();
    let details = binary_integer_action(&mut rt);
    let x = rt.symbols.intern("x");
    let special = rt.specialize(details, &[(x, Cell::integer(1))]).unwrap();

    assert!(rt.is_ancestor(details, special));
    assert!(!rt.is_ancestor(special, details));
}

#[test]
fn hijack_redirects_existing_references() {
    let mut rt = Runtime::new();
    let victim = binary_integer_action(&mut rt);
    let action = rt.archetype(victim);

    // References taken before the hijack.
    let before = rt
        .invoke(&action, vec![Cell::integer(3), Cell::integer(4)])
        .unwrap();
    assert_eq!(before, DispatchOutcome::Value(Cell::integer(7)));

    let paramlist = rt.paramlist_of(victim);
    let replacement = rt.make_action(paramlist, product, 0);
    rt.hijack(victim, replacement).unwrap();

    let after = rt
        .invoke(&action, vec![Cell::integer(3), Cell::integer(4)])
        .unwrap();
    assert_eq!(after, DispatchOutcome::Value(Cell::integer(12)));
}

#[test]
fn hijack_rejects_foreign_shapes() {
    let mut rt = Runtime::new();
    let victim = binary_integer_action(&mut rt);
    let other = rt.symbols.intern("other");
    let foreign_paramlist = rt.make_paramlist(vec![Param::normal(other, TypeSet::ANY)]);
    let foreign = rt.make_action(foreign_paramlist, sum, 0);

    assert!(rt.hijack(victim, foreign).is_err());
}

#[test]
fn unreferenced_specializations_are_collectable_while_the_base_survives() {
    let mut rt = Runtime::new();
    let x = rt.symbols.intern("x");
    let y = rt.symbols.intern("y");
    let details = rt.register_native(
        "add",
        vec![
            Param::normal(x, TypeSet::of(Heart::Integer)),
            Param::normal(y, TypeSet::of(Heart::Integer)),
        ],
        sum,
    );
    let special = rt.specialize(details, &[(x, Cell::integer(1))]).unwrap();

    // The specialization is reachable only if the caller keeps it.
    let freed = rt.collect(&[special], &[]);
    assert_eq!(freed, 0);
    assert!(rt.arena.contains(special));

    let freed = rt.collect(&[], &[]);
    assert!(freed >= 2, "specialization and exemplar should both go");
    assert!(!rt.arena.contains(special));
    assert!(rt.arena.contains(details));
}
