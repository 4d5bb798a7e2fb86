use rell::{
    diagnostics::RuntimeError,
    heap::Param,
    runtime::{DispatchSignal, Frame, OrphanPolicy, Runtime},
    value::{Binding, Cell, CellFlags, Heart, TypeSet},
};

fn noop(_rt: &mut Runtime, _frame: &mut Frame) -> Result<DispatchSignal, RuntimeError> {
    Ok(DispatchSignal::Done(Cell::null()))
}

#[test]
fn specific_binding_survives_context_mutation() {
    let mut rt = Runtime::new();
    let x = rt.symbols.intern("x");
    let keylist = rt.make_paramlist(vec![Param::normal(x, TypeSet::ANY)]);
    let ctx = rt.make_context(keylist);

    let mut cell = Cell::word(x);
    rt.bind_specific(&mut cell, ctx).unwrap();

    rt.context_set_var(ctx, 1, Cell::integer(1));
    assert_eq!(rt.resolve(&cell, None).unwrap().as_integer(), Some(1));
    rt.context_set_var(ctx, 1, Cell::text("later"));
    assert_eq!(rt.resolve(&cell, None).unwrap().as_text(), Some("later"));
}

#[test]
fn synonyms_bind_to_the_same_slot() {
    let mut rt = Runtime::new();
    let amount = rt.symbols.intern("amount");
    let sum = rt.symbols.intern("sum");
    rt.symbols.register_synonym(sum, amount).unwrap();

    let keylist = rt.make_paramlist(vec![Param::normal(amount, TypeSet::ANY)]);
    let ctx = rt.make_context(keylist);
    rt.context_set_var(ctx, 1, Cell::integer(9));

    let mut via_synonym = Cell::word(sum);
    let index = rt.bind_specific(&mut via_synonym, ctx).unwrap();
    assert_eq!(index, 1);
    assert_eq!(rt.resolve(&via_synonym, None).unwrap().as_integer(), Some(9));
}

#[test]
fn relative_binding_reads_the_frame_not_a_context() {
    let mut rt = Runtime::new();
    let x = rt.symbols.intern("x");
    let y = rt.symbols.intern("y");
    let paramlist = rt.make_paramlist(vec![
        Param::normal(x, TypeSet::of(Heart::Integer)),
        Param::normal(y, TypeSet::of(Heart::Integer)),
    ]);
    let details = rt.make_action(paramlist, noop, 0);

    let mut cell = Cell::word(y);
    let index = rt.bind_relative(&mut cell, details).unwrap();
    assert_eq!(index, 2);
    assert_eq!(cell.as_word().unwrap().binding(), Binding::Relative(details));

    let action = rt.archetype(details);
    let frame = rt
        .make_frame(&action, vec![Cell::integer(1), Cell::integer(2)])
        .unwrap();
    assert_eq!(rt.resolve(&cell, Some(&frame)).unwrap().as_integer(), Some(2));

    // A second invocation has its own storage for the same binding.
    let frame = rt
        .make_frame(&action, vec![Cell::integer(1), Cell::integer(20)])
        .unwrap();
    assert_eq!(rt.resolve(&cell, Some(&frame)).unwrap().as_integer(), Some(20));
}

#[test]
fn relative_binding_works_through_descendant_frames() {
    let mut rt = Runtime::new();
    let x = rt.symbols.intern("x");
    let paramlist = rt.make_paramlist(vec![Param::normal(x, TypeSet::of(Heart::Integer))]);
    let base = rt.make_action(paramlist, noop, 0);
    let extra = rt.symbols.intern("extra");
    let augmented = rt
        .augment(base, vec![Param::normal(extra, TypeSet::ANY)])
        .unwrap();

    let mut cell = Cell::word(x);
    rt.bind_relative(&mut cell, base).unwrap();

    // The augmented action's frames carry the base's slots too.
    let action = rt.archetype(augmented);
    let frame = rt
        .make_frame(&action, vec![Cell::integer(6), Cell::null()])
        .unwrap();
    assert_eq!(rt.resolve(&cell, Some(&frame)).unwrap().as_integer(), Some(6));
}

#[test]
fn orphaned_relative_words_follow_the_policy() {
    let mut rt = Runtime::new();
    let x = rt.symbols.intern("x");
    let paramlist = rt.make_paramlist(vec![Param::normal(x, TypeSet::ANY)]);
    let details = rt.make_action(paramlist, noop, 0);

    let mut cell = Cell::word(x);
    rt.bind_relative(&mut cell, details).unwrap();

    // No frame at all.
    let err = rt.resolve(&cell, None).unwrap_err();
    assert!(matches!(err, RuntimeError::OrphanRelative { .. }));

    // A frame for an unrelated action is no better.
    let other = rt.symbols.intern("other");
    let foreign_paramlist = rt.make_paramlist(vec![Param::normal(other, TypeSet::ANY)]);
    let foreign = rt.make_action(foreign_paramlist, noop, 0);
    let foreign_action = rt.archetype(foreign);
    let frame = rt.make_frame(&foreign_action, vec![Cell::null()]).unwrap();
    let err = rt.resolve(&cell, Some(&frame)).unwrap_err();
    assert!(matches!(err, RuntimeError::OrphanRelative { .. }));

    // With a fallback context configured, the lookup retries there.
    let ctx = rt.make_context(paramlist);
    rt.context_set_var(ctx, 1, Cell::integer(0));
    rt.set_orphan_policy(OrphanPolicy::Fallback(ctx));
    assert_eq!(rt.resolve(&cell, None).unwrap().as_integer(), Some(0));
}

#[test]
fn mondex_wraps_at_its_modulus_and_marks_the_occurrence() {
    let mut rt = Runtime::new();
    let w = rt.symbols.intern("w");
    let mut cell = Cell::word(w);

    rt.set_mondex(&mut cell, 4_095 + 7).unwrap();
    assert_eq!(cell.as_word().unwrap().mondex(), 7);
    assert!(cell.flags().contains(CellFlags::VIRTUAL_BIND));
}

#[test]
fn quoted_occurrences_of_a_bound_word_keep_their_binding() {
    let mut rt = Runtime::new();
    let x = rt.symbols.intern("x");
    let keylist = rt.make_paramlist(vec![Param::normal(x, TypeSet::ANY)]);
    let ctx = rt.make_context(keylist);
    rt.context_set_var(ctx, 1, Cell::integer(3));

    let mut cell = Cell::word(x);
    rt.bind_specific(&mut cell, ctx).unwrap();
    cell.quote(2).unwrap();

    // Quoting suppresses evaluation elsewhere; the binding itself is
    // still intact and resolvable.
    assert_eq!(cell.quote_level(), 2);
    assert_eq!(rt.resolve(&cell, None).unwrap().as_integer(), Some(3));
}
