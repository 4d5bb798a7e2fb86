//! Host-provided callables, registered by name.

use std::collections::HashMap;

use crate::{
    heap::{NodeId, Param},
    runtime::{Dispatcher, Runtime},
    symbols::SymbolId,
    value::Cell,
};

/// Name-to-details table of the host's callables. These are collection
/// roots: a registered native and everything it references stay live
/// for the runtime's lifetime.
pub(crate) struct NativeRegistry {
    by_name: HashMap<SymbolId, NodeId>,
}

impl NativeRegistry {
    pub(crate) fn new() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    pub(crate) fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.by_name.values().copied()
    }
}

impl Runtime {
    /// Builds an action around a host dispatcher and registers it under
    /// `name`. Re-registering a name replaces the old entry.
    pub fn register_native(
        &mut self,
        name: &str,
        params: Vec<Param>,
        dispatcher: Dispatcher,
    ) -> NodeId {
        let symbol = self.symbols.intern(name);
        let canonical = self.symbols.canonical(symbol);
        let paramlist = self.make_paramlist(params);
        let details = self.make_action(paramlist, dispatcher, 0);
        self.natives.by_name.insert(canonical, details);
        details
    }

    /// The labeled action cell of a registered native.
    pub fn lookup_native(&self, name: SymbolId) -> Option<Cell> {
        let canonical = self.symbols.canonical(name);
        let details = *self.natives.by_name.get(&canonical)?;
        let archetype = self.archetype(details);
        self.derive_label(&archetype, canonical).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::RuntimeError,
        runtime::{DispatchOutcome, DispatchSignal, Frame},
        value::{Heart, TypeSet},
    };

    fn successor(
        _rt: &mut Runtime,
        frame: &mut Frame,
    ) -> Result<DispatchSignal, RuntimeError> {
        let n = frame.arg(1).as_integer().unwrap();
        Ok(DispatchSignal::Done(Cell::integer(n + 1)))
    }

    #[test]
    fn registered_natives_are_invocable_by_name() {
        let mut rt = Runtime::new();
        let n = rt.symbols.intern("n");
        rt.register_native(
            "succ",
            vec![Param::normal(n, TypeSet::of(Heart::Integer))],
            successor,
        );

        let name = rt.symbols.intern("succ");
        let action = rt.lookup_native(name).unwrap();
        let out = rt.invoke(&action, vec![Cell::integer(41)]).unwrap();
        assert_eq!(out, DispatchOutcome::Value(Cell::integer(42)));
    }

    #[test]
    fn natives_resolve_through_synonyms() {
        let mut rt = Runtime::new();
        let n = rt.symbols.intern("n");
        rt.register_native(
            "succ",
            vec![Param::normal(n, TypeSet::of(Heart::Integer))],
            successor,
        );
        let succ = rt.symbols.intern("succ");
        let next = rt.symbols.intern("next");
        rt.symbols.register_synonym(next, succ).unwrap();

        assert!(rt.lookup_native(next).is_some());
    }

    #[test]
    fn natives_survive_collection() {
        let mut rt = Runtime::new();
        let n = rt.symbols.intern("n");
        let details = rt.register_native(
            "succ",
            vec![Param::normal(n, TypeSet::of(Heart::Integer))],
            successor,
        );
        let garbage = rt.make_context(rt.paramlist_of(details));

        let freed = rt.collect(&[], &[]);
        assert!(freed >= 1);
        assert!(!rt.arena.contains(garbage));
        assert!(rt.arena.contains(details));
        assert!(rt.dangling_bindings().is_empty());
    }
}
