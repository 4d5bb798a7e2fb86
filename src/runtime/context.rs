use crate::{
    heap::{ContextNode, Node, NodeId, Param, ParamlistNode},
    runtime::Runtime,
    symbols::SymbolId,
    value::Cell,
};

impl Runtime {
    /// Allocates a paramlist over the given parameter descriptors.
    ///
    /// The new paramlist is a chain root: its ancestor link points at
    /// itself. Its archetype slot stays empty until a details array
    /// adopts the shape.
    pub fn make_paramlist(&mut self, params: Vec<Param>) -> NodeId {
        let id = self.arena.alloc(Node::Paramlist(ParamlistNode {
            archetype: Cell::null(),
            params,
            // Patched to the real id below; a root terminates its own chain.
            ancestor: NodeId(0),
        }));
        match self.arena.get_mut(id) {
            Node::Paramlist(paramlist) => paramlist.ancestor = id,
            _ => unreachable!(),
        }
        id
    }

    /// Allocates a paramlist derived from `ancestor` with the combined
    /// descriptors.
    pub(crate) fn make_derived_paramlist(
        &mut self,
        params: Vec<Param>,
        ancestor: NodeId,
    ) -> NodeId {
        debug_assert!(params.len() >= self.arena.paramlist(ancestor).params().len());
        self.arena.alloc(Node::Paramlist(ParamlistNode {
            archetype: Cell::null(),
            params,
            ancestor,
        }))
    }

    /// Instantiates a context over `keylist`, one unset variable per key.
    pub fn make_context(&mut self, keylist: NodeId) -> NodeId {
        let slots = self.arena.paramlist(keylist).params().len();
        self.arena.alloc(Node::Context(ContextNode {
            keylist,
            vars: vec![Cell::null(); slots],
            meta: None,
        }))
    }

    /// Finds the 1-based slot of `symbol` in a context's keylist.
    ///
    /// Spellings linked as synonyms find the same slot: comparison is by
    /// canonical symbol identity.
    pub fn context_find(&self, context: NodeId, symbol: SymbolId) -> Option<usize> {
        let keylist = self.arena.context(context).keylist();
        self.paramlist_find(keylist, symbol)
    }

    pub(crate) fn paramlist_find(&self, paramlist: NodeId, symbol: SymbolId) -> Option<usize> {
        self.arena
            .paramlist(paramlist)
            .find(|sym| self.symbols.canonical(sym), symbol)
    }

    /// Reads the variable at 1-based slot `index`.
    pub fn context_var(&self, context: NodeId, index: usize) -> &Cell {
        self.arena.context(context).var(index)
    }

    /// Overwrites the variable at 1-based slot `index`.
    pub fn context_set_var(&mut self, context: NodeId, index: usize, value: Cell) {
        *self.arena.context_mut(context).var_mut(index) = value;
    }

    /// Attaches or detaches a context's meta node. Meta edges are owned
    /// and traced by the collector.
    pub fn set_context_meta(&mut self, context: NodeId, meta: Option<NodeId>) {
        debug_assert!(meta.is_none_or(|id| self.arena.contains(id)));
        self.arena.context_mut(context).meta = meta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeSet;

    #[test]
    fn context_slots_match_keylist() {
        let mut rt = Runtime::new();
        let x = rt.symbols.intern("x");
        let y = rt.symbols.intern("y");
        let keylist = rt.make_paramlist(vec![
            Param::normal(x, TypeSet::ANY),
            Param::normal(y, TypeSet::ANY),
        ]);
        let ctx = rt.make_context(keylist);

        assert_eq!(rt.context_find(ctx, x), Some(1));
        assert_eq!(rt.context_find(ctx, y), Some(2));

        rt.context_set_var(ctx, 2, Cell::integer(9));
        assert_eq!(rt.context_var(ctx, 2).as_integer(), Some(9));
        assert_eq!(rt.context_var(ctx, 1).as_integer(), None);
    }

    #[test]
    fn synonyms_find_the_same_slot() {
        let mut rt = Runtime::new();
        let lower = rt.symbols.intern("size");
        let upper = rt.symbols.intern("SIZE");
        rt.symbols.register_synonym(upper, lower).unwrap();

        let keylist = rt.make_paramlist(vec![Param::normal(lower, TypeSet::ANY)]);
        let ctx = rt.make_context(keylist);
        assert_eq!(rt.context_find(ctx, upper), Some(1));
    }

    #[test]
    fn root_paramlist_terminates_its_own_chain() {
        let mut rt = Runtime::new();
        let sym = rt.symbols.intern("a");
        let paramlist = rt.make_paramlist(vec![Param::normal(sym, TypeSet::ANY)]);
        assert_eq!(rt.arena.paramlist(paramlist).ancestor(), paramlist);
    }
}
