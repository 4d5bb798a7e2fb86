use crate::{
    diagnostics::RuntimeError,
    heap::{DetailsFlags, DetailsNode, Node, NodeId, Param, Specialty},
    runtime::{DispatchSignal, Dispatcher, Frame, Runtime},
    symbols::SymbolId,
    value::{ActionValue, Binding, Cell, CellFlags},
};

impl Runtime {
    /// Allocates a details array over `paramlist`, installs the
    /// dispatcher, and writes the archetype into slot 0.
    ///
    /// The archetype references the new details array itself, is always
    /// unbound, and carries no label. The remaining `details_size` slots
    /// start unset; their shape is the dispatcher's contract.
    pub fn make_action(
        &mut self,
        paramlist: NodeId,
        dispatcher: Dispatcher,
        details_size: usize,
    ) -> NodeId {
        self.make_action_flagged(paramlist, dispatcher, details_size, DetailsFlags::NONE)
    }

    pub(crate) fn make_action_flagged(
        &mut self,
        paramlist: NodeId,
        dispatcher: Dispatcher,
        details_size: usize,
        flags: DetailsFlags,
    ) -> NodeId {
        self.make_details(Specialty::Paramlist(paramlist), dispatcher, details_size, flags)
    }

    fn make_details(
        &mut self,
        specialty: Specialty,
        dispatcher: Dispatcher,
        details_size: usize,
        flags: DetailsFlags,
    ) -> NodeId {
        let id = self.arena.alloc(Node::Details(DetailsNode {
            archetype: Cell::null(),
            slots: vec![Cell::null(); details_size],
            dispatcher,
            specialty,
            meta: None,
            flags,
        }));
        let archetype = Cell::action(ActionValue::archetype(id));
        self.arena.details_mut(id).archetype = archetype.clone();

        // A paramlist without an origin adopts the first details array
        // built over it.
        let paramlist = self.paramlist_of(id);
        if let Node::Paramlist(node) = self.arena.get_mut(paramlist) {
            if node.archetype.as_action().is_none() {
                node.archetype = archetype;
            }
        }
        id
    }

    /// The parameter shape of an action, whatever its specialty holds.
    pub fn paramlist_of(&self, details: NodeId) -> NodeId {
        match self.arena.details(details).specialty() {
            Specialty::Paramlist(paramlist) => paramlist,
            Specialty::Exemplar(context) => self.arena.context(context).keylist(),
        }
    }

    /// The archetypal value-form of an action.
    pub fn archetype(&self, details: NodeId) -> Cell {
        self.arena.details(details).archetype().clone()
    }

    /// Attaches or detaches an action's meta node. Meta edges are owned
    /// and traced by the collector.
    pub fn set_action_meta(&mut self, details: NodeId, meta: Option<NodeId>) {
        debug_assert!(meta.is_none_or(|id| self.arena.contains(id)));
        self.arena.details_mut(details).meta = meta;
    }

    /// Records the home context of an action occurrence.
    ///
    /// Only the value-level copy is bound; the archetype stored in the
    /// details array stays unbound. Like word bindings this is a weak
    /// reference, never an ownership edge.
    pub fn bind_action(&mut self, cell: &mut Cell, context: NodeId) -> Result<(), RuntimeError> {
        debug_assert!(self.arena.contains(context), "bind target was swept");
        match cell.as_action_mut() {
            Some(action) => {
                action.set_binding(Binding::Specific(context));
                Ok(())
            }
            None => {
                debug_assert!(false, "bind_action on a non-action cell");
                Err(RuntimeError::BindingFailure {
                    word: cell.type_name().to_string(),
                })
            }
        }
    }

    /// Produces a value-level copy of an action cell carrying a display
    /// name in place of the archetype reference.
    pub fn derive_label(&self, cell: &Cell, label: SymbolId) -> Result<Cell, RuntimeError> {
        let action = cell.as_action().ok_or_else(|| RuntimeError::Unhandled {
            operation: "derive-label".to_string(),
            datatype: cell.type_name(),
        })?;
        Ok(Cell::action(action.with_label(label)))
    }

    /// Builds a specialization of `base` whose exemplar pre-fills the
    /// named arguments.
    ///
    /// The exemplar is a context over base's paramlist (shared, not
    /// copied); slots the caller leaves out stay unspecialized and are
    /// taken from the eventual call site. Specializing a specialization
    /// seeds the new exemplar from the base's, so slots the base already
    /// filled stay filled and off the caller's arity count. The
    /// specialization defers typechecking to the base phase it
    /// re-dispatches into.
    pub fn specialize(
        &mut self,
        base: NodeId,
        fills: &[(SymbolId, Cell)],
    ) -> Result<NodeId, RuntimeError> {
        let paramlist = self.paramlist_of(base);
        let exemplar = self.make_context(paramlist);

        let base_exemplar = match self.arena.details(base).specialty() {
            Specialty::Exemplar(context) => Some(context),
            Specialty::Paramlist(_) => None,
        };
        let slots = self.arena.paramlist(paramlist).params().len();
        for index in 1..=slots {
            let seeded = base_exemplar.map(|ctx| self.arena.context(ctx).var(index).clone());
            let var = self.arena.context_mut(exemplar).var_mut(index);
            match seeded {
                Some(cell) => *var = cell,
                None => var.set_flag(CellFlags::UNSPECIALIZED),
            }
        }
        for (symbol, value) in fills {
            let index = self.paramlist_find(paramlist, *symbol).ok_or_else(|| {
                RuntimeError::BindingFailure {
                    word: self.spelling(*symbol),
                }
            })?;
            let var = self.arena.context_mut(exemplar).var_mut(index);
            *var = value.clone();
        }

        let id = self.make_details(
            Specialty::Exemplar(exemplar),
            specializer_dispatcher,
            1,
            DetailsFlags::NONE.with(DetailsFlags::DEFERS_TYPECHECK),
        );
        // Redo straight into the underlying phase. Chaining through a
        // base specialization would re-copy its fills over any slot the
        // new exemplar re-fills.
        let base_cell = match base_exemplar {
            Some(_) => self.arena.details(base).slots()[0].clone(),
            None => self.archetype(base),
        };
        self.arena.details_mut(id).slots[0] = base_cell;
        Ok(id)
    }

    /// Builds an action extending `base`'s paramlist with additional
    /// parameters.
    ///
    /// The new paramlist's ancestor is base's paramlist, so frames built
    /// for the augmented action remain compatible with every phase of
    /// the base. Augmenting a specialization keeps its fills: the new
    /// details carries an exemplar over the extended paramlist, with the
    /// added slots left to the caller.
    pub fn augment(&mut self, base: NodeId, extra: Vec<Param>) -> Result<NodeId, RuntimeError> {
        let base_paramlist = self.paramlist_of(base);
        for param in &extra {
            if self.paramlist_find(base_paramlist, param.symbol).is_some() {
                return Err(RuntimeError::BindingFailure {
                    word: self.spelling(param.symbol),
                });
            }
        }
        let base_len = self.arena.paramlist(base_paramlist).params().len();
        let mut params = self.arena.paramlist(base_paramlist).params().to_vec();
        params.extend(extra);
        let paramlist = self.make_derived_paramlist(params, base_paramlist);

        let base_node = self.arena.details(base);
        let dispatcher = base_node.dispatcher();
        let slots = base_node.slots().to_vec();
        let flags = base_node.flags();
        let specialty = match base_node.specialty() {
            Specialty::Paramlist(_) => Specialty::Paramlist(paramlist),
            Specialty::Exemplar(base_ctx) => {
                let exemplar = self.make_context(paramlist);
                for index in 1..=base_len {
                    let seeded = self.arena.context(base_ctx).var(index).clone();
                    *self.arena.context_mut(exemplar).var_mut(index) = seeded;
                }
                let total = self.arena.paramlist(paramlist).params().len();
                for index in base_len + 1..=total {
                    self.arena
                        .context_mut(exemplar)
                        .var_mut(index)
                        .set_flag(CellFlags::UNSPECIALIZED);
                }
                Specialty::Exemplar(exemplar)
            }
        };
        let id = self.make_details(specialty, dispatcher, slots.len(), flags);
        self.arena.details_mut(id).slots = slots;
        Ok(id)
    }

    /// Replaces `victim`'s behavior with `replacement`'s.
    ///
    /// Allowed only when every frame built for the victim can run the
    /// replacement's phases, i.e. when the replacement's paramlist lies
    /// on the victim's ancestor chain.
    pub fn hijack(&mut self, victim: NodeId, replacement: NodeId) -> Result<(), RuntimeError> {
        if !self.is_ancestor(replacement, victim) {
            return Err(RuntimeError::IncompatiblePhase {
                label: self.action_name(replacement),
            });
        }
        let node = self.arena.details(replacement);
        let dispatcher = node.dispatcher();
        let slots = node.slots().to_vec();
        let specialty = node.specialty();
        let flags = node.flags();

        let victim_node = self.arena.details_mut(victim);
        victim_node.dispatcher = dispatcher;
        victim_node.slots = slots;
        victim_node.specialty = specialty;
        victim_node.flags = flags;
        Ok(())
    }

    /// Whether `base` lies on `derived`'s paramlist-ancestor chain.
    ///
    /// Identity walk, not structural comparison: the chain is followed
    /// from derived's own paramlist to the self-linking terminator. This
    /// is the authority for redo safety and hijack compatibility.
    pub fn is_ancestor(&self, base: NodeId, derived: NodeId) -> bool {
        let target = self.paramlist_of(base);
        self.on_shape_chain(target, self.paramlist_of(derived))
    }

    /// Whether `target` is `shape` itself or one of its ancestors.
    pub(crate) fn on_shape_chain(&self, target: NodeId, shape: NodeId) -> bool {
        let mut current = shape;
        loop {
            if current == target {
                return true;
            }
            let ancestor = self.arena.paramlist(current).ancestor();
            if ancestor == current {
                return false;
            }
            current = ancestor;
        }
    }

    /// A display name for diagnostics: the archetype's label if one was
    /// derived, otherwise the spelling is unknown.
    pub(crate) fn action_name(&self, details: NodeId) -> String {
        self.arena
            .details(details)
            .archetype()
            .as_action()
            .and_then(|action| action.label())
            .map(|symbol| self.spelling(symbol))
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// Dispatcher of a specialization: copies the exemplar's filled slots
/// over the frame's arguments, then re-dispatches into the base phase
/// with a full typecheck.
fn specializer_dispatcher(
    rt: &mut Runtime,
    frame: &mut Frame,
) -> Result<DispatchSignal, RuntimeError> {
    let details = rt.arena.details(frame.phase());
    let base = details
        .slots()
        .first()
        .and_then(Cell::as_action)
        .map(ActionValue::details);
    let exemplar = match details.specialty() {
        Specialty::Exemplar(context) => Some(context),
        Specialty::Paramlist(_) => None,
    };
    let (Some(base), Some(exemplar)) = (base, exemplar) else {
        debug_assert!(false, "specialization details are malformed");
        return Ok(DispatchSignal::Unhandled);
    };

    let vars = rt.arena.context(exemplar).vars();
    for (slot, var) in vars.iter().enumerate() {
        if !var.flags().contains(CellFlags::UNSPECIALIZED) {
            *frame.arg_mut(slot + 1) = var.clone();
        }
    }
    Ok(DispatchSignal::Redo {
        phase: base,
        recheck: true,
    })
}
