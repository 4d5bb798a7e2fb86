use crate::{
    heap::NodeId,
    runtime::Dispatcher,
    symbols::SymbolId,
    value::{Cell, Payload, TypeSet},
};

/// How one formal parameter takes its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamClass {
    /// Evaluated argument, checked against the accepted-type set.
    Normal,
    /// Argument taken as given, without evaluation.
    Quoted,
    /// Not supplied by the caller; must be unset at frame entry.
    Local,
}

/// One parameter descriptor of a paramlist.
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub symbol: SymbolId,
    pub class: ParamClass,
    pub accepts: TypeSet,
}

impl Param {
    pub fn normal(symbol: SymbolId, accepts: TypeSet) -> Self {
        Self {
            symbol,
            class: ParamClass::Normal,
            accepts,
        }
    }

    pub fn quoted(symbol: SymbolId) -> Self {
        Self {
            symbol,
            class: ParamClass::Quoted,
            accepts: TypeSet::ANY,
        }
    }

    pub fn local(symbol: SymbolId) -> Self {
        Self {
            symbol,
            class: ParamClass::Local,
            accepts: TypeSet::NONE,
        }
    }
}

/// A callable's parameter shape, reusable as a context's key list.
///
/// Slot 0 is the archetype of the details array that introduced the
/// shape; slot n (n ≥ 1) describes formal parameter n. The node is
/// immutable once published; derivations that diverge in shape allocate
/// a new paramlist and link back through `ancestor`.
#[derive(Debug, Clone)]
pub struct ParamlistNode {
    pub(crate) archetype: Cell,
    pub(crate) params: Vec<Param>,
    /// Ancestor keylist with the same-or-fewer slots. A root paramlist
    /// links to itself.
    pub(crate) ancestor: NodeId,
}

impl ParamlistNode {
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn ancestor(&self) -> NodeId {
        self.ancestor
    }

    /// The archetype cell written by the details array that introduced
    /// this shape.
    pub fn archetype(&self) -> &Cell {
        &self.archetype
    }

    /// Finds the 1-based slot of `symbol`, comparing canonical ids.
    pub(crate) fn find(&self, canonical: impl Fn(SymbolId) -> SymbolId, symbol: SymbolId) -> Option<usize> {
        let target = canonical(symbol);
        self.params
            .iter()
            .position(|param| canonical(param.symbol) == target)
            .map(|index| index + 1)
    }
}

/// Per-details flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct DetailsFlags(u8);

impl DetailsFlags {
    pub const NONE: Self = Self(0);
    /// This phase's arguments are established by the dispatcher itself;
    /// entry typechecking is skipped and deferred to the phase it
    /// re-dispatches into.
    pub const DEFERS_TYPECHECK: Self = Self(1 << 0);

    #[inline(always)]
    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    #[inline(always)]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }
}

/// Where a details array keeps its parameter shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specialty {
    /// The bare paramlist.
    Paramlist(NodeId),
    /// A full exemplar context holding pre-filled argument values; its
    /// keylist is the paramlist.
    Exemplar(NodeId),
}

/// The identity and instance data of one callable.
///
/// Slot 0 is the archetype; the remaining slots' shape is a contract
/// between the dispatcher and its details (a closure body here, a verb
/// symbol there). Slots may hold further node references; the collector
/// discovers them by walking the slot cells like any others.
pub struct DetailsNode {
    pub(crate) archetype: Cell,
    pub(crate) slots: Vec<Cell>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) specialty: Specialty,
    pub(crate) meta: Option<NodeId>,
    pub(crate) flags: DetailsFlags,
}

impl DetailsNode {
    /// The canonical value-form of this callable.
    pub fn archetype(&self) -> &Cell {
        &self.archetype
    }

    pub fn slots(&self) -> &[Cell] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Cell] {
        &mut self.slots
    }

    pub fn specialty(&self) -> Specialty {
        self.specialty
    }

    pub fn meta(&self) -> Option<NodeId> {
        self.meta
    }

    pub fn flags(&self) -> DetailsFlags {
        self.flags
    }

    pub(crate) fn dispatcher(&self) -> Dispatcher {
        self.dispatcher
    }
}

impl std::fmt::Debug for DetailsNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetailsNode")
            .field("archetype", &self.archetype)
            .field("slots", &self.slots.len())
            .field("specialty", &self.specialty)
            .field("meta", &self.meta)
            .finish()
    }
}

/// A context instance: a keylist shared with its paramlist plus one
/// variable cell per key.
#[derive(Debug)]
pub struct ContextNode {
    pub(crate) keylist: NodeId,
    pub(crate) vars: Vec<Cell>,
    pub(crate) meta: Option<NodeId>,
}

impl ContextNode {
    pub fn keylist(&self) -> NodeId {
        self.keylist
    }

    pub fn meta(&self) -> Option<NodeId> {
        self.meta
    }

    pub fn vars(&self) -> &[Cell] {
        &self.vars
    }

    /// The variable cell at 1-based slot `index`.
    pub fn var(&self, index: usize) -> &Cell {
        &self.vars[index - 1]
    }

    pub(crate) fn var_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.vars[index - 1]
    }
}

/// One arena-allocated object-model node.
#[derive(Debug)]
pub enum Node {
    Block(Vec<Cell>),
    Paramlist(ParamlistNode),
    Details(DetailsNode),
    Context(ContextNode),
}

impl Node {
    /// Enumerates the node references this node owns, for the collector.
    pub fn visit_owned(&self, visit: &mut impl FnMut(NodeId)) {
        match self {
            Node::Block(cells) => {
                for cell in cells {
                    cell_owned_edges(cell, visit);
                }
            }
            Node::Paramlist(paramlist) => {
                cell_owned_edges(&paramlist.archetype, visit);
                visit(paramlist.ancestor);
            }
            Node::Details(details) => {
                cell_owned_edges(&details.archetype, visit);
                for cell in &details.slots {
                    cell_owned_edges(cell, visit);
                }
                match details.specialty {
                    Specialty::Paramlist(node) | Specialty::Exemplar(node) => visit(node),
                }
                if let Some(meta) = details.meta {
                    visit(meta);
                }
            }
            Node::Context(context) => {
                visit(context.keylist);
                for cell in &context.vars {
                    cell_owned_edges(cell, visit);
                }
                if let Some(meta) = context.meta {
                    visit(meta);
                }
            }
        }
    }

    /// Enumerates the weak references this node holds: bindings inside
    /// its cells. The collector never traces these.
    pub fn visit_weak(&self, visit: &mut impl FnMut(NodeId)) {
        let mut per_cell = |cell: &Cell| cell_weak_edges(cell, visit);
        match self {
            Node::Block(cells) => cells.iter().for_each(&mut per_cell),
            Node::Paramlist(paramlist) => per_cell(&paramlist.archetype),
            Node::Details(details) => {
                per_cell(&details.archetype);
                details.slots.iter().for_each(&mut per_cell);
            }
            Node::Context(context) => context.vars.iter().for_each(&mut per_cell),
        }
    }
}

/// Enumerates the arena references a cell owns.
///
/// Word and action bindings are deliberately excluded: a binding is a
/// reference, not an ownership edge.
pub fn cell_owned_edges(cell: &Cell, visit: &mut impl FnMut(NodeId)) {
    match cell_payload(cell) {
        Payload::Block(node) | Payload::Context(node) => visit(*node),
        Payload::Action(action) => visit(action.details()),
        _ => {}
    }
}

/// Enumerates the binding references a cell holds.
pub fn cell_weak_edges(cell: &Cell, visit: &mut impl FnMut(NodeId)) {
    use crate::value::Binding;
    let binding = match cell_payload(cell) {
        Payload::Word(word) => word.binding(),
        Payload::Action(action) => action.binding(),
        _ => return,
    };
    match binding {
        Binding::Specific(node) | Binding::Relative(node) => visit(node),
        Binding::Unbound => {}
    }
}

fn cell_payload(cell: &Cell) -> &Payload {
    cell.payload_ref()
}
