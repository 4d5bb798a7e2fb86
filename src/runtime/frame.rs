use crate::{
    heap::NodeId,
    symbols::SymbolId,
    value::{Cell, CellFlags},
};

/// Where a frame currently is in the dispatch protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DispatchState {
    InitialEntry,
    TypeChecking,
    Dispatching,
}

/// Ephemeral per-invocation activation record.
///
/// A frame's argument slots are laid out by the shape paramlist of the
/// action it was built for; the active `phase` may move along that
/// shape's ancestor chain mid-call when a dispatcher requests a redo,
/// but never off it.
#[derive(Debug)]
pub struct Frame {
    pub(crate) phase: NodeId,
    /// Paramlist the frame was laid out against. Fixed for the frame's
    /// lifetime; every legal phase's paramlist is on its ancestor chain.
    pub(crate) shape: NodeId,
    pub(crate) args: Vec<Cell>,
    pub(crate) out: Cell,
    pub(crate) cursor: usize,
    pub(crate) state: DispatchState,
    pub(crate) label: Option<SymbolId>,
}

impl Frame {
    pub(crate) fn new(
        phase: NodeId,
        shape: NodeId,
        args: Vec<Cell>,
        label: Option<SymbolId>,
    ) -> Self {
        let mut out = Cell::null();
        out.set_flag(CellFlags::STALE);
        Self {
            phase,
            shape,
            args,
            out,
            cursor: 0,
            state: DispatchState::InitialEntry,
            label,
        }
    }

    /// The details array whose dispatcher runs next.
    #[inline]
    pub fn phase(&self) -> NodeId {
        self.phase
    }

    /// The paramlist this frame's slots are laid out against.
    #[inline]
    pub fn shape(&self) -> NodeId {
        self.shape
    }

    #[inline]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    #[inline]
    pub fn label(&self) -> Option<SymbolId> {
        self.label
    }

    pub fn args(&self) -> &[Cell] {
        &self.args
    }

    /// The argument cell at 1-based paramlist slot `index`.
    pub fn arg(&self, index: usize) -> &Cell {
        &self.args[index - 1]
    }

    pub fn arg_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.args[index - 1]
    }

    /// The output cell. Stale until a dispatcher produces a value.
    pub fn out(&self) -> &Cell {
        &self.out
    }
}
