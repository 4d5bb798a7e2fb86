//! The runtime context object.
//!
//! A [`Runtime`] owns every shared structure of the object model: the
//! symbol table, the node arena, the generic-hook table and the native
//! registry. Components receive it explicitly; there are no ambient
//! globals, and tearing the runtime down releases everything it interned
//! or allocated.

mod action;
mod bind;
mod context;
mod dispatch;
mod frame;
mod generics;
mod natives;

pub use dispatch::{DispatchOutcome, DispatchSignal, Dispatcher};
pub use frame::{DispatchState, Frame};
pub use generics::GenericHook;

use crate::{
    heap::{NodeArena, NodeId},
    runtime::{generics::Generics, natives::NativeRegistry},
    symbols::{SymbolId, SymbolTable},
    value::Cell,
};

/// What happens when a relatively bound word is resolved outside any
/// compatible active frame.
///
/// The behavior is a policy knob rather than a fixed rule; the default
/// treats it as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Report a typed error.
    Error,
    /// Retry the lookup as a specific bind into the given context.
    Fallback(NodeId),
}

/// The single evaluator-thread runtime.
///
/// Dispatch is synchronous and cooperative: invoking a callable suspends
/// the caller until the callable's dispatcher returns, throws, or
/// requests a redo. No structure here is safe to mutate from a second
/// thread.
pub struct Runtime {
    pub symbols: SymbolTable,
    pub arena: NodeArena,
    pub(crate) generics: Generics,
    pub(crate) natives: NativeRegistry,
    pub(crate) orphan_policy: OrphanPolicy,
    pub(crate) trace: bool,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            arena: NodeArena::new(),
            generics: Generics::new(),
            natives: NativeRegistry::new(),
            orphan_policy: OrphanPolicy::Error,
            trace: false,
        }
    }

    /// Enables per-dispatch trace lines on stderr.
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn set_orphan_policy(&mut self, policy: OrphanPolicy) {
        self.orphan_policy = policy;
    }

    pub fn set_collect_threshold(&mut self, threshold: usize) {
        self.arena.set_threshold(threshold);
    }

    /// Runs a collection over everything reachable from the registered
    /// natives, the given extra roots, and the given live frames.
    ///
    /// Returns the number of freed nodes.
    pub fn collect(&mut self, roots: &[NodeId], frames: &[&Frame]) -> usize {
        let mut node_roots: Vec<NodeId> = self.natives.roots().collect();
        node_roots.extend_from_slice(roots);

        let mut cell_roots: Vec<&Cell> = Vec::new();
        for frame in frames {
            node_roots.push(frame.phase());
            node_roots.push(frame.shape());
            cell_roots.extend(frame.args());
            cell_roots.push(frame.out());
        }
        self.arena.collect(&node_roots, &cell_roots)
    }

    /// Lists the weak binding targets that no longer address a live
    /// node. A non-empty result means some word or archetype binding
    /// outlived its context, which is a correctness bug in the embedder.
    pub fn dangling_bindings(&self) -> Vec<NodeId> {
        let mut dangling = Vec::new();
        for (_, node) in self.arena.iter() {
            node.visit_weak(&mut |target| {
                if !self.arena.contains(target) {
                    dangling.push(target);
                }
            });
        }
        dangling
    }

    /// Renders a symbol for diagnostics, tolerating foreign ids.
    pub(crate) fn spelling(&self, symbol: SymbolId) -> String {
        self.symbols
            .try_resolve(symbol)
            .unwrap_or("<unknown>")
            .to_string()
    }
}
