//! Arena storage for object-model nodes.
//!
//! Paramlists, details arrays, contexts and blocks are allocated here
//! and addressed by stable [`NodeId`] handles. Sharing between
//! derivations is handle aliasing, never duplicated data. The arena
//! collects by mark-and-sweep over the owned edges each node
//! enumerates; weak edges (word and archetype bindings) are never
//! traced.

mod arena;
mod node;

pub use arena::NodeArena;
pub use node::{
    ContextNode, DetailsFlags, DetailsNode, Node, Param, ParamClass, ParamlistNode, Specialty,
};

/// A stable handle to one arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}
