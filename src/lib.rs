//! Object-model core of the Rell runtime.
//!
//! # Sharing model
//! Paramlists, details arrays and contexts live in a handle-addressed
//! arena ([`heap::NodeArena`]). Sharing is always expressed as multiple
//! [`heap::NodeId`]s aliasing one arena slot: a specialization reusing
//! its base's paramlist, an ancestor link, an exemplar's keylist.
//! Published nodes are never reshaped in place; shape changes allocate a
//! new node and relink, so concurrent readers never observe a mutation.
//!
//! Word bindings are references, not ownership edges: the collector does
//! not trace them, and a binding that outlives its target is a
//! correctness bug caught by debug assertions, never a safety hazard.

pub mod diagnostics;
pub mod heap;
pub mod runtime;
pub mod symbols;
pub mod value;
