use crate::{
    heap::{
        NodeId,
        node::{ContextNode, DetailsNode, Node, ParamlistNode, cell_owned_edges},
    },
    value::Cell,
};

const DEFAULT_COLLECT_THRESHOLD: usize = 10_000;
const MIN_COLLECT_THRESHOLD: usize = 256;

struct NodeEntry {
    node: Node,
    marked: bool,
}

/// Arena of object-model nodes with free-list slot reuse and
/// mark-and-sweep collection.
///
/// Handles stay stable across allocations; a freed slot is only reused
/// after a sweep has proven its node unreachable from the supplied
/// roots.
pub struct NodeArena {
    entries: Vec<Option<NodeEntry>>,
    free_list: Vec<u32>,
    allocation_count: usize,
    collect_threshold: usize,
    total_collections: usize,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            allocation_count: 0,
            collect_threshold: DEFAULT_COLLECT_THRESHOLD,
            total_collections: 0,
        }
    }

    /// Sets the allocation count that makes [`Self::should_collect`]
    /// report `true`. Values below the minimum are clamped upward.
    pub fn set_threshold(&mut self, threshold: usize) {
        self.collect_threshold = threshold.max(MIN_COLLECT_THRESHOLD);
    }

    /// Returns `true` when enough allocations have happened since the
    /// last sweep to warrant one.
    pub fn should_collect(&self) -> bool {
        self.allocation_count >= self.collect_threshold
    }

    /// Allocates a node and returns a stable handle to it.
    ///
    /// Freed slots are reused through the internal free list before the
    /// storage vector grows.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.allocation_count += 1;
        let entry = NodeEntry {
            node,
            marked: false,
        };
        if let Some(index) = self.free_list.pop() {
            self.entries[index as usize] = Some(entry);
            NodeId(index)
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(Some(entry));
            NodeId(index)
        }
    }

    /// Returns a live node by handle.
    ///
    /// Panics if the handle points to a swept slot or is out of bounds;
    /// holding a handle across a collection without rooting it is a
    /// programming error.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.entries[id.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("NodeArena::get: dead handle #{}", id.0))
            .node
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.entries[id.0 as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("NodeArena::get_mut: dead handle #{}", id.0))
            .node
    }

    /// Returns `true` if `id` addresses a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries
            .get(id.0 as usize)
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Returns the number of live nodes.
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn total_collections(&self) -> usize {
        self.total_collections
    }

    /// Iterates over the live nodes and their handles.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.entries.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|entry| (NodeId(index as u32), &entry.node))
        })
    }

    // ── Typed access ───────────────────────────────────────────────
    //
    // The node kind behind a handle is part of the caller's contract;
    // a mismatch is a programming error, reported like a dead handle.

    pub fn paramlist(&self, id: NodeId) -> &ParamlistNode {
        match self.get(id) {
            Node::Paramlist(paramlist) => paramlist,
            other => panic!("expected paramlist at #{}, found {:?}", id.0, other),
        }
    }

    pub fn details(&self, id: NodeId) -> &DetailsNode {
        match self.get(id) {
            Node::Details(details) => details,
            other => panic!("expected details at #{}, found {:?}", id.0, other),
        }
    }

    pub fn details_mut(&mut self, id: NodeId) -> &mut DetailsNode {
        match self.get_mut(id) {
            Node::Details(details) => details,
            other => panic!("expected details at #{}, found {:?}", id.0, other),
        }
    }

    pub fn context(&self, id: NodeId) -> &ContextNode {
        match self.get(id) {
            Node::Context(context) => context,
            other => panic!("expected context at #{}, found {:?}", id.0, other),
        }
    }

    pub fn context_mut(&mut self, id: NodeId) -> &mut ContextNode {
        match self.get_mut(id) {
            Node::Context(context) => context,
            other => panic!("expected context at #{}, found {:?}", id.0, other),
        }
    }

    pub fn block(&self, id: NodeId) -> &[Cell] {
        match self.get(id) {
            Node::Block(cells) => cells,
            other => panic!("expected block at #{}, found {:?}", id.0, other),
        }
    }

    // ── Collection ─────────────────────────────────────────────────

    /// Marks everything reachable from the given roots through owned
    /// edges, sweeps the rest, and returns the number of freed nodes.
    ///
    /// Weak edges (bindings) are not traced; a binding whose target gets
    /// swept dangles, which resolve-time assertions catch.
    pub fn collect(&mut self, node_roots: &[NodeId], cell_roots: &[&Cell]) -> usize {
        let mut worklist: Vec<NodeId> = Vec::new();
        worklist.extend_from_slice(node_roots);
        for cell in cell_roots {
            cell_owned_edges(cell, &mut |id| worklist.push(id));
        }

        while let Some(id) = worklist.pop() {
            let Some(entry) = self.entries.get_mut(id.0 as usize).and_then(Option::as_mut)
            else {
                debug_assert!(false, "rooted dead handle #{}", id.0);
                continue;
            };
            if entry.marked {
                continue;
            }
            entry.marked = true;
            entry.node.visit_owned(&mut |edge| worklist.push(edge));
        }

        let mut freed = 0;
        for (index, slot) in self.entries.iter_mut().enumerate() {
            match slot {
                Some(entry) if entry.marked => entry.marked = false,
                Some(_) => {
                    *slot = None;
                    self.free_list.push(index as u32);
                    freed += 1;
                }
                None => {}
            }
        }

        self.allocation_count = 0;
        self.total_collections += 1;
        freed
    }
}
