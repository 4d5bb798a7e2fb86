use crate::{heap::NodeId, symbols::SymbolId, value::word::Binding};

/// The secondary slot of an action cell.
///
/// An archetypal action carries a reference to its own details array; a
/// labeled copy carries the display name instead. The two forms are
/// distinguished here at the type level, so no caller ever has to probe
/// the referent's tag before dereferencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partner {
    /// The canonical value-form stored at slot 0 of the details array.
    Archetype(NodeId),
    /// A value-level copy carrying a display name.
    Label(SymbolId),
}

/// Payload of an action-typed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionValue {
    details: NodeId,
    partner: Partner,
    binding: Binding,
}

impl ActionValue {
    /// The archetypal form referencing its own details array. Archetypes
    /// are always unbound and carry no label.
    pub(crate) fn archetype(details: NodeId) -> Self {
        Self {
            details,
            partner: Partner::Archetype(details),
            binding: Binding::Unbound,
        }
    }

    /// The callable identity this value designates.
    #[inline]
    pub fn details(&self) -> NodeId {
        self.details
    }

    #[inline]
    pub fn partner(&self) -> Partner {
        self.partner
    }

    /// The display name, if this is a labeled copy.
    #[inline]
    pub fn label(&self) -> Option<SymbolId> {
        match self.partner {
            Partner::Archetype(_) => None,
            Partner::Label(symbol) => Some(symbol),
        }
    }

    #[inline]
    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub(crate) fn with_label(self, symbol: SymbolId) -> Self {
        Self {
            partner: Partner::Label(symbol),
            ..self
        }
    }

    pub(crate) fn set_binding(&mut self, binding: Binding) {
        self.binding = binding;
    }
}
