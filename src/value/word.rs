use crate::{diagnostics::RuntimeError, heap::NodeId, symbols::SymbolId};

/// Largest physical slot index a word can cache (20 bits).
pub const PHYSICAL_INDEX_MAX: u32 = (1 << 20) - 1;

/// Modulus applied to virtual indices (12-bit mondex field).
pub const MONDEX_MODULUS: u32 = 4095;

/// What a word occurrence's extra field designates.
///
/// This is a reference, never an ownership edge: the bound-to node must
/// not be kept alive by the binding, and a binding that outlives its
/// target is caught by validity assertions, not by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Not attached to any storage.
    Unbound,
    /// Bound into one concrete context instance.
    Specific(NodeId),
    /// Bound to an action identity; the storage slot is supplied by a
    /// matching frame at resolve time.
    Relative(NodeId),
}

/// Packed index cache for a word occurrence.
///
/// Low 20 bits: physical slot index in the bound context or frame.
/// High 12 bits: mondex, the modulo-bounded index used when the word is
/// reached through a virtual binding layer instead of a direct slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordIndex(u32);

impl WordIndex {
    const PHYSICAL_MASK: u32 = PHYSICAL_INDEX_MAX;

    /// The cached physical slot index.
    #[inline]
    pub fn physical(self) -> u32 {
        self.0 & Self::PHYSICAL_MASK
    }

    /// The cached virtual index.
    #[inline]
    pub fn mondex(self) -> u32 {
        self.0 >> 20
    }

    /// Caches a physical slot index, range-checked against the 20-bit
    /// budget.
    pub fn set_physical(&mut self, index: usize) -> Result<(), RuntimeError> {
        if index as u64 > PHYSICAL_INDEX_MAX as u64 {
            return Err(RuntimeError::LimitViolation {
                what: "physical index",
                value: index as u64,
                limit: PHYSICAL_INDEX_MAX as u64,
            });
        }
        self.0 = (self.0 & !Self::PHYSICAL_MASK) | index as u32;
        Ok(())
    }

    /// Stores a virtual index, reduced modulo [`MONDEX_MODULUS`].
    ///
    /// The quoting precondition is enforced at the cell level, where the
    /// quote level is known.
    pub(crate) fn set_mondex(&mut self, value: u32) {
        let mondex = value % MONDEX_MODULUS;
        self.0 = (self.0 & Self::PHYSICAL_MASK) | (mondex << 20);
    }

    /// Deletes the virtual index. Used when a word becomes a direct,
    /// unquoted occurrence.
    pub(crate) fn clear_mondex(&mut self) {
        self.0 &= Self::PHYSICAL_MASK;
    }
}

/// Payload of a word-typed cell: a symbol plus a binding and its cached
/// slot indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    symbol: SymbolId,
    binding: Binding,
    index: WordIndex,
}

impl Word {
    /// A fresh, unbound occurrence of `symbol`. Both cached indices
    /// start at zero.
    pub fn new(symbol: SymbolId) -> Self {
        Self {
            symbol,
            binding: Binding::Unbound,
            index: WordIndex::default(),
        }
    }

    #[inline]
    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    #[inline]
    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// The cached physical index. Valid only relative to whatever the
    /// binding currently designates.
    #[inline]
    pub fn physical_index(&self) -> u32 {
        self.index.physical()
    }

    /// The cached virtual index. Meaningful only while the occurrence
    /// carries the `VIRTUAL_BIND` flag.
    #[inline]
    pub fn mondex(&self) -> u32 {
        self.index.mondex()
    }

    pub(crate) fn set_binding(&mut self, binding: Binding) {
        self.binding = binding;
    }

    pub(crate) fn index_mut(&mut self) -> &mut WordIndex {
        &mut self.index
    }
}
