/// A unique identifier for an interned spelling.
///
/// Symbol ids are created by the [`SymbolTable`](super::SymbolTable) and
/// should not be constructed manually. They are cheap to copy and compare;
/// id equality implies byte equality of the spelling.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Creates a new symbol id from a raw index.
    ///
    /// Intended for internal use by the `SymbolTable` only. Ids built
    /// from arbitrary indices can panic when resolved.
    #[inline]
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this symbol id.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}
