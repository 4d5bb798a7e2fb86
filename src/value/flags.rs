/// Cross-cutting per-cell property bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct CellFlags(u8);

impl CellFlags {
    pub const NONE: Self = Self(0);
    /// The cell is an output slot that has not been written this pass.
    pub const STALE: Self = Self(1 << 0);
    /// The word occurrence is reached through a virtual binding layer;
    /// its mondex is meaningful.
    pub const VIRTUAL_BIND: Self = Self(1 << 1);
    /// An exemplar slot left unfilled by specialization.
    pub const UNSPECIALIZED: Self = Self(1 << 2);

    #[inline(always)]
    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    #[inline(always)]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    #[inline(always)]
    pub const fn without(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }
}
