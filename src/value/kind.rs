/// The underlying datatype of a cell, independent of quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heart {
    Null,
    Logic,
    Integer,
    Text,
    Block,
    Word,
    Action,
    Context,
}

impl Heart {
    /// Returns the canonical datatype label used in diagnostics.
    ///
    /// These labels are user-visible and are expected to remain stable.
    pub fn type_name(self) -> &'static str {
        match self {
            Heart::Null => "null",
            Heart::Logic => "logic",
            Heart::Integer => "integer",
            Heart::Text => "text",
            Heart::Block => "block",
            Heart::Word => "word",
            Heart::Action => "action",
            Heart::Context => "context",
        }
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// The apparent type of a cell: its heart, or `Quoted` when the value is
/// wrapped in one or more quote levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Unquoted(Heart),
    Quoted,
}

impl Kind {
    /// Returns the diagnostic label for this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            Kind::Unquoted(heart) => heart.type_name(),
            Kind::Quoted => "quoted",
        }
    }
}

/// An accepted-type set for one formal parameter.
///
/// One bit per [`Heart`], plus a bit admitting quoted values of any
/// heart (quoting wraps arbitrarily many types, so it gets one gate
/// rather than a per-heart matrix).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSet(u16);

impl TypeSet {
    pub const NONE: Self = Self(0);
    /// Every heart plus quoted values.
    pub const ANY: Self = Self(u16::MAX);

    const QUOTED_BIT: u16 = 1 << 15;

    /// The set containing exactly one heart.
    pub const fn of(heart: Heart) -> Self {
        Self(heart.bit())
    }

    /// This set widened by another heart.
    pub const fn with(self, heart: Heart) -> Self {
        Self(self.0 | heart.bit())
    }

    /// This set widened to admit quoted values.
    pub const fn with_quoted(self) -> Self {
        Self(self.0 | Self::QUOTED_BIT)
    }

    /// Whether an argument of the given apparent kind is accepted.
    pub const fn admits(self, kind: Kind) -> bool {
        match kind {
            Kind::Unquoted(heart) => self.0 & heart.bit() != 0,
            Kind::Quoted => self.0 & Self::QUOTED_BIT != 0,
        }
    }
}
