use std::{fmt, rc::Rc};

use crate::{
    diagnostics::RuntimeError,
    heap::NodeId,
    symbols::SymbolId,
    value::{
        action::ActionValue,
        flags::CellFlags,
        kind::{Heart, Kind},
        word::Word,
    },
};

/// Deepest quote nesting a cell can carry.
pub const MAX_QUOTE_DEPTH: u8 = u8::MAX;

/// The tagged payload of a cell. Its discriminant is the cell's heart.
///
/// Heap-backed variants hold arena handles; `Text` uses `Rc<str>` so
/// cloning a cell is O(1) and spellings are shared.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Logic(bool),
    Integer(i64),
    Text(Rc<str>),
    Block(NodeId),
    Word(Word),
    Action(ActionValue),
    Context(NodeId),
}

impl Payload {
    fn heart(&self) -> Heart {
        match self {
            Payload::Null => Heart::Null,
            Payload::Logic(_) => Heart::Logic,
            Payload::Integer(_) => Heart::Integer,
            Payload::Text(_) => Heart::Text,
            Payload::Block(_) => Heart::Block,
            Payload::Word(_) => Heart::Word,
            Payload::Action(_) => Heart::Action,
            Payload::Context(_) => Heart::Context,
        }
    }
}

/// The fixed-shape unit of data in the runtime.
///
/// Constructors build a whole fresh value, so a cell can never retain
/// stale payload from a previous use of the same storage. Quoting is an
/// explicit counter next to the payload; there is no tag arithmetic to
/// decode, and no accessor that reads the heart while ignoring quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    payload: Payload,
    quotes: u8,
    flags: CellFlags,
}

impl Cell {
    fn fresh(payload: Payload) -> Self {
        Self {
            payload,
            quotes: 0,
            flags: CellFlags::NONE,
        }
    }

    pub fn null() -> Self {
        Self::fresh(Payload::Null)
    }

    pub fn logic(value: bool) -> Self {
        Self::fresh(Payload::Logic(value))
    }

    pub fn integer(value: i64) -> Self {
        Self::fresh(Payload::Integer(value))
    }

    pub fn text(value: impl Into<Rc<str>>) -> Self {
        Self::fresh(Payload::Text(value.into()))
    }

    pub fn block(node: NodeId) -> Self {
        Self::fresh(Payload::Block(node))
    }

    /// A fresh, unbound, unquoted occurrence of `symbol`.
    pub fn word(symbol: SymbolId) -> Self {
        Self::fresh(Payload::Word(Word::new(symbol)))
    }

    pub fn context(node: NodeId) -> Self {
        Self::fresh(Payload::Context(node))
    }

    pub(crate) fn action(value: ActionValue) -> Self {
        Self::fresh(Payload::Action(value))
    }

    // ── Decoding ───────────────────────────────────────────────────

    /// Decodes the underlying heart and the quote level together.
    ///
    /// This is the one accessor for a cell's type; every reader that
    /// might see quoted values goes through it (or [`Cell::kind`]).
    #[inline]
    pub fn decode(&self) -> (Heart, u8) {
        (self.payload.heart(), self.quotes)
    }

    /// The underlying datatype, ignoring quote wrapping.
    #[inline]
    pub fn heart(&self) -> Heart {
        self.payload.heart()
    }

    /// The apparent type: `Kind::Quoted` whenever any quote level is
    /// present.
    #[inline]
    pub fn kind(&self) -> Kind {
        if self.quotes > 0 {
            Kind::Quoted
        } else {
            Kind::Unquoted(self.payload.heart())
        }
    }

    #[inline]
    pub fn quote_level(&self) -> u8 {
        self.quotes
    }

    /// The diagnostic label for this cell's apparent type.
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    // ── Quoting ────────────────────────────────────────────────────

    /// Adds `levels` quote wrappings.
    pub fn quote(&mut self, levels: u8) -> Result<(), RuntimeError> {
        let raised = self.quotes as u16 + levels as u16;
        if raised > MAX_QUOTE_DEPTH as u16 {
            return Err(RuntimeError::LimitViolation {
                what: "quote level",
                value: raised as u64,
                limit: MAX_QUOTE_DEPTH as u64,
            });
        }
        self.quotes = raised as u8;
        Ok(())
    }

    /// Removes `levels` quote wrappings.
    pub fn unquote(&mut self, levels: u8) -> Result<(), RuntimeError> {
        if levels > self.quotes {
            return Err(RuntimeError::LimitViolation {
                what: "unquote level",
                value: levels as u64,
                limit: self.quotes as u64,
            });
        }
        self.quotes -= levels;
        Ok(())
    }

    // ── Flags ──────────────────────────────────────────────────────

    #[inline]
    pub fn flags(&self) -> CellFlags {
        self.flags
    }

    pub(crate) fn set_flag(&mut self, flag: CellFlags) {
        self.flags = self.flags.with(flag);
    }

    pub(crate) fn clear_flag(&mut self, flag: CellFlags) {
        self.flags = self.flags.without(flag);
    }

    // ── Payload access ─────────────────────────────────────────────

    pub(crate) fn payload_ref(&self) -> &Payload {
        &self.payload
    }

    pub fn as_logic(&self) -> Option<bool> {
        match self.payload {
            Payload::Logic(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.payload {
            Payload::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<NodeId> {
        match self.payload {
            Payload::Block(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<NodeId> {
        match self.payload {
            Payload::Context(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<&Word> {
        match &self.payload {
            Payload::Word(word) => Some(word),
            _ => None,
        }
    }

    pub(crate) fn as_word_mut(&mut self) -> Option<&mut Word> {
        match &mut self.payload {
            Payload::Word(word) => Some(word),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&ActionValue> {
        match &self.payload {
            Payload::Action(action) => Some(action),
            _ => None,
        }
    }

    pub(crate) fn as_action_mut(&mut self) -> Option<&mut ActionValue> {
        match &mut self.payload {
            Payload::Action(action) => Some(action),
            _ => None,
        }
    }

    /// Range-checked narrowing of an integer cell into a slot index.
    pub fn as_index(&self, limit: u32) -> Result<u32, RuntimeError> {
        let value = self.as_integer().ok_or(RuntimeError::LimitViolation {
            what: "index",
            value: 0,
            limit: limit as u64,
        })?;
        if value < 0 || value as u64 > limit as u64 {
            return Err(RuntimeError::LimitViolation {
                what: "index",
                value: value.unsigned_abs(),
                limit: limit as u64,
            });
        }
        Ok(value as u32)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.quotes {
            write!(f, "'")?;
        }
        match &self.payload {
            Payload::Null => write!(f, "~null~"),
            Payload::Logic(value) => write!(f, "{}", value),
            Payload::Integer(value) => write!(f, "{}", value),
            Payload::Text(value) => write!(f, "\"{}\"", value),
            Payload::Block(node) => write!(f, "<block #{}>", node.as_u32()),
            Payload::Word(word) => write!(f, "<word #{}>", word.symbol().as_u32()),
            Payload::Action(action) => write!(f, "<action #{}>", action.details().as_u32()),
            Payload::Context(node) => write!(f, "<context #{}>", node.as_u32()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_build_unquoted_flagless_cells() {
        let cell = Cell::integer(42);
        assert_eq!(cell.decode(), (Heart::Integer, 0));
        assert_eq!(cell.flags(), CellFlags::NONE);
        assert_eq!(cell.as_integer(), Some(42));
        assert_eq!(cell.as_logic(), None);
    }

    #[test]
    fn kind_accounts_for_quoting() {
        let mut cell = Cell::word(SymbolId::new(0));
        assert_eq!(cell.kind(), Kind::Unquoted(Heart::Word));

        cell.quote(2).unwrap();
        assert_eq!(cell.kind(), Kind::Quoted);
        assert_eq!(cell.decode(), (Heart::Word, 2));
        assert_eq!(cell.type_name(), "quoted");

        cell.unquote(2).unwrap();
        assert_eq!(cell.kind(), Kind::Unquoted(Heart::Word));
    }

    #[test]
    fn quote_depth_limit_is_a_typed_error() {
        let mut cell = Cell::null();
        cell.quote(MAX_QUOTE_DEPTH).unwrap();
        let err = cell.quote(1).unwrap_err();
        assert!(err.to_string().contains("quote level"));
        assert_eq!(cell.quote_level(), MAX_QUOTE_DEPTH);
    }

    #[test]
    fn unquote_below_zero_is_rejected() {
        let mut cell = Cell::integer(1);
        cell.quote(1).unwrap();
        assert!(cell.unquote(2).is_err());
        assert_eq!(cell.quote_level(), 1);
    }

    #[test]
    fn handle_payloads_are_read_back_by_kind() {
        let node = NodeId(3);
        assert_eq!(Cell::block(node).as_block(), Some(node));
        assert_eq!(Cell::block(node).as_context(), None);
        assert_eq!(Cell::context(node).as_context(), Some(node));
        assert_eq!(Cell::context(node).as_block(), None);
    }

    #[test]
    fn as_index_narrows_with_range_check() {
        assert_eq!(Cell::integer(77).as_index(1000).unwrap(), 77);
        assert!(Cell::integer(-1).as_index(1000).is_err());
        assert!(Cell::integer(1001).as_index(1000).is_err());
        assert!(Cell::text("x").as_index(1000).is_err());
    }

    #[test]
    fn display_prefixes_quote_marks() {
        let mut cell = Cell::integer(7);
        cell.quote(2).unwrap();
        assert_eq!(cell.to_string(), "''7");
    }
}
