//! Symbol interning.
//!
//! Spellings are deduplicated into [`SymbolId`]s by a [`SymbolTable`]
//! owned by the runtime. Alternate-case spellings of one logical name can
//! be linked into a synonym chain anchored at a canonical representative.

mod symbol;
mod table;

pub use symbol::SymbolId;
pub use table::SymbolTable;
