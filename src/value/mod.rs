//! Cell representation.
//!
//! A [`Cell`] is the fixed-shape unit of data in the runtime: an explicit
//! tagged payload (the *heart*), a quote level, and a small flag word.
//! There is no raw-tag shortcut; code that needs the apparent type of a
//! value goes through [`Cell::decode`] or [`Cell::kind`], which account
//! for quoting together.

mod action;
mod cell;
mod flags;
mod kind;
mod word;

pub use action::{ActionValue, Partner};
pub use cell::{Cell, MAX_QUOTE_DEPTH, Payload};
pub use flags::CellFlags;
pub use kind::{Heart, Kind, TypeSet};
pub use word::{Binding, MONDEX_MODULUS, PHYSICAL_INDEX_MAX, Word, WordIndex};
