//! Typed runtime errors.
//!
//! Recoverable failures (binding misses, limit violations, unhandled
//! operations) travel as [`RuntimeError`] values through `Result`.
//! Invariant breaches are debug assertions at the sites that detect
//! them. Thrown values are not errors at all: they are routed through
//! the dispatch outcome channel.

use std::fmt;

/// The recoverable error taxonomy of the object-model core.
///
/// Every variant names the offending value and, where one applies, the
/// limit or datatype involved, so a caller can report the failure
/// without re-deriving context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A spelling could not be linked as a synonym because the chosen
    /// anchor is not a canonical symbol.
    SynonymTarget { variant: String, target: String },
    /// A symbol is absent from the context a word was bound against.
    BindingFailure { word: String },
    /// An unbound word was resolved.
    UnboundWord { word: String },
    /// A relatively bound word was resolved outside any compatible
    /// active frame, under [`OrphanPolicy::Error`](crate::runtime::OrphanPolicy).
    OrphanRelative { word: String },
    /// A value exceeded a hard structural limit.
    LimitViolation {
        what: &'static str,
        value: u64,
        limit: u64,
    },
    /// A virtual index was installed on a quoted word occurrence.
    MondexOnQuoted { word: String, quotes: u8 },
    /// A callable was invoked with the wrong number of arguments.
    ArityMismatch {
        label: String,
        want: usize,
        got: usize,
    },
    /// An argument failed the active phase's accepted-type check.
    TypeMismatch {
        label: String,
        param: String,
        found: &'static str,
    },
    /// A local parameter slot arrived holding a value.
    LocalNotUnset { label: String, param: String },
    /// A generic operation has no hook for the argument's datatype.
    UnhandledGeneric {
        verb: String,
        datatype: &'static str,
    },
    /// A dispatcher found no applicable behavior at all.
    Unhandled {
        operation: String,
        datatype: &'static str,
    },
    /// A redo or hijack targeted a phase outside the ancestor chain.
    IncompatiblePhase { label: String },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::SynonymTarget { variant, target } => {
                write!(
                    f,
                    "cannot register `{}` as synonym: `{}` is not canonical",
                    variant, target
                )
            }
            RuntimeError::BindingFailure { word } => {
                write!(f, "cannot bind `{}`: symbol not found in context", word)
            }
            RuntimeError::UnboundWord { word } => {
                write!(f, "word `{}` is unbound", word)
            }
            RuntimeError::OrphanRelative { word } => {
                write!(
                    f,
                    "word `{}` is relatively bound but no compatible frame is active",
                    word
                )
            }
            RuntimeError::LimitViolation { what, value, limit } => {
                write!(f, "{} out of range: {} exceeds limit {}", what, value, limit)
            }
            RuntimeError::MondexOnQuoted { word, quotes } => {
                write!(
                    f,
                    "cannot set virtual index on `{}`: occurrence carries {} quote level(s)",
                    word, quotes
                )
            }
            RuntimeError::ArityMismatch { label, want, got } => {
                write!(
                    f,
                    "wrong number of arguments to `{}`: want={}, got={}",
                    label, want, got
                )
            }
            RuntimeError::TypeMismatch {
                label,
                param,
                found,
            } => {
                write!(
                    f,
                    "`{}` does not accept {} for its `{}` argument",
                    label, found, param
                )
            }
            RuntimeError::LocalNotUnset { label, param } => {
                write!(
                    f,
                    "local `{}` of `{}` must be unset on entry",
                    param, label
                )
            }
            RuntimeError::UnhandledGeneric { verb, datatype } => {
                write!(f, "`{}` has no behavior for {} values", verb, datatype)
            }
            RuntimeError::Unhandled { operation, datatype } => {
                write!(
                    f,
                    "no applicable behavior for `{}` on a {} value",
                    operation, datatype
                )
            }
            RuntimeError::IncompatiblePhase { label } => {
                write!(
                    f,
                    "`{}` is not frame-compatible with the running phase",
                    label
                )
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
