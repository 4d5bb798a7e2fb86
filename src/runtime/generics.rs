//! Generic operations: verbs that select behavior by the datatype of
//! their first argument.

use std::collections::HashMap;

use crate::{
    diagnostics::RuntimeError,
    heap::{NodeId, Param},
    runtime::{DispatchSignal, Frame, Runtime},
    symbols::SymbolId,
    value::{Cell, Heart},
};

/// A per-datatype behavior of a generic verb. Same contract as a
/// dispatcher; hooks typically finish with `Done` or `Thrown`.
pub type GenericHook = crate::runtime::Dispatcher;

#[derive(Default)]
struct GenericDef {
    hooks: HashMap<Heart, GenericHook>,
    /// One hook for all quoted arguments, whatever their heart.
    quoted: Option<GenericHook>,
}

/// The runtime's verb table, keyed by canonical symbol.
pub(crate) struct Generics {
    defs: HashMap<SymbolId, GenericDef>,
}

impl Generics {
    pub(crate) fn new() -> Self {
        Self {
            defs: HashMap::new(),
        }
    }
}

impl Runtime {
    /// Installs the behavior of `verb` for unquoted values of `heart`,
    /// replacing any earlier hook.
    pub fn register_generic_hook(&mut self, verb: SymbolId, heart: Heart, hook: GenericHook) {
        let verb = self.symbols.canonical(verb);
        self.generics.defs.entry(verb).or_default().hooks.insert(heart, hook);
    }

    /// Installs the behavior of `verb` for quoted values of any heart.
    pub fn register_generic_quoted_hook(&mut self, verb: SymbolId, hook: GenericHook) {
        let verb = self.symbols.canonical(verb);
        self.generics.defs.entry(verb).or_default().quoted = Some(hook);
    }

    /// The hook `verb` would run for `value`, if any. Synonym verbs
    /// share one definition through their canonical symbol.
    pub fn lookup_generic(&self, verb: SymbolId, value: &Cell) -> Option<GenericHook> {
        let def = self.generics.defs.get(&self.symbols.canonical(verb))?;
        if value.quote_level() > 0 {
            def.quoted
        } else {
            def.hooks.get(&value.heart()).copied()
        }
    }

    /// Builds the action form of a generic verb.
    ///
    /// The details array keeps the verb's word in slot 0; its dispatcher
    /// selects the hook from the first argument at call time, so hooks
    /// registered after the action exists are still found.
    pub fn make_generic(&mut self, verb: SymbolId, params: Vec<Param>) -> NodeId {
        debug_assert!(!params.is_empty(), "a generic verb dispatches on its first argument");
        let paramlist = self.make_paramlist(params);
        let details = self.make_action(paramlist, generic_dispatcher, 1);
        self.arena.details_mut(details).slots[0] = Cell::word(verb);
        details
    }
}

fn generic_dispatcher(
    rt: &mut Runtime,
    frame: &mut Frame,
) -> Result<DispatchSignal, RuntimeError> {
    let verb = rt
        .arena
        .details(frame.phase())
        .slots()
        .first()
        .and_then(Cell::as_word)
        .map(|word| word.symbol());
    let Some(verb) = verb else {
        debug_assert!(false, "generic details lost their verb slot");
        return Ok(DispatchSignal::Unhandled);
    };

    let subject = frame.arg(1);
    let Some(hook) = rt.lookup_generic(verb, subject) else {
        return Err(RuntimeError::UnhandledGeneric {
            verb: rt.spelling(verb),
            datatype: subject.type_name(),
        });
    };
    match hook(rt, frame)? {
        DispatchSignal::Unhandled => Err(RuntimeError::UnhandledGeneric {
            verb: rt.spelling(verb),
            datatype: frame.arg(1).type_name(),
        }),
        signal => Ok(signal),
    }
}
