//! The dispatch protocol: frame construction, entry typechecking, and
//! the phase loop.

use crate::{
    diagnostics::RuntimeError,
    heap::{DetailsFlags, NodeId, ParamClass, Specialty},
    runtime::{DispatchState, Frame, Runtime},
    symbols::SymbolId,
    value::{Cell, CellFlags, Heart},
};

/// The behavior function of a details array.
///
/// A dispatcher reads and writes the frame it is handed and reports how
/// the invocation proceeds through its returned signal. It must not
/// assume the frame was built for its own paramlist, only for a
/// descendant shape.
pub type Dispatcher = fn(&mut Runtime, &mut Frame) -> Result<DispatchSignal, RuntimeError>;

/// What a dispatcher tells the dispatch loop.
#[derive(Debug)]
pub enum DispatchSignal {
    /// The invocation produced this value.
    Done(Cell),
    /// The invocation raised this value; it propagates without being a
    /// host error.
    Thrown(Cell),
    /// Re-enter the loop at another phase of the same frame. The target
    /// phase's paramlist must lie on the frame's shape chain.
    Redo {
        phase: NodeId,
        /// Whether the target phase re-runs entry typechecking before
        /// its dispatcher sees the frame.
        recheck: bool,
    },
    /// This phase has no behavior for the arguments.
    Unhandled,
}

/// The terminal result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Value(Cell),
    Thrown(Cell),
}

impl Runtime {
    /// Lays out a frame for invoking `action` with the caller-supplied
    /// arguments.
    ///
    /// Supplied cells fill the callable parameter slots in paramlist
    /// order. Locals are never supplied, and slots a specialization
    /// pre-fills from its exemplar are skipped too; supplying a wrong
    /// count is an arity error before any dispatcher runs.
    pub fn make_frame(&self, action: &Cell, supplied: Vec<Cell>) -> Result<Frame, RuntimeError> {
        let payload = action.as_action().ok_or_else(|| RuntimeError::Unhandled {
            operation: "dispatch".to_string(),
            datatype: action.type_name(),
        })?;
        let details = payload.details();
        let shape = self.paramlist_of(details);

        let prefilled = match self.arena.details(details).specialty() {
            Specialty::Exemplar(context) => Some(self.arena.context(context).vars()),
            Specialty::Paramlist(_) => None,
        };
        let params = self.arena.paramlist(shape).params();

        let mut args = vec![Cell::null(); params.len()];
        let mut pending = supplied.into_iter();
        let mut want = 0usize;
        let mut got = 0usize;
        for (slot, param) in params.iter().enumerate() {
            if param.class == ParamClass::Local {
                continue;
            }
            if let Some(vars) = prefilled {
                if !vars[slot].flags().contains(CellFlags::UNSPECIALIZED) {
                    continue;
                }
            }
            want += 1;
            if let Some(value) = pending.next() {
                args[slot] = value;
                got += 1;
            }
        }
        got += pending.count();
        if want != got {
            return Err(RuntimeError::ArityMismatch {
                label: self.label_for(payload.label(), details),
                want,
                got,
            });
        }
        Ok(Frame::new(details, shape, args, payload.label()))
    }

    /// Runs `frame` to its terminal outcome.
    ///
    /// Typechecking happens on entry unless the initial phase defers it,
    /// and again on any redo that asks for a recheck. A `Redo` whose
    /// target paramlist is off the frame's shape chain is a dispatcher
    /// bug and surfaces as an error.
    pub fn dispatch(&mut self, frame: &mut Frame) -> Result<DispatchOutcome, RuntimeError> {
        let mut recheck = !self
            .arena
            .details(frame.phase)
            .flags()
            .contains(DetailsFlags::DEFERS_TYPECHECK);
        loop {
            if recheck {
                frame.state = DispatchState::TypeChecking;
                self.typecheck(frame)?;
            }
            frame.state = DispatchState::Dispatching;
            let dispatcher = self.arena.details(frame.phase).dispatcher();
            if self.trace {
                eprintln!(
                    "[rell] dispatch phase={} label=`{}` recheck={}",
                    frame.phase.as_u32(),
                    self.frame_label(frame),
                    recheck,
                );
            }
            match dispatcher(self, frame)? {
                DispatchSignal::Done(value) => {
                    frame.out = value;
                    frame.out.clear_flag(CellFlags::STALE);
                    return Ok(DispatchOutcome::Value(frame.out.clone()));
                }
                DispatchSignal::Thrown(value) => return Ok(DispatchOutcome::Thrown(value)),
                DispatchSignal::Redo {
                    phase,
                    recheck: again,
                } => {
                    if !self.on_shape_chain(self.paramlist_of(phase), frame.shape) {
                        debug_assert!(
                            false,
                            "redo target is off the frame's shape chain",
                        );
                        return Err(RuntimeError::IncompatiblePhase {
                            label: self.action_name(phase),
                        });
                    }
                    frame.phase = phase;
                    frame.state = DispatchState::InitialEntry;
                    recheck = again;
                }
                DispatchSignal::Unhandled => {
                    return Err(RuntimeError::Unhandled {
                        operation: self.frame_label(frame),
                        datatype: frame.args().first().map_or("null", Cell::type_name),
                    });
                }
            }
        }
    }

    /// Builds a frame for `action` and runs it in one step.
    pub fn invoke(
        &mut self,
        action: &Cell,
        supplied: Vec<Cell>,
    ) -> Result<DispatchOutcome, RuntimeError> {
        let mut frame = self.make_frame(action, supplied)?;
        self.dispatch(&mut frame)
    }

    /// Checks the frame's arguments against the current phase's
    /// paramlist, leaving `cursor` at the offending slot on failure.
    fn typecheck(&self, frame: &mut Frame) -> Result<(), RuntimeError> {
        let paramlist = self.paramlist_of(frame.phase);
        let params = self.arena.paramlist(paramlist).params();
        frame.cursor = 0;
        while frame.cursor < params.len() {
            let param = &params[frame.cursor];
            let arg = frame.arg(frame.cursor + 1);
            match param.class {
                ParamClass::Local => {
                    if arg.decode() != (Heart::Null, 0) {
                        return Err(RuntimeError::LocalNotUnset {
                            label: self.frame_label(frame),
                            param: self.spelling(param.symbol),
                        });
                    }
                }
                ParamClass::Normal | ParamClass::Quoted => {
                    if !param.accepts.admits(arg.kind()) {
                        return Err(RuntimeError::TypeMismatch {
                            label: self.frame_label(frame),
                            param: self.spelling(param.symbol),
                            found: arg.type_name(),
                        });
                    }
                }
            }
            frame.cursor += 1;
        }
        Ok(())
    }

    fn frame_label(&self, frame: &Frame) -> String {
        self.label_for(frame.label, frame.phase)
    }

    fn label_for(&self, label: Option<SymbolId>, details: NodeId) -> String {
        match label {
            Some(symbol) => self.spelling(symbol),
            None => self.action_name(details),
        }
    }
}
