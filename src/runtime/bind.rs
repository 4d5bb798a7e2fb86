use crate::{
    diagnostics::RuntimeError,
    heap::NodeId,
    runtime::{Frame, OrphanPolicy, Runtime},
    value::{Binding, Cell, CellFlags},
};

impl Runtime {
    /// Binds a word occurrence into a concrete context instance and
    /// caches the symbol's slot index.
    ///
    /// Fails without mutating the word when the symbol is absent from
    /// the context's keylist or the slot exceeds the 20-bit index
    /// budget. Success makes the occurrence a direct one: any virtual
    /// index is deleted.
    pub fn bind_specific(
        &mut self,
        cell: &mut Cell,
        context: NodeId,
    ) -> Result<usize, RuntimeError> {
        debug_assert!(self.arena.contains(context), "bind target was swept");
        let symbol = match cell.as_word() {
            Some(word) => word.symbol(),
            None => {
                debug_assert!(false, "bind_specific on a non-word cell");
                return Err(RuntimeError::BindingFailure {
                    word: cell.type_name().to_string(),
                });
            }
        };
        let index = self
            .context_find(context, symbol)
            .ok_or_else(|| RuntimeError::BindingFailure {
                word: self.spelling(symbol),
            })?;

        let unquoted = cell.quote_level() == 0;
        let word = cell.as_word_mut().expect("checked above");
        word.index_mut().set_physical(index)?;
        word.set_binding(Binding::Specific(context));
        if unquoted {
            word.index_mut().clear_mondex();
            cell.clear_flag(CellFlags::VIRTUAL_BIND);
        }
        Ok(index)
    }

    /// Binds a word occurrence to an action identity.
    ///
    /// The cached index is the symbol's slot in the action's paramlist;
    /// the storage it addresses is supplied per-invocation by a frame
    /// whose shape chain reaches the action.
    pub fn bind_relative(
        &mut self,
        cell: &mut Cell,
        action: NodeId,
    ) -> Result<usize, RuntimeError> {
        let symbol = match cell.as_word() {
            Some(word) => word.symbol(),
            None => {
                debug_assert!(false, "bind_relative on a non-word cell");
                return Err(RuntimeError::BindingFailure {
                    word: cell.type_name().to_string(),
                });
            }
        };
        let paramlist = self.paramlist_of(action);
        let index = self
            .paramlist_find(paramlist, symbol)
            .ok_or_else(|| RuntimeError::BindingFailure {
                word: self.spelling(symbol),
            })?;

        let word = cell.as_word_mut().expect("checked above");
        word.index_mut().set_physical(index)?;
        word.set_binding(Binding::Relative(action));
        Ok(index)
    }

    /// Installs a virtual index on an unquoted word occurrence and marks
    /// it virtually bound.
    ///
    /// Occurrences carrying quote levels are rejected: the virtual layer
    /// applies to unescaped occurrences only.
    pub fn set_mondex(&self, cell: &mut Cell, value: u32) -> Result<(), RuntimeError> {
        let (_, quotes) = cell.decode();
        let symbol = match cell.as_word() {
            Some(word) => word.symbol(),
            None => {
                debug_assert!(false, "set_mondex on a non-word cell");
                return Err(RuntimeError::MondexOnQuoted {
                    word: cell.type_name().to_string(),
                    quotes,
                });
            }
        };
        if quotes > 0 {
            return Err(RuntimeError::MondexOnQuoted {
                word: self.spelling(symbol),
                quotes,
            });
        }
        let word = cell.as_word_mut().expect("checked above");
        word.index_mut().set_mondex(value);
        cell.set_flag(CellFlags::VIRTUAL_BIND);
        Ok(())
    }

    /// Resolves a word occurrence to the cell its binding designates.
    ///
    /// Specific bindings read the cached slot of their context. Relative
    /// bindings need an active frame whose shape chain reaches the bound
    /// action; without one, the configured [`OrphanPolicy`] decides.
    pub fn resolve<'a>(
        &'a self,
        cell: &Cell,
        frame: Option<&'a Frame>,
    ) -> Result<&'a Cell, RuntimeError> {
        let word = cell.as_word().ok_or_else(|| RuntimeError::UnboundWord {
            word: cell.type_name().to_string(),
        })?;
        match word.binding() {
            Binding::Unbound => Err(RuntimeError::UnboundWord {
                word: self.spelling(word.symbol()),
            }),
            Binding::Specific(context) => {
                debug_assert!(self.arena.contains(context), "binding outlived its context");
                let index = word.physical_index() as usize;
                let node = self.arena.context(context);
                debug_assert!(index >= 1 && index <= node.vars().len());
                Ok(node.var(index))
            }
            Binding::Relative(action) => {
                if let Some(frame) = frame {
                    let target = self.paramlist_of(action);
                    if self.on_shape_chain(target, frame.shape()) {
                        return Ok(frame.arg(word.physical_index() as usize));
                    }
                }
                match self.orphan_policy {
                    OrphanPolicy::Error => Err(RuntimeError::OrphanRelative {
                        word: self.spelling(word.symbol()),
                    }),
                    OrphanPolicy::Fallback(context) => {
                        let index = self.context_find(context, word.symbol()).ok_or_else(|| {
                            RuntimeError::BindingFailure {
                                word: self.spelling(word.symbol()),
                            }
                        })?;
                        Ok(self.arena.context(context).var(index))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        heap::Param,
        value::{TypeSet, Word},
    };

    fn small_context(rt: &mut Runtime, names: &[&str]) -> NodeId {
        let params = names
            .iter()
            .map(|name| Param::normal(rt.symbols.intern(name), TypeSet::ANY))
            .collect();
        let keylist = rt.make_paramlist(params);
        rt.make_context(keylist)
    }

    #[test]
    fn bind_specific_caches_the_slot() {
        let mut rt = Runtime::new();
        let ctx = small_context(&mut rt, &["a", "b", "c"]);
        let b = rt.symbols.intern("b");
        let mut cell = Cell::word(b);

        let index = rt.bind_specific(&mut cell, ctx).unwrap();
        assert_eq!(index, 2);
        let word = cell.as_word().unwrap();
        assert_eq!(word.binding(), Binding::Specific(ctx));
        assert_eq!(word.physical_index(), 2);
    }

    #[test]
    fn failed_bind_leaves_the_word_untouched() {
        let mut rt = Runtime::new();
        let ctx = small_context(&mut rt, &["a"]);
        let missing = rt.symbols.intern("missing");
        let mut cell = Cell::word(missing);

        let err = rt.bind_specific(&mut cell, ctx).unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert_eq!(*cell.as_word().unwrap(), Word::new(missing));
    }

    #[test]
    fn resolve_reads_the_bound_slot() {
        let mut rt = Runtime::new();
        let ctx = small_context(&mut rt, &["a", "b"]);
        rt.context_set_var(ctx, 2, Cell::integer(17));

        let b = rt.symbols.intern("b");
        let mut cell = Cell::word(b);
        rt.bind_specific(&mut cell, ctx).unwrap();
        assert_eq!(rt.resolve(&cell, None).unwrap().as_integer(), Some(17));
    }

    #[test]
    fn resolving_an_unbound_word_is_an_error() {
        let mut rt = Runtime::new();
        let sym = rt.symbols.intern("loose");
        let cell = Cell::word(sym);
        let err = rt.resolve(&cell, None).unwrap_err();
        assert!(err.to_string().contains("unbound"));
    }

    #[test]
    fn mondex_rejected_on_quoted_occurrence() {
        let mut rt = Runtime::new();
        let sym = rt.symbols.intern("q");
        let mut cell = Cell::word(sym);
        cell.quote(1).unwrap();

        let err = rt.set_mondex(&mut cell, 7).unwrap_err();
        assert!(err.to_string().contains("quote level"));
        assert_eq!(cell.as_word().unwrap().mondex(), 0);
        assert!(!cell.flags().contains(CellFlags::VIRTUAL_BIND));
    }

    #[test]
    fn direct_rebind_deletes_the_mondex() {
        let mut rt = Runtime::new();
        let ctx = small_context(&mut rt, &["v"]);
        let v = rt.symbols.intern("v");
        let mut cell = Cell::word(v);

        rt.set_mondex(&mut cell, 70).unwrap();
        assert_eq!(cell.as_word().unwrap().mondex(), 70);
        assert!(cell.flags().contains(CellFlags::VIRTUAL_BIND));

        rt.bind_specific(&mut cell, ctx).unwrap();
        assert_eq!(cell.as_word().unwrap().mondex(), 0);
        assert!(!cell.flags().contains(CellFlags::VIRTUAL_BIND));
    }
}
