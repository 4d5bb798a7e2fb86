use std::{
    collections::HashMap,
    hash::{BuildHasher, Hash, Hasher, RandomState},
};

use crate::{diagnostics::RuntimeError, symbols::symbol::SymbolId};

struct Entry {
    start: usize,
    end: usize,
    /// Synonym link. A canonical symbol links to itself; a case-variant
    /// links toward its chain's canonical terminator.
    synonym: SymbolId,
    canonical: bool,
}

/// A string interner with synonym chains.
///
/// Unique spellings are stored once in a contiguous buffer and addressed
/// by [`SymbolId`]; interning the same bytes twice yields the identical
/// id. The table is owned by the runtime that created it, never a
/// process-wide global, and is torn down with it.
///
/// # Example
///
/// ```
/// use rell::symbols::SymbolTable;
///
/// let mut symbols = SymbolTable::new();
/// let a = symbols.intern("append");
/// let b = symbols.intern("append");
/// let c = symbols.intern("insert");
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// assert_eq!(symbols.resolve(a), "append");
/// ```
pub struct SymbolTable {
    hasher: RandomState,
    buckets: HashMap<u64, Vec<SymbolId>>,
    entries: Vec<Entry>,
    storage: String,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self {
            hasher: RandomState::new(),
            buckets: HashMap::default(),
            entries: Vec::new(),
            storage: String::new(),
        }
    }

    /// Creates a table with pre-allocated capacity for `symbols` unique
    /// spellings totalling `storage_bytes` bytes.
    pub fn with_capacity(symbols: usize, storage_bytes: usize) -> Self {
        Self {
            hasher: RandomState::new(),
            buckets: HashMap::with_capacity(symbols),
            entries: Vec::with_capacity(symbols),
            storage: String::with_capacity(storage_bytes),
        }
    }

    /// Reserves capacity for additional symbols and storage bytes.
    pub fn reserve(&mut self, symbols: usize, storage_bytes: usize) {
        self.buckets.reserve(symbols);
        self.entries.reserve(symbols);
        self.storage.reserve(storage_bytes);
    }

    /// Returns the number of unique spellings interned so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no spelling has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interns a spelling and returns its symbol id.
    ///
    /// If the exact byte sequence has been interned before, the existing
    /// id is returned. A freshly created symbol starts out canonical,
    /// linking to itself.
    ///
    /// # Panics
    ///
    /// Panics if the number of unique symbols exceeds `u32::MAX`.
    pub fn intern(&mut self, spelling: &str) -> SymbolId {
        let hash = self.hash_str(spelling);
        if let Some(candidates) = self.buckets.get(&hash) {
            for candidate in candidates {
                if self.resolve(*candidate) == spelling {
                    return *candidate;
                }
            }
        }

        let index = self.entries.len();
        assert!(
            index <= u32::MAX as usize,
            "symbol table overflow: cannot intern more than {} unique spellings",
            u32::MAX
        );
        let sym = SymbolId::new(index as u32);

        let start = self.storage.len();
        self.storage.push_str(spelling);
        let end = self.storage.len();

        self.entries.push(Entry {
            start,
            end,
            synonym: sym,
            canonical: true,
        });
        self.buckets.entry(hash).or_default().push(sym);
        sym
    }

    /// Resolves a symbol id to its spelling.
    ///
    /// # Panics
    ///
    /// Panics if the id was not created by this table. This is a
    /// programming error that should never occur in correct code.
    #[inline]
    pub fn resolve(&self, sym: SymbolId) -> &str {
        self.try_resolve(sym)
            .unwrap_or_else(|| panic!("invalid symbol: {:?}", sym))
    }

    /// Attempts to resolve a symbol id to its spelling.
    ///
    /// Returns `None` if the id was not created by this table.
    pub fn try_resolve(&self, sym: SymbolId) -> Option<&str> {
        let entry = self.entries.get(sym.as_u32() as usize)?;
        self.storage.get(entry.start..entry.end)
    }

    /// Returns the canonical representative of `sym`'s synonym class.
    ///
    /// A canonical symbol is its own representative. Chains are acyclic
    /// apart from the canonical terminator's self-link, so the walk
    /// always ends.
    pub fn canonical(&self, sym: SymbolId) -> SymbolId {
        let mut current = sym;
        loop {
            let entry = &self.entries[current.as_u32() as usize];
            if entry.canonical || entry.synonym == current {
                return current;
            }
            current = entry.synonym;
        }
    }

    /// Returns `true` if `sym` is the canonical representative of its
    /// synonym class.
    pub fn is_canonical(&self, sym: SymbolId) -> bool {
        self.entries[sym.as_u32() as usize].canonical
    }

    /// Links `variant` into the synonym chain anchored at `canonical`.
    ///
    /// Intended for alternate-case spellings of one logical name; the
    /// caller decides which spellings belong together. The variant loses
    /// its canonical status and points at `canonical`'s chain.
    ///
    /// Fails without modifying the table when `canonical` is not itself
    /// a canonical symbol, or when the link would close a cycle.
    pub fn register_synonym(
        &mut self,
        variant: SymbolId,
        canonical: SymbolId,
    ) -> Result<(), RuntimeError> {
        if variant == canonical {
            return Ok(());
        }
        if !self.is_canonical(canonical) {
            return Err(RuntimeError::SynonymTarget {
                variant: self.resolve(variant).to_string(),
                target: self.resolve(canonical).to_string(),
            });
        }
        if self.canonical(canonical) == self.canonical(variant) && !self.is_canonical(variant) {
            // Already on the same chain; relinking would be a no-op.
            return Ok(());
        }
        let entry = &mut self.entries[variant.as_u32() as usize];
        entry.synonym = canonical;
        entry.canonical = false;
        Ok(())
    }

    fn hash_str(&self, s: &str) -> u64 {
        let mut h = self.hasher.build_hasher();
        s.hash(&mut h);
        h.finish()
    }
}
