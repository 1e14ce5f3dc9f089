use crate::source::Loc;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;

/// A jump target known by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// User label or `SUB` entry point.
    Label(String),
    /// Line following the `index`-th `CALL` of `sub`. Displayed as `sub_index`.
    Return { sub: String, index: u32 },
}

impl Symbol {
    pub fn label(name: &str) -> Self {
        Symbol::Label(name.to_string())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Label(name) => write!(f, "{}", name),
            Symbol::Return { sub, index } => write!(f, "{}_{}", sub, index),
        }
    }
}

// Symbol -> (line number, where it was defined)
#[derive(Debug, Default)]
pub struct Labels {
    names: IndexMap<Symbol, (u32, Loc)>,
    lines: BTreeMap<u32, Vec<Symbol>>,
}

impl Labels {
    pub fn new() -> Self {
        Labels {
            names: IndexMap::new(),
            lines: BTreeMap::new(),
        }
    }

    /// Bind `symbol` to `line`. A redefinition replaces the earlier binding,
    /// which is returned.
    pub fn insert(&mut self, symbol: Symbol, line: u32, loc: Loc) -> Option<(u32, Loc)> {
        let prev = self.names.insert(symbol.clone(), (line, loc));
        if let Some((old, _)) = &prev {
            if let Some(syms) = self.lines.get_mut(old) {
                syms.retain(|s| *s != symbol);
                if syms.is_empty() {
                    self.lines.remove(old);
                }
            }
        }
        self.lines.entry(line).or_default().push(symbol);
        prev
    }

    pub fn get(&self, symbol: &Symbol) -> Option<u32> {
        self.names.get(symbol).map(|(line, _)| *line)
    }

    pub fn contains_label(&self, name: &str) -> bool {
        self.names.contains_key(&Symbol::label(name))
    }

    /// First name bound to `line`.
    pub fn name_at(&self, line: u32) -> Option<&Symbol> {
        self.lines.get(&line).and_then(|syms| syms.first())
    }

    pub fn is_target(&self, line: u32) -> bool {
        self.lines.contains_key(&line)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Number of `CALL` sites seen so far for each subroutine.
#[derive(Debug, Default)]
pub struct CallSites(IndexMap<String, u32>);

impl CallSites {
    pub fn new() -> Self {
        CallSites(IndexMap::new())
    }

    /// Count one more call to `sub` and return its 1-based selector.
    pub fn next(&mut self, sub: &str) -> u32 {
        let count = self.0.entry(sub.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, sub: &str) -> u32 {
        self.0.get(sub).copied().unwrap_or(0)
    }
}
