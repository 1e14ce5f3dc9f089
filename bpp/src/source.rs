use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::fmt;
use std::io::BufRead;

/// Origin of a statement: file name and zero-based line index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Loc {
    pub file: String,
    pub line: usize,
}

impl Loc {
    pub fn new(file: &str, line: usize) -> Self {
        Loc {
            file: file.to_string(),
            line,
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line + 1)
    }
}

/// One logical line of BASIC source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub text: String,
    pub loc: Loc,
}

impl Stmt {
    pub fn new(text: &str, loc: Loc) -> Self {
        Stmt {
            text: text.to_string(),
            loc,
        }
    }

    /// Same origin, different text.
    pub fn with_text(&self, text: &str) -> Self {
        Stmt::new(text, self.loc.clone())
    }

    /// Split an in-memory program into statements attributed to `file`.
    pub fn lines(file: &str, text: &str) -> Vec<Stmt> {
        text.lines()
            .enumerate()
            .map(|(idx, line)| Stmt::new(line.trim_end(), Loc::new(file, idx)))
            .collect()
    }
}

/// Raw lines of every file read during a run, kept for diagnostics.
#[derive(Debug, Default)]
pub struct Sources {
    files: IndexMap<String, Vec<String>>,
}

impl Sources {
    pub fn new() -> Self {
        Sources {
            files: IndexMap::new(),
        }
    }

    /// Read `path` from disk and return its statements.
    pub fn load(&mut self, path: &str) -> Result<Vec<Stmt>> {
        if !self.files.contains_key(path) {
            let file =
                std::fs::File::open(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;
            let mut lines = vec![];
            for raw in std::io::BufReader::new(file).lines() {
                let raw = raw.map_err(|e| Error::FileRead(path.to_string(), e))?;
                lines.push(raw.trim_end().to_string());
            }
            self.files.insert(path.to_string(), lines);
        }
        Ok(self.stmts(path))
    }

    /// Register an in-memory file under `name` and return its statements.
    pub fn insert(&mut self, name: &str, text: &str) -> Vec<Stmt> {
        let lines = text.lines().map(|l| l.trim_end().to_string()).collect();
        self.files.insert(name.to_string(), lines);
        self.stmts(name)
    }

    pub fn line(&self, loc: &Loc) -> Option<&str> {
        self.files
            .get(&loc.file)
            .and_then(|lines| lines.get(loc.line))
            .map(|s| s.as_str())
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|k| k.as_str())
    }

    fn stmts(&self, name: &str) -> Vec<Stmt> {
        self.files
            .get(name)
            .map(|lines| {
                lines
                    .iter()
                    .enumerate()
                    .map(|(idx, line)| Stmt::new(line, Loc::new(name, idx)))
                    .collect()
            })
            .unwrap_or_default()
    }
}
