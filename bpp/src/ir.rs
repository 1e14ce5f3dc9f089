//! Lowered program: numbered lines whose jump operands are still symbolic.

use crate::label::{Labels, Symbol};
use crate::pack::RenumberMap;
use crate::source::Loc;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Symbol(Symbol),
    /// Numeric operand, in extraction numbering.
    Line(u32),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Symbol(sym) => write!(f, "{}", sym),
            Target::Line(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Source text whose jump operands have not been bound yet.
    Raw(String),
    Text(String),
    Jump(Target),
}

impl Part {
    pub fn text(s: &str) -> Self {
        Part::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: u32,
    pub parts: Vec<Part>,
    pub loc: Loc,
}

impl Line {
    pub fn jumps(&self) -> impl Iterator<Item = &Target> {
        self.parts.iter().filter_map(|p| match p {
            Part::Jump(target) => Some(target),
            _ => None,
        })
    }
}

/// One line of final output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub number: u32,
    pub text: String,
    /// Extraction number of the first source line packed into this one.
    pub origin: u32,
    pub loc: Loc,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.text)
    }
}

#[derive(Debug)]
pub struct Program {
    pub lines: Vec<Output>,
    pub labels: Labels,
    pub renumber: RenumberMap,
}

impl Program {
    pub fn text_lines(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.to_string()).collect()
    }
}
