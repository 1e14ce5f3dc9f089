//! Greedy line packing.
//!
//! Consecutive lines are joined with `:` while the combined line stays under
//! the column budget. A jump target or a `FOR` must start a physical line,
//! and nothing may follow `GOTO`, `THEN` or `RETURN` on one.

use crate::error::Result;
use crate::ir::{Line, Part, Target};
use crate::label::Labels;
use crate::resolve;
use crate::scan::{self, Kw};
use bimap::BiMap;
use log::debug;
use std::collections::BTreeSet;

pub const DEFAULT_WIDTH: usize = 88;

/// Old line number <-> new line number, for the first source line of every
/// output line.
#[derive(Debug, Default)]
pub struct RenumberMap(BiMap<u32, u32>);

impl RenumberMap {
    pub fn new() -> Self {
        RenumberMap(BiMap::new())
    }

    /// Every line keeps its number.
    pub fn identity(lines: &[Line]) -> Self {
        let mut map = RenumberMap::new();
        for line in lines {
            map.insert(line.number, line.number);
        }
        map
    }

    pub fn insert(&mut self, old: u32, new: u32) {
        self.0.insert(old, new);
    }

    pub fn new_of(&self, old: u32) -> Option<u32> {
        self.0.get_by_left(&old).copied()
    }

    pub fn old_of(&self, new: u32) -> Option<u32> {
        self.0.get_by_right(&new).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct Acc {
    // "<number> <text>" as rendered with extraction numbers
    text: String,
    line: Line,
}

struct Packer {
    width: usize,
    out: Vec<Line>,
    renumber: RenumberMap,
    acc: Option<Acc>,
}

impl Packer {
    fn flush(&mut self) {
        if let Some(acc) = self.acc.take() {
            self.out.push(acc.line);
        }
    }

    fn start(&mut self, line: &Line, text: &str) {
        self.flush();
        let number = self.out.len() as u32 + 1;
        self.renumber.insert(line.number, number);
        self.acc = Some(Acc {
            text: format!("{} {}", number, text),
            line: Line {
                number,
                parts: line.parts.clone(),
                loc: line.loc.clone(),
            },
        });
    }

    /// Append `line` to the accumulator if it fits.
    fn append(&mut self, line: &Line, text: &str) -> bool {
        let acc = match &mut self.acc {
            Some(acc) => acc,
            None => return false,
        };
        if acc.text.chars().count() + 1 + text.chars().count() >= self.width {
            return false;
        }
        acc.text.push(':');
        acc.text.push_str(text);
        acc.line.parts.push(Part::text(":"));
        acc.line.parts.extend(line.parts.iter().cloned());
        true
    }
}

/// Pack `lines` and number the result from 1.
///
/// Budget checks use the text rendered with extraction numbers. Every output
/// line starts at a source line at least as far down, so its final number is
/// never larger and renumbering never makes a line longer. A label bound past
/// the last line is measured by its name, which is how it is kept.
pub fn pack(lines: &[Line], labels: &Labels, width: usize) -> Result<(Vec<Line>, RenumberMap)> {
    let mut numeric = BTreeSet::new();
    for line in lines {
        for jump in line.jumps() {
            if let Target::Line(n) = jump {
                numeric.insert(*n);
            }
        }
    }
    let last = lines.last().map_or(0, |line| line.number);
    let number = |t: &Target| resolve::provisional(labels, t).filter(|n| *n <= last);

    let mut packer = Packer {
        width,
        out: vec![],
        renumber: RenumberMap::new(),
        acc: None,
    };

    for line in lines {
        let text = resolve::render(line, number, true)?;
        let fresh = match &packer.acc {
            None => true,
            // Jump targets and loop heads begin their own line, and
            // GOTO/THEN/RETURN end one
            Some(acc) => {
                labels.is_target(line.number)
                    || numeric.contains(&line.number)
                    || scan::begins_with(&text, Kw::For)
                    || scan::has_terminal(&acc.text)
            }
        };
        if fresh || !packer.append(line, &text) {
            packer.start(line, &text);
        } else if scan::has_terminal(&text) {
            packer.flush();
        }
    }
    packer.flush();

    debug!(
        "Packed {} lines into {} (budget {})",
        lines.len(),
        packer.out.len(),
        width
    );
    Ok((packer.out, packer.renumber))
}
