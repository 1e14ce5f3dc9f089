//! Jump operands: binding source text to targets, and rendering targets back
//! to line numbers.
//!
//! An operand is recognised after `THEN`, `GOTO` and `GOSUB`, and in every
//! element of the target list of `ON ... GOTO`/`ON ... GOSUB`. Operands end at
//! a blank, `:` or `,`, so a label never matches part of a longer name.

use crate::error::{Error, Result};
use crate::ir::{Line, Output, Part, Target};
use crate::label::{Labels, Symbol};
use crate::pack::RenumberMap;
use crate::scan::{self, Kw, Token};
use crate::source::Loc;
use log::{debug, warn};

/// Bind the jump operands of every `Part::Raw` in `lines`.
pub fn bind(lines: Vec<Line>, labels: &Labels, keep_unresolved: bool) -> Result<Vec<Line>> {
    let binder = Binder {
        labels,
        keep_unresolved,
    };
    let mut bound = Vec::with_capacity(lines.len());
    for line in lines {
        let mut parts = vec![];
        for part in line.parts {
            match part {
                Part::Raw(text) => parts.extend(binder.text(&text, &line.loc)?),
                other => parts.push(other),
            }
        }
        bound.push(Line { parts, ..line });
    }
    Ok(bound)
}

struct Binder<'a> {
    labels: &'a Labels,
    keep_unresolved: bool,
}

impl<'a> Binder<'a> {
    fn text(&self, text: &str, loc: &Loc) -> Result<Vec<Part>> {
        let mut parts = vec![];
        // text[pos..] has not been copied into parts yet
        let mut pos = 0;
        let mut on = false;
        for token in scan::scan(text) {
            match token {
                Token::Sep(_) => on = false,
                Token::Word(_, Kw::On) => on = true,
                Token::Word(at, kw @ (Kw::Then | Kw::Goto | Kw::Gosub)) if at >= pos => {
                    let list = on && kw != Kw::Then;
                    let mut cur = at + kw.as_str().len();
                    loop {
                        let start = cur + blanks(&text[cur..]);
                        let end = start + operand_len(&text[start..]);
                        if start == end {
                            break;
                        }
                        match self.operand(kw, &text[start..end], loc)? {
                            Some(target) => {
                                push_text(&mut parts, &text[pos..start]);
                                parts.push(Part::Jump(target));
                                pos = end;
                            }
                            None if kw == Kw::Then => break,
                            None => {}
                        }
                        cur = end + blanks(&text[end..]);
                        if !list || !text[cur..].starts_with(',') {
                            break;
                        }
                        cur += 1;
                    }
                }
                _ => {}
            }
        }
        push_text(&mut parts, &text[pos..]);
        Ok(parts)
    }

    fn operand(&self, kw: Kw, name: &str, loc: &Loc) -> Result<Option<Target>> {
        if name.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = name.parse::<u32>() {
                return Ok(Some(Target::Line(n)));
            }
        }
        if self.labels.contains_label(name) {
            return Ok(Some(Target::Symbol(Symbol::label(name))));
        }
        if kw == Kw::Then {
            // THEN followed by a statement
            return Ok(None);
        }
        if self.keep_unresolved {
            warn!("Undefined label `{}` at {} left as is", name, loc);
            return Ok(None);
        }
        Err(Error::UndefinedLabel(name.to_string(), loc.clone()))
    }
}

fn blanks(s: &str) -> usize {
    s.len() - s.trim_start_matches([' ', '\t']).len()
}

fn operand_len(s: &str) -> usize {
    s.find(|c: char| c.is_whitespace() || c == ':' || c == ',' || c == '"')
        .unwrap_or(s.len())
}

fn push_text(parts: &mut Vec<Part>, s: &str) {
    if s.is_empty() {
        return;
    }
    if let Some(Part::Text(prev)) = parts.last_mut() {
        prev.push_str(s);
    } else {
        parts.push(Part::text(s));
    }
}

/// Render `line` to text, numbering each target with `number`. Targets
/// `number` cannot place are an error, or kept as written with
/// `keep_unresolved`.
pub fn render(
    line: &Line,
    number: impl Fn(&Target) -> Option<u32>,
    keep_unresolved: bool,
) -> Result<String> {
    let mut out = String::new();
    for part in &line.parts {
        match part {
            Part::Raw(s) | Part::Text(s) => out.push_str(s),
            Part::Jump(target) => match number(target) {
                Some(n) => out.push_str(&n.to_string()),
                None if keep_unresolved => out.push_str(&target.to_string()),
                None => return Err(unresolved(target, &line.loc)),
            },
        }
    }
    Ok(out)
}

fn unresolved(target: &Target, loc: &Loc) -> Error {
    match target {
        Target::Symbol(sym) => Error::DanglingLabel(sym.to_string(), loc.clone()),
        Target::Line(n) => Error::UndefinedLine(*n, loc.clone()),
    }
}

/// Extraction number of `target`.
pub fn provisional(labels: &Labels, target: &Target) -> Option<u32> {
    match target {
        Target::Symbol(sym) => labels.get(sym),
        Target::Line(n) => Some(*n),
    }
}

/// Resolve every target of `lines` against the final numbering.
pub fn propagate(
    lines: &[Line],
    labels: &Labels,
    renumber: &RenumberMap,
    keep_unresolved: bool,
) -> Result<Vec<Output>> {
    let number = |t: &Target| provisional(labels, t).and_then(|old| renumber.new_of(old));
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        out.push(Output {
            number: line.number,
            text: render(line, number, keep_unresolved)?,
            origin: renumber.old_of(line.number).unwrap_or(line.number),
            loc: line.loc.clone(),
        });
    }
    debug!("Resolved {} lines against {} renumbered targets", out.len(), renumber.len());
    Ok(out)
}
