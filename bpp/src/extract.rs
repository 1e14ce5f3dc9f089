//! First pass: number lines, collect labels, lower `SUB`/`CALL`/`END SUB`.

use crate::error::{Error, Result};
use crate::ir::{Line, Part};
use crate::label::{CallSites, Labels, Symbol};
use crate::lower::{self, Convention};
use crate::scan::{self, Kw, Token};
use crate::source::{Loc, Stmt};
use log::{debug, warn};

// ----------------------------------------------------------------------------
// Statement forms

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Form<'a> {
    /// `name:`
    Label(&'a str),
    /// `SUB name`
    Sub(&'a str),
    /// `END SUB`
    EndSub,
    /// `<prefix>CALL name`
    Call { prefix: &'a str, name: &'a str },
    Plain,
}

impl<'a> Form<'a> {
    pub fn parse(text: &'a str, loc: &Loc) -> Result<Form<'a>> {
        let trimmed = text.trim();

        // main:
        if let Some(name) = trimmed.strip_suffix(':') {
            let bad = |c: char| c.is_whitespace() || c == ':' || c == '"';
            if !name.is_empty() && !name.contains(bad) {
                return Ok(Form::Label(name));
            }
        }

        let words: Vec<&str> = trimmed.split_whitespace().collect();
        if let [head, arg] = words.as_slice() {
            match head.parse::<Kw>() {
                Ok(Kw::Sub) => return Ok(Form::Sub(*arg)),
                Ok(Kw::End) if *arg == Kw::Sub.as_str() => return Ok(Form::EndSub),
                _ => {}
            }
        }

        Form::call(text, loc)
    }

    fn call(text: &'a str, loc: &Loc) -> Result<Form<'a>> {
        let tokens = scan::scan(text);
        let mut call = None;
        for (idx, token) in tokens.iter().enumerate() {
            if let Token::Word(at, Kw::Call) = token {
                // Calls must be line-terminal
                if tokens[idx..].iter().any(|t| matches!(t, Token::Sep(_))) {
                    return Err(Error::MalformedCallSite(loc.clone()));
                }
                call = Some(*at);
            }
        }
        let at = match call {
            Some(at) => at,
            None => return Ok(Form::Plain),
        };
        let operand: Vec<&str> = text[at + Kw::Call.as_str().len()..]
            .split_whitespace()
            .collect();
        match operand.as_slice() {
            [name] => Ok(Form::Call {
                prefix: &text[..at],
                name: *name,
            }),
            _ => Err(Error::MalformedCallSite(loc.clone())),
        }
    }
}

// ----------------------------------------------------------------------------
// Extractor

#[derive(Debug)]
pub struct Extracted {
    pub lines: Vec<Line>,
    pub labels: Labels,
}

pub fn extract(stmts: &[Stmt], conv: &dyn Convention) -> Result<Extracted> {
    let mut extractor = Extractor::new(conv);
    for stmt in stmts {
        extractor.stmt(stmt)?;
    }
    Ok(extractor.finish())
}

struct Extractor<'c> {
    conv: &'c dyn Convention,
    lines: Vec<Line>,
    labels: Labels,
    calls: CallSites,
    open: Option<(String, Loc)>,
    // (index into lines, subroutine) of each END SUB, filled in by finish()
    dispatches: Vec<(usize, String)>,
}

impl<'c> Extractor<'c> {
    fn new(conv: &'c dyn Convention) -> Self {
        Extractor {
            conv,
            lines: vec![],
            labels: Labels::new(),
            calls: CallSites::new(),
            open: None,
            dispatches: vec![],
        }
    }

    fn next_number(&self) -> u32 {
        self.lines.len() as u32 + 1
    }

    fn emit(&mut self, parts: Vec<Part>, loc: &Loc) -> u32 {
        let number = self.next_number();
        self.lines.push(Line {
            number,
            parts,
            loc: loc.clone(),
        });
        number
    }

    fn define(&mut self, symbol: Symbol, line: u32, loc: &Loc) {
        if let Some((_, prev)) = self.labels.insert(symbol.clone(), line, loc.clone()) {
            warn!(
                "Re-defined label `{}` at {} (already defined at {}); the later definition wins",
                symbol, loc, prev
            );
        }
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<()> {
        let loc = &stmt.loc;
        match Form::parse(&stmt.text, loc)? {
            Form::Label(name) => {
                self.define(Symbol::label(name), self.next_number(), loc);
            }
            Form::Sub(name) => {
                if self.open.is_some() {
                    return Err(Error::NestedSub(name.to_string(), loc.clone()));
                }
                self.define(Symbol::label(name), self.next_number(), loc);
                self.open = Some((name.to_string(), loc.clone()));
            }
            Form::EndSub => {
                let (sub, _) = self
                    .open
                    .take()
                    .ok_or_else(|| Error::UnmatchedEndSub(loc.clone()))?;
                self.dispatches.push((self.lines.len(), sub));
                self.emit(vec![], loc);
            }
            Form::Call { prefix, name } => {
                let selector = self.calls.next(name);
                let call = format!("{}{}", prefix, self.conv.call(selector, name));
                self.emit(vec![Part::Raw(call)], loc);
                let ret = self.emit(vec![Part::Text(self.conv.ret())], loc);
                let symbol = Symbol::Return {
                    sub: name.to_string(),
                    index: selector,
                };
                self.define(symbol, ret, loc);
            }
            Form::Plain => {
                self.emit(vec![Part::Raw(stmt.text.clone())], loc);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Extracted {
        if let Some((sub, loc)) = &self.open {
            warn!("SUB `{}` opened at {} is never closed", sub, loc);
        }
        for (idx, sub) in std::mem::take(&mut self.dispatches) {
            let calls = self.calls.count(&sub);
            let line = &mut self.lines[idx];
            line.parts = match lower::dispatch(self.conv, &sub, calls) {
                Some(parts) => parts,
                None => {
                    warn!("SUB `{}` is never called; its END SUB falls through", sub);
                    vec![Part::Text(self.conv.nop())]
                }
            };
        }
        debug!(
            "Extracted {} lines, {} labels",
            self.lines.len(),
            self.labels.len()
        );
        Extracted {
            lines: self.lines,
            labels: self.labels,
        }
    }
}
