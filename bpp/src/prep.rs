//! Line filters run ahead of the numbering core.

use crate::config::{Mode, Options};
use crate::error::Result;
use crate::scan::{self, Kw};
use crate::source::{Sources, Stmt};
use indexmap::IndexSet;
use log::{debug, info};

/// Apply every filter `opts` enables, in order.
pub fn run(sources: &mut Sources, stmts: Vec<Stmt>, opts: &Options) -> Result<Vec<Stmt>> {
    info!("Original lines: {}", stmts.len());

    let mut stmts = resolve_includes(sources, stmts, opts.keep_rems)?;
    info!("Lines after includes: {}", stmts.len());

    stmts = resolve_mode(stmts, opts.mode);
    info!("Lines after resolving mode specific lines: {}", stmts.len());

    if !opts.keep_blank_lines {
        stmts = drop_blank_lines(stmts);
        info!("Lines after dropping blank lines: {}", stmts.len());
    }
    if !opts.keep_rems {
        stmts = drop_rems(stmts);
        info!("Lines after dropping REMs: {}", stmts.len());
    }
    if !opts.keep_indent {
        stmts = remove_indent(stmts);
    }
    if !opts.skip_misc_fixups {
        stmts = misc_fixups(stmts);
    }
    Ok(stmts)
}

// ----------------------------------------------------------------------------
// Includes

/// File named by `REM $INCLUDE: 'file'`.
fn include_target(text: &str) -> Option<&str> {
    let quoted = text
        .trim_start_matches(' ')
        .strip_prefix("REM $INCLUDE: '")?
        .trim_end_matches(' ')
        .strip_suffix('\'')?;
    if quoted.contains('\'') {
        None
    } else {
        Some(quoted)
    }
}

/// Replace include directives with the lines of the named file, recursively.
/// A file is included at most once; later directives for it stay in place.
pub fn resolve_includes(
    sources: &mut Sources,
    stmts: Vec<Stmt>,
    keep_rems: bool,
) -> Result<Vec<Stmt>> {
    let mut included = IndexSet::new();
    include_into(sources, stmts, keep_rems, &mut included)
}

fn include_into(
    sources: &mut Sources,
    stmts: Vec<Stmt>,
    keep_rems: bool,
    included: &mut IndexSet<String>,
) -> Result<Vec<Stmt>> {
    let mut out = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        let file = match include_target(&stmt.text) {
            Some(file) => file.to_string(),
            None => {
                out.push(stmt);
                continue;
            }
        };
        if !included.insert(file.clone()) {
            debug!("Ignoring already included file: {} ({})", file, stmt.loc);
            out.push(stmt);
            continue;
        }
        let body = sources.load(&file)?;
        let body = include_into(sources, body, keep_rems, included)?;
        if keep_rems {
            out.push(stmt.with_text(&format!("REM vvv BEGIN '{}' vvv", file)));
        }
        out.extend(body);
        if keep_rems {
            out.push(stmt.with_text(&format!("REM ^^^ END '{}' ^^^", file)));
        }
    }
    Ok(out)
}

// ----------------------------------------------------------------------------
// Filters

/// `#<tag> <text>` keeps `<text>` when `<tag>` names `mode`, and is dropped
/// otherwise.
pub fn resolve_mode(stmts: Vec<Stmt>, mode: Mode) -> Vec<Stmt> {
    let tag = mode.to_string();
    stmts
        .into_iter()
        .filter_map(|stmt| {
            let tagged = stmt
                .text
                .trim_start_matches(' ')
                .strip_prefix('#')
                .and_then(|rest| rest.split_once(' '));
            match tagged {
                Some((t, body)) if t == tag => Some(stmt.with_text(body)),
                Some(_) => None,
                None => Some(stmt),
            }
        })
        .collect()
}

/// Drop lines without a single word character.
pub fn drop_blank_lines(stmts: Vec<Stmt>) -> Vec<Stmt> {
    stmts
        .into_iter()
        .filter(|stmt| stmt.text.chars().any(|c| c.is_alphanumeric() || c == '_'))
        .collect()
}

/// Drop comment lines and cut trailing `: REM ...` comments.
pub fn drop_rems(stmts: Vec<Stmt>) -> Vec<Stmt> {
    let mut out = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        if stmt.text.trim_start_matches(' ').starts_with(Kw::Rem.as_str()) {
            continue;
        }
        let text = &stmt.text;
        let cut = scan::segments(text)
            .into_iter()
            .skip(1)
            .find(|seg| scan::begins_with(&text[seg.clone()], Kw::Rem))
            .map(|seg| text[..seg.start - 1].trim_end().to_string());
        match cut {
            Some(code) => out.push(stmt.with_text(&code)),
            None => out.push(stmt),
        }
    }
    out
}

pub fn remove_indent(stmts: Vec<Stmt>) -> Vec<Stmt> {
    stmts
        .into_iter()
        .map(|stmt| {
            let text = stmt.text.trim_start_matches(' ');
            if text.len() == stmt.text.len() {
                stmt
            } else {
                stmt.with_text(text)
            }
        })
        .collect()
}

/// Shrinking rewrites, applied to code outside string literals.
pub fn misc_fixups(stmts: Vec<Stmt>) -> Vec<Stmt> {
    stmts
        .into_iter()
        .map(|stmt| {
            let text = fixup(&stmt.text);
            if text == stmt.text {
                stmt
            } else {
                stmt.with_text(&text)
            }
        })
        .collect()
}

fn fixup(text: &str) -> String {
    let not_word = |c: Option<char>| !c.map_or(false, |c| c.is_ascii_alphanumeric() || c == '_');
    let digit = |c: Option<char>| c.map_or(false, |c| c.is_ascii_digit());
    let any = |_: Option<char>| true;
    let spaced = |kw: Kw| format!("{} ", kw);

    let spans = scan::spans(text);
    let last = spans.len().saturating_sub(1);
    let mut out = String::with_capacity(text.len());
    for (idx, (code, span)) in spans.into_iter().enumerate() {
        if !code {
            out.push_str(span);
            continue;
        }
        // A code span that is not last ends where a string literal opens
        let quote_follows = idx != last;
        let then_goto = format!("{} {}", Kw::Then, Kw::Goto);
        let mut s = scan::replace_word(span, &then_goto, Kw::Then.as_str(), not_word);
        s = scan::replace_word(&s, &spaced(Kw::Print), Kw::Print.as_str(), |c| {
            c.is_none() && quote_follows
        });
        s = scan::replace_word(&s, &spaced(Kw::If), Kw::If.as_str(), any);
        s = scan::replace_word(&s, &spaced(Kw::And), Kw::And.as_str(), digit);
        out.push_str(&s);
    }
    out
}
