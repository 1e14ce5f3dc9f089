//! Surface-level scanning of BASIC statement text.
//!
//! Nothing here parses expressions. The scanner only knows where string
//! literals and `REM` comments are, where the `:` separators fall, and where
//! the reserved words the lowering cares about appear. Reserved words are
//! matched case sensitively against whole runs of letters and `_`, so
//! `FOREVER` or `END_LOOP` never contain a keyword, while crunched code such
//! as `X>1THEN100` still does.

use std::ops::Range;
use strum::{Display, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Kw {
    And,
    Call,
    End,
    For,
    Gosub,
    Goto,
    If,
    On,
    Print,
    Rem,
    Return,
    Sub,
    Then,
}

impl Kw {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Control transfers that must end a physical line.
    pub fn is_terminal(self) -> bool {
        matches!(self, Kw::Goto | Kw::Then | Kw::Return)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Reserved word at a byte offset.
    Word(usize, Kw),
    /// `:` statement separator at a byte offset.
    Sep(usize),
    /// String literal, quotes included. An unterminated literal runs to the end.
    Str(Range<usize>),
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Tokenize the parts of `text` the lowering cares about. Scanning stops
/// after a `REM`: the rest of the line is comment.
pub fn scan(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = vec![];
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let end = text[i + 1..].find('"').map_or(text.len(), |n| i + n + 2);
                tokens.push(Token::Str(i..end));
                i = end;
            }
            b':' => {
                tokens.push(Token::Sep(i));
                i += 1;
            }
            b if is_word_char(b as char) => {
                let end = text[i..]
                    .find(|c: char| !is_word_char(c))
                    .map_or(text.len(), |n| i + n);
                if let Ok(kw) = text[i..end].parse::<Kw>() {
                    tokens.push(Token::Word(i, kw));
                    if kw == Kw::Rem {
                        break;
                    }
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    tokens
}

/// Reserved words of `text` with their byte offsets.
pub fn keywords(text: &str) -> Vec<(usize, Kw)> {
    scan(text)
        .into_iter()
        .filter_map(|t| match t {
            Token::Word(at, kw) => Some((at, kw)),
            _ => None,
        })
        .collect()
}

/// Does `text` contain a control transfer that must end its physical line?
pub fn has_terminal(text: &str) -> bool {
    keywords(text).iter().any(|(_, kw)| kw.is_terminal())
}

/// Is `kw` the first thing on the line (after blanks)?
pub fn begins_with(text: &str, kw: Kw) -> bool {
    let lead = text.len() - text.trim_start().len();
    matches!(scan(text).first(), Some(Token::Word(at, k)) if *at == lead && *k == kw)
}

/// Byte ranges of the `:`-separated statements of `text`, separators excluded.
pub fn segments(text: &str) -> Vec<Range<usize>> {
    let mut ranges = vec![];
    let mut start = 0;
    for token in scan(text) {
        if let Token::Sep(at) = token {
            ranges.push(start..at);
            start = at + 1;
        }
    }
    ranges.push(start..text.len());
    ranges
}

/// Alternating code and string-literal spans covering all of `text`.
/// The flag is `true` for code.
pub fn spans(text: &str) -> Vec<(bool, &str)> {
    let mut spans = vec![];
    let mut start = 0;
    let mut in_str = false;
    for (i, c) in text.char_indices() {
        if c != '"' {
            continue;
        }
        if in_str {
            spans.push((false, &text[start..i + 1]));
            start = i + 1;
        } else {
            if start < i {
                spans.push((true, &text[start..i]));
            }
            start = i;
        }
        in_str = !in_str;
    }
    if start < text.len() {
        spans.push((!in_str, &text[start..]));
    }
    spans
}

/// Replace every occurrence of `from` that starts a word and is followed by
/// a character accepted by `follow` (`None` at the end of text).
pub fn replace_word(
    text: &str,
    from: &str,
    to: &str,
    follow: impl Fn(Option<char>) -> bool,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut prev: Option<char> = None;
    while !rest.is_empty() {
        let starts_word = !prev.map_or(false, |p| p.is_ascii_alphanumeric() || p == '_');
        if starts_word && rest.starts_with(from) && follow(rest[from.len()..].chars().next()) {
            out.push_str(to);
            prev = from.chars().last();
            rest = &rest[from.len()..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
            prev = Some(c);
        }
        rest = chars.as_str();
    }
    out
}
