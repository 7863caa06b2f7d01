//! Shell pattern dialect translation
//!
//! Callers send patterns where `[^...]` negates a class, `\` escapes the
//! next character (Unix only) and `**` is just two stars. The `glob` crate
//! spells negation `[!...]`, has no escape character and treats `**` as a
//! recursive wildcard, so patterns are rewritten before they reach it.

use glob::PatternError;

/// Whether `\` escapes the next character. On Windows it is a separator.
const ESCAPES: bool = cfg!(not(windows));

const ERR_TRAILING_ESCAPE: &str = "trailing escape character";
const ERR_UNTERMINATED_CLASS: &str = "unterminated character class";
const ERR_CLASS_CHAR: &str = "unescaped `-` or `]` in character class";

enum ClassItem {
    Char(char),
    Range(char, char),
}

fn error(pos: usize, msg: &'static str) -> PatternError {
    PatternError { pos, msg }
}

/// Rewrite `pattern` into the `glob` crate's syntax.
///
/// Malformed input (a trailing escape, an unterminated or empty class, an
/// unescaped `-` or `]` where a class character is expected) is rejected.
pub(crate) fn translate(pattern: &str) -> Result<String, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                while chars.get(i) == Some(&'*') {
                    i += 1;
                }
                out.push('*');
            }
            '\\' if ESCAPES => {
                let Some(&c) = chars.get(i + 1) else {
                    return Err(error(i, ERR_TRAILING_ESCAPE));
                };
                push_literal(&mut out, c);
                i += 2;
            }
            '[' => i = class(&chars, i, &mut out)?,
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Ok(out)
}

fn push_literal(out: &mut String, c: char) {
    match c {
        '*' | '?' | '[' | ']' => {
            out.push('[');
            out.push(c);
            out.push(']');
        }
        _ => out.push(c),
    }
}

/// Parse the class opening at `start`, emit it, and return the index past it.
fn class(chars: &[char], start: usize, out: &mut String) -> Result<usize, PatternError> {
    let mut i = start + 1;
    let negated = chars.get(i) == Some(&'^');
    if negated {
        i += 1;
    }

    let mut items = Vec::new();
    loop {
        match chars.get(i) {
            None => return Err(error(start, ERR_UNTERMINATED_CLASS)),
            Some(']') if !items.is_empty() => {
                i += 1;
                break;
            }
            _ => {}
        }
        let (lo, next) = class_char(chars, i, start)?;
        i = next;
        if chars.get(i) == Some(&'-') {
            let (hi, next) = class_char(chars, i + 1, start)?;
            i = next;
            items.push(ClassItem::Range(lo, hi));
        } else {
            items.push(ClassItem::Char(lo));
        }
    }

    emit_class(out, negated, items);
    Ok(i)
}

fn class_char(chars: &[char], i: usize, start: usize) -> Result<(char, usize), PatternError> {
    match chars.get(i) {
        None => Err(error(start, ERR_UNTERMINATED_CLASS)),
        Some('-') | Some(']') => Err(error(i, ERR_CLASS_CHAR)),
        Some('\\') if ESCAPES => match chars.get(i + 1) {
            Some(&c) => Ok((c, i + 2)),
            None => Err(error(i, ERR_TRAILING_ESCAPE)),
        },
        Some(&c) => Ok((c, i + 1)),
    }
}

/// `glob` only reads `]` as a member in first position, `-` in last
/// position, and a leading `!` as negation, so those three are placed
/// explicitly and carved out of ranges.
fn emit_class(out: &mut String, negated: bool, items: Vec<ClassItem>) {
    let (mut close, mut dash, mut bang) = (false, false, false);
    let mut body = String::new();

    for item in items {
        let (mut lo, hi) = match item {
            ClassItem::Char(c) => (c, c),
            ClassItem::Range(lo, hi) => (lo, hi),
        };
        // Ascending order, so `lo` only moves forward past each one.
        for (special, flag) in [('!', &mut bang), ('-', &mut dash), (']', &mut close)] {
            if lo <= special && special <= hi {
                *flag = true;
                if lo < special {
                    push_range(&mut body, lo, (special as u8 - 1) as char);
                }
                lo = (special as u8 + 1) as char;
            }
        }
        if lo <= hi {
            push_range(&mut body, lo, hi);
        }
    }

    let leads = negated || close || !body.is_empty();
    match (leads, bang, dash) {
        (false, false, false) => {
            // Empty class: matches nothing.
            out.push_str("[!\u{0}-\u{10FFFF}]");
            return;
        }
        (false, true, false) => {
            out.push('!');
            return;
        }
        (false, _, true) => {
            out.push_str(if bang { "[-!]" } else { "[-]" });
            return;
        }
        _ => {}
    }

    out.push('[');
    if negated {
        out.push('!');
    }
    if close {
        out.push(']');
    }
    out.push_str(&body);
    if bang {
        out.push('!');
    }
    if dash {
        out.push('-');
    }
    out.push(']');
}

fn push_range(body: &mut String, lo: char, hi: char) {
    body.push(lo);
    if lo != hi {
        body.push('-');
        body.push(hi);
    }
}
