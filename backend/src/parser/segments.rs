//! BEGIN / per-record / END segmentation of a vawk script.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{SegmentError, SegmentResult};
use crate::models::DslProgram;

static BEGIN_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bBEGIN\s*\{").expect("static BEGIN pattern"));

static END_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bEND\s*\{").expect("static END pattern"));

/// A block cut out of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Text between the outer braces.
    pub body: String,
    /// The script with the keyword, braces and body removed.
    pub remainder: String,
}

impl DslProgram {
    /// Split a raw script into its three segments.
    ///
    /// The END block is searched for after the BEGIN block has been removed.
    /// Whatever is left becomes the per-record body: a `{ ... }` block has its
    /// braces stripped, a bare expression is treated as a filter condition.
    pub fn parse(raw: &str) -> SegmentResult<Self> {
        let (begin, rest) = match extract_block(raw, &BEGIN_OPENER, "BEGIN")? {
            Some(found) => (found.body, found.remainder),
            None => (String::new(), raw.to_string()),
        };
        let (end, rest) = match extract_block(&rest, &END_OPENER, "END")? {
            Some(found) => (found.body, found.remainder),
            None => (String::new(), rest),
        };

        Ok(Self {
            begin,
            perline: per_record_body(&rest),
            end,
        })
    }
}

/// Cut the first `KEYWORD { ... }` block out of `raw`.
///
/// Returns `Ok(None)` when the keyword does not occur. The scan is bounded by
/// the input: if the braces never balance the result is
/// [`SegmentError::UnbalancedBlock`].
pub fn extract_block(
    raw: &str,
    opener: &Regex,
    block: &'static str,
) -> SegmentResult<Option<Extracted>> {
    let Some(found) = opener.find(raw) else {
        return Ok(None);
    };
    // the opener pattern always ends on the '{'
    let open = found.end() - 1;
    let close = matching_brace(raw, open).ok_or(SegmentError::UnbalancedBlock {
        block,
        offset: found.start(),
    })?;

    let mut remainder = String::with_capacity(raw.len());
    remainder.push_str(&raw[..found.start()]);
    remainder.push_str(&raw[close + 1..]);

    Ok(Some(Extracted {
        body: raw[open + 1..close].to_string(),
        remainder,
    }))
}

/// Byte offset of the `}` closing the `{` at `open`.
///
/// Braces inside string literals, regex literals and `#` comments are
/// ignored. If that lexical scan never balances, a plain brace count is
/// tried before giving up.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    lexical_matching_brace(text, open).or_else(|| plain_matching_brace(text, open))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    Code,
    Str { escaped: bool },
    Regex { escaped: bool, in_bracket: bool },
    Comment,
}

fn lexical_matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut state = Lexeme::Code;
    // last significant character outside strings, regexes and comments
    let mut prev: Option<char> = None;

    for (offset, c) in text[open..].char_indices() {
        let was = state;
        state = match state {
            Lexeme::Str { escaped: true } => Lexeme::Str { escaped: false },
            Lexeme::Str { .. } => match c {
                '\\' => Lexeme::Str { escaped: true },
                '"' => Lexeme::Code,
                _ => Lexeme::Str { escaped: false },
            },
            Lexeme::Regex { escaped: true, in_bracket } => Lexeme::Regex {
                escaped: false,
                in_bracket,
            },
            Lexeme::Regex { in_bracket, .. } => match c {
                '\\' => Lexeme::Regex {
                    escaped: true,
                    in_bracket,
                },
                '[' => Lexeme::Regex {
                    escaped: false,
                    in_bracket: true,
                },
                ']' => Lexeme::Regex {
                    escaped: false,
                    in_bracket: false,
                },
                '/' if !in_bracket => Lexeme::Code,
                '\n' => Lexeme::Code,
                _ => Lexeme::Regex {
                    escaped: false,
                    in_bracket,
                },
            },
            Lexeme::Comment if c == '\n' => Lexeme::Code,
            Lexeme::Comment => Lexeme::Comment,
            Lexeme::Code => {
                let next = match c {
                    '"' => Lexeme::Str { escaped: false },
                    '#' => Lexeme::Comment,
                    '/' if opens_regex(prev) => Lexeme::Regex {
                        escaped: false,
                        in_bracket: false,
                    },
                    '{' => {
                        depth += 1;
                        Lexeme::Code
                    }
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(open + offset);
                        }
                        Lexeme::Code
                    }
                    _ => Lexeme::Code,
                };
                if !c.is_whitespace() {
                    prev = Some(c);
                }
                next
            }
        };
        // a closed string or regex is an operand, so a `/` after it divides
        if matches!(state, Lexeme::Str { .. } | Lexeme::Regex { .. })
            || matches!(was, Lexeme::Str { .. } | Lexeme::Regex { .. })
        {
            prev = Some(c);
        }
    }
    None
}

/// A `/` starts a regex literal unless it follows an operand, where it
/// divides.
fn opens_regex(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => matches!(
            c,
            '(' | ',' | '~' | '!' | '{' | '}' | ';' | '&' | '|' | '=' | '?' | ':' | '<' | '>'
        ),
    }
}

fn plain_matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn per_record_body(rest: &str) -> String {
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.len() >= 2 && trimmed.starts_with('{') && trimmed.ends_with('}') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        format!("if ({}) print ; ", trimmed)
    }
}
