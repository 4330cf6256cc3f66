//! Bounded textual replacement of symbolic references.

use crate::models::is_ident_char;

/// Replace each match in `matches` by `replacement`, skipping matches that
/// sit inside a longer token.
///
/// A match is skipped when the character before it is an identifier
/// character, or when the character after it satisfies `extends`. Matches
/// must be ordered and non-overlapping, as produced by `find_iter` or
/// `match_indices`.
pub fn replace_bounded<I>(
    text: &str,
    matches: I,
    replacement: &str,
    extends: impl Fn(char) -> bool,
) -> String
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for (start, end) in matches {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        if before.is_some_and(is_ident_char) || after.is_some_and(&extends) {
            continue;
        }
        out.push_str(&text[last..start]);
        out.push_str(replacement);
        last = end;
    }

    out.push_str(&text[last..]);
    out
}

/// Characters that would continue an `S$` token.
pub fn extends_sample_token(c: char) -> bool {
    is_ident_char(c) || matches!(c, '-' | '.' | '*' | '$')
}
