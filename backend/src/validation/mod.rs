//! Post-generation checks on assembled program text.
//!
//! After renaming, no `I$` or `S$` shorthand should be left in the
//! per-record body; anything left would reach awk as field arithmetic.

use crate::parser::references::{ANNOTATION_REF, SAMPLE_REF};

/// Symbolic references still present in `text`, in order of appearance.
pub fn unresolved_references(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = ANNOTATION_REF
        .captures_iter(text)
        .map(|caps| (caps.get(0).map_or(0, |m| m.start()), format!("I${}", &caps[1])))
        .chain(
            SAMPLE_REF
                .captures_iter(text)
                .map(|caps| (caps.get(0).map_or(0, |m| m.start()), format!("S${}", &caps[1]))),
        )
        .collect();
    found.sort();
    found.into_iter().map(|(_, reference)| reference).collect()
}

/// `true` when `text` contains no `I$` or `S$` shorthand.
pub fn is_fully_resolved(text: &str) -> bool {
    !ANNOTATION_REF.is_match(text) && !SAMPLE_REF.is_match(text)
}
