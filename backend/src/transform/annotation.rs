//! INFO column code generation for `I$KEY` references.

use serde::Serialize;
use std::collections::BTreeSet;

use super::dsl::{KeyBinding, Statement};
use super::rename::replace_bounded;
use crate::models::{is_ident_char, ColumnLayout};

/// Generated code for every `I$KEY` in a script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationCode {
    pub bindings: Vec<KeyBinding>,
    /// `INFO_KEY=""` for every key, run before the scan.
    pub resets: Vec<Statement>,
    /// The INFO split and key scan; empty when no key is referenced.
    pub prologue: Vec<Statement>,
}

/// awk variable holding the value of INFO key `key`.
pub fn variable_for(key: &str) -> String {
    format!("INFO_{}", key)
}

/// Generate the INFO prologue for `keys`.
pub fn generate(keys: &BTreeSet<String>, layout: &ColumnLayout) -> AnnotationCode {
    if keys.is_empty() {
        return AnnotationCode::default();
    }

    let bindings: Vec<KeyBinding> = keys
        .iter()
        .map(|key| KeyBinding::new(key.clone(), variable_for(key)))
        .collect();
    let resets = bindings
        .iter()
        .map(|b| Statement::Reset { var: b.var.clone() })
        .collect();
    let prologue = vec![Statement::ScanAndMatch {
        column: layout.info_col,
        bindings: bindings.clone(),
    }];

    AnnotationCode {
        bindings,
        resets,
        prologue,
    }
}

impl AnnotationCode {
    /// Replace every `I$KEY` in `text` with its variable.
    pub fn rename(&self, text: &str) -> String {
        self.bindings.iter().fold(text.to_string(), |acc, b| {
            let needle = format!("I${}", b.key);
            let matches: Vec<(usize, usize)> = acc
                .match_indices(&needle)
                .map(|(start, m)| (start, start + m.len()))
                .collect();
            replace_bounded(&acc, matches, &b.var, is_ident_char)
        })
    }
}
