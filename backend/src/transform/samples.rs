//! Sample column code generation for `S$` references.

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use super::dsl::Statement;
use super::rename::{extends_sample_token, replace_bounded};
use crate::error::{ReferenceError, ReferenceResult};
use crate::models::{ColumnLayout, SampleDescriptor, Subfield, SUBFIELD_SEPARATOR};

/// A sample reference and the variable generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleBinding {
    pub descriptor: SampleDescriptor,
    pub var: String,
}

/// Generated code for every `S$` reference in a script.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SampleCode {
    pub bindings: Vec<SampleBinding>,
    /// Resets for named samples; wildcard accumulators rebuild themselves.
    pub resets: Vec<Statement>,
    pub prologue: Vec<Statement>,
    #[serde(skip)]
    patterns: Vec<Regex>,
}

/// Generate sample prologues for `descriptors`.
///
/// Descriptors whose sanitized names collide (`S$A-1` and `S$A.1`) get
/// numbered variables so each reference keeps its own value.
pub fn generate(
    descriptors: &BTreeSet<SampleDescriptor>,
    layout: &ColumnLayout,
) -> ReferenceResult<SampleCode> {
    let mut code = SampleCode::default();
    let mut taken = HashSet::new();

    for desc in descriptors {
        let var = unique_variable(desc.variable_stem(), &mut taken);
        let field = desc.subfield.name().map(str::to_string);

        if desc.is_wildcard() {
            code.prologue.push(Statement::LoopConcat {
                var: var.clone(),
                first_column: layout.first_sample_col(),
                subfield: field,
            });
        } else {
            code.resets.push(Statement::Reset { var: var.clone() });
            code.prologue.push(Statement::Bind {
                var: var.clone(),
                sample: desc.raw_name.clone(),
                subfield: field,
            });
        }

        code.patterns.push(reference_pattern(desc)?);
        code.bindings.push(SampleBinding {
            descriptor: desc.clone(),
            var,
        });
    }

    Ok(code)
}

impl SampleCode {
    /// Replace every `S$` reference in `text` with its variable.
    ///
    /// A match followed by another name, `$`, `-`, `.` or `*` character
    /// belongs to a longer reference and is left alone.
    pub fn rename(&self, text: &str) -> String {
        self.bindings
            .iter()
            .zip(&self.patterns)
            .fold(text.to_string(), |acc, (binding, pattern)| {
                let matches: Vec<(usize, usize)> = pattern
                    .find_iter(&acc)
                    .map(|m| (m.start(), m.end()))
                    .collect();
                replace_bounded(&acc, matches, &binding.var, extends_sample_token)
            })
    }
}

fn unique_variable(stem: String, taken: &mut HashSet<String>) -> String {
    let mut candidate = stem.clone();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}", stem, n);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// `S\$<escaped name>` optionally followed by `\$<field>`.
fn reference_pattern(desc: &SampleDescriptor) -> ReferenceResult<Regex> {
    let mut pattern = format!(r"S\${}", desc.escaped_name);
    if let Subfield::Named(field) = &desc.subfield {
        pattern.push_str(&format!(r"\{}{}", SUBFIELD_SEPARATOR, regex::escape(field)));
    }
    Regex::new(&pattern).map_err(|e| {
        let token = desc.to_reference().to_string();
        ReferenceError::invalid_sample(token.trim_start_matches("S$"), e.to_string())
    })
}
