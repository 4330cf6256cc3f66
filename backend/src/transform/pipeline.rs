//! Program assembly: raw script in, complete awk program out.
//!
//! This module ties the stages together:
//! segment extraction, reference scanning, code generation, renaming and
//! final layout of the BEGIN / per-record / END blocks.
//!
//! # Example
//!
//! ```rust,ignore
//! use vawk::{assemble, PipelineOptions};
//!
//! let program = assemble("{ if (I$AF>0.5) print $1,$2 }", &PipelineOptions::default())?;
//! println!("{}", program.text);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::annotation::{self, AnnotationCode};
use super::dsl::{awk_string, KeyBinding, Prologue, FIELD_SEPARATOR};
use super::samples::{self, SampleBinding, SampleCode};
use crate::error::VawkResult;
use crate::models::{ColumnLayout, DslProgram, FieldReference, SampleDescriptor};
use crate::parser::scan_references;
use crate::validation::unresolved_references;

/// Options for program assembly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Where the INFO, FORMAT and sample columns are
    pub layout: ColumnLayout,

    /// Echo `##` and `#` header lines to the output
    pub echo_header: bool,
}

/// A fully assembled program and what went into it
#[derive(Debug, Clone, Serialize)]
pub struct AssembledProgram {
    /// Segments as extracted from the raw script
    pub segments: DslProgram,

    /// Every distinct symbolic reference in the per-record body
    pub references: BTreeSet<FieldReference>,

    /// INFO keys and their variables
    pub annotations: Vec<KeyBinding>,

    /// Sample references and their variables
    pub samples: Vec<SampleBinding>,

    /// Generated per-record prologue
    pub prologue: Prologue,

    /// Per-record body with every reference renamed
    pub perline: String,

    /// Final awk program text
    pub text: String,
}

/// Assemble a raw vawk script into awk program text.
///
/// Fails on unbalanced BEGIN/END braces or a malformed sample reference;
/// nothing is generated in either case.
pub fn assemble(raw: &str, options: &PipelineOptions) -> VawkResult<AssembledProgram> {
    let segments = DslProgram::parse(raw)?;
    debug!(
        begin = %segments.begin,
        perline = %segments.perline,
        end = %segments.end,
        "extracted segments"
    );

    let references = scan_references(&segments.perline)?;
    let mut keys = BTreeSet::new();
    let mut descriptors = BTreeSet::new();
    for reference in &references {
        match reference {
            FieldReference::Annotation { key } => {
                keys.insert(key.clone());
            }
            FieldReference::Sample { name, subfield, .. } => {
                descriptors.insert(SampleDescriptor::new(name, subfield.clone()));
            }
        }
    }

    let info: AnnotationCode = annotation::generate(&keys, &options.layout);
    let sample: SampleCode = samples::generate(&descriptors, &options.layout)?;

    let perline = sample.rename(&info.rename(&segments.perline));
    let leftovers = unresolved_references(&perline);
    if !leftovers.is_empty() {
        warn!(references = ?leftovers, "unresolved references left in per-record body");
    }

    let mut prologue = Prologue::new(&options.layout, options.echo_header);
    prologue.resets.extend(info.resets.iter().cloned());
    prologue.resets.extend(sample.resets.iter().cloned());
    prologue.annotation = info.prologue.clone();
    prologue.samples = sample.prologue.clone();

    let text = render_program(&segments.begin, &prologue.render(), &perline, &segments.end);
    debug!(bytes = text.len(), "assembled program");

    Ok(AssembledProgram {
        segments,
        references,
        annotations: info.bindings,
        samples: sample.bindings,
        prologue,
        perline,
        text,
    })
}

/// Lay out the three awk blocks. Both separators are fixed to tab.
fn render_program(begin: &str, prologue: &str, perline: &str, end: &str) -> String {
    let tab = awk_string(FIELD_SEPARATOR);
    format!(
        "BEGIN {{\nFS={tab}; OFS={tab}\n{begin}\n}}\n{{\n{prologue}\n{perline}\n}}\nEND {{\n{end}\n}}\n",
        tab = tab,
        begin = begin,
        prologue = prologue,
        perline = perline,
        end = end,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VawkError;
    use crate::models::Subfield;
    use crate::validation::is_fully_resolved;

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, haystack))
    }

    #[test]
    fn test_default_options() {
        let opts = PipelineOptions::default();
        assert_eq!(opts.layout.info_col, 8);
        assert!(!opts.echo_header);
    }

    #[test]
    fn test_info_filter() {
        let program = assemble("{ if (I$AF>0.5) print $1,$2 }", &PipelineOptions::default())
            .unwrap();

        assert_eq!(program.perline, " if (INFO_AF>0.5) print $1,$2 ");
        assert!(is_fully_resolved(&program.perline));
        assert_eq!(program.annotations, vec![KeyBinding::new("AF", "INFO_AF")]);

        let text = &program.text;
        assert!(text.starts_with("BEGIN {\nFS=\"\\t\"; OFS=\"\\t\"\n"));
        let split = position(text, "VAWK_NFMT=split($9,VAWK_FMT,\":\")");
        let reset = position(text, "INFO_AF=\"\"");
        let scan = position(text, "VAWK_NINFO=split($8,VAWK_INFO,\";\")");
        let dispatch = position(text, "if ($0 ~ /^##/)");
        let body = position(text, "if (INFO_AF>0.5) print $1,$2");
        assert!(split < reset && reset < scan && scan < dispatch && dispatch < body);
    }

    #[test]
    fn test_sample_references() {
        let program = assemble(
            "{ print S$NA12878$GT, S$*$DP, S$NA12878 }",
            &PipelineOptions::default(),
        )
        .unwrap();

        assert_eq!(
            program.perline,
            " print SAMPLE_NA12878_GT, ALLSAMPLES_DP, SAMPLE_NA12878_ALL "
        );
        assert_eq!(program.samples.len(), 3);
        assert!(program.references.contains(&FieldReference::Sample {
            name: "NA12878".into(),
            subfield: Subfield::Named("GT".into()),
            wildcard: false,
        }));

        // named samples are reset, the wildcard accumulator is rebuilt instead
        assert!(program.text.contains("SAMPLE_NA12878_GT=\"\""));
        assert!(program.text.contains("SAMPLE_NA12878_ALL=\"\""));
        assert!(!program.text.contains("ALLSAMPLES_DP=\"\"\n"));
    }

    #[test]
    fn test_references_match_scanner() {
        let program = assemble(
            "{ if (I$AF>0.1 && I$DB) print S$A-1$GT, S$*, S$B }",
            &PipelineOptions::default(),
        )
        .unwrap();
        let scanned = scan_references(&program.segments.perline).unwrap();
        assert_eq!(program.references, scanned);
        assert_eq!(program.annotations.len(), 2);
        assert_eq!(program.samples.len(), 3);
    }

    #[test]
    fn test_begin_and_end_pass_through() {
        let program = assemble(
            "BEGIN { n=0 } I$DP>10 END { print n }",
            &PipelineOptions::default(),
        )
        .unwrap();
        assert_eq!(program.perline, "if (INFO_DP>10) print ; ");
        assert!(program.text.contains("FS=\"\\t\"; OFS=\"\\t\"\n n=0 \n}"));
        assert!(program.text.ends_with("END {\n print n \n}\n"));
    }

    #[test]
    fn test_custom_column_and_header_echo() {
        let options = PipelineOptions {
            layout: ColumnLayout::new(3),
            echo_header: true,
        };
        let program = assemble("{ print I$X, S$*$GT }", &options).unwrap();
        assert!(program.text.contains("split($3,VAWK_INFO"));
        assert!(program.text.contains("split($4,VAWK_FMT"));
        assert!(program.text.contains("for (VAWK_C=5;VAWK_C<=NF;++VAWK_C)"));
        assert!(program.text.contains("{ print; next }"));
    }

    #[test]
    fn test_invalid_sample_syntax_generates_nothing() {
        let err = assemble("{ print S$NA12878$GT$DP }", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, VawkError::Reference(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_unbalanced_block() {
        let err = assemble("BEGIN { x=1 { print $1 }", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, VawkError::Segment(_)));
    }

    #[test]
    fn test_references_outside_perline_are_not_scanned() {
        let program = assemble("BEGIN { print \"I$AF\" } { print $1 }", &PipelineOptions::default())
            .unwrap();
        assert!(program.references.is_empty());
        assert!(program.annotations.is_empty());
    }
}
