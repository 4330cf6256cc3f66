//! Ordered per-record prologue.

use serde::Serialize;

use super::operations::Statement;
use super::render::render_block;
use crate::models::ColumnLayout;

/// Everything generated ahead of the user's per-record body, in run order:
/// FORMAT split, resets, INFO scan, sample bindings, header dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prologue {
    pub format_split: Statement,
    pub resets: Vec<Statement>,
    pub annotation: Vec<Statement>,
    pub samples: Vec<Statement>,
    pub dispatch: Statement,
}

impl Prologue {
    /// An empty prologue for `layout`: only the FORMAT split and the header
    /// dispatch.
    pub fn new(layout: &ColumnLayout, echo_header: bool) -> Self {
        Self {
            format_split: Statement::SplitFormat {
                column: layout.format_col(),
            },
            resets: Vec::new(),
            annotation: Vec::new(),
            samples: Vec::new(),
            dispatch: Statement::HeaderDispatch {
                first_column: layout.first_sample_col(),
                echo: echo_header,
            },
        }
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        std::iter::once(&self.format_split)
            .chain(&self.resets)
            .chain(&self.annotation)
            .chain(&self.samples)
            .chain(std::iter::once(&self.dispatch))
    }

    pub fn render(&self) -> String {
        render_block(self.statements())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_order() {
        let mut prologue = Prologue::new(&ColumnLayout::default(), false);
        prologue.resets.push(Statement::Reset { var: "INFO_AF".into() });
        prologue.samples.push(Statement::LoopConcat {
            var: "ALLSAMPLES_ALL".into(),
            first_column: 10,
            subfield: None,
        });

        let kinds: Vec<_> = prologue
            .statements()
            .map(|s| serde_json::to_value(s).unwrap()["type"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            kinds,
            vec!["split_format", "reset", "loop_concat", "header_dispatch"]
        );
    }

    #[test]
    fn test_render_empty_prologue() {
        let text = Prologue::new(&ColumnLayout::default(), true).render();
        assert!(text.starts_with("VAWK_NFMT=split($9,VAWK_FMT,\":\")\n"));
        assert!(text.contains("print; next"));
    }
}
