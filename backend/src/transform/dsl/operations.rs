//! Generated statements.
//!
//! Each node says which field semantics a record needs (split this column,
//! bind that key to this variable) without committing to awk syntax. The
//! [`render`](super::render) module turns them into program text.

use serde::{Deserialize, Serialize};

/// An INFO key bound to the variable that receives its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: String,
    pub var: String,
}

impl KeyBinding {
    pub fn new(key: impl Into<String>, var: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            var: var.into(),
        }
    }
}

/// One generated per-record (or header) statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    /// Clear a variable so nothing leaks from the previous record.
    Reset { var: String },

    /// Split the FORMAT column into its ordered key list.
    SplitFormat { column: usize },

    /// Split the INFO column into entries and bind every requested key:
    /// `KEY` alone binds `1`, `KEY=VALUE` binds `VALUE`.
    ScanAndMatch {
        column: usize,
        bindings: Vec<KeyBinding>,
    },

    /// Bind one named sample column, or one FORMAT subfield of it.
    Bind {
        var: String,
        sample: String,
        #[serde(default)]
        subfield: Option<String>,
    },

    /// Join every sample column (or one FORMAT subfield of each) with tabs.
    LoopConcat {
        var: String,
        first_column: usize,
        #[serde(default)]
        subfield: Option<String>,
    },

    /// Route `##` and `#` lines away from the user body, recording the
    /// sample name of every column found on the `#` line.
    HeaderDispatch { first_column: usize, echo: bool },
}
