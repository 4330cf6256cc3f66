//! Domain models for the vawk preprocessor.
//!
//! This module contains the core data structures shared by the stages:
//!
//! - [`DslProgram`] - A user script split into BEGIN / per-record / END text
//! - [`ColumnLayout`] - Where INFO, FORMAT and sample columns live
//! - [`FieldReference`] - A symbolic `I$` or `S$` reference
//! - [`SampleDescriptor`] - A parsed `S$` reference with sanitized names
//! - [`Subfield`] - Which part of a sample column is requested

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ReferenceError, ReferenceResult};

/// Separator between the sample name and the FORMAT key in `S$NAME$FMT`.
pub const SUBFIELD_SEPARATOR: char = '$';

/// Sample name standing for every sample column.
pub const WILDCARD: &str = "*";

/// Characters that may appear in a sample name but not in an awk identifier.
const NAME_GREMLINS: [char; 2] = ['-', '.'];

// =============================================================================
// Script Segments
// =============================================================================

/// A user script split into its three awk segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DslProgram {
    /// Body of the `BEGIN { ... }` block, without the braces.
    pub begin: String,
    /// Per-record body, either a stripped `{ ... }` or a wrapped condition.
    pub perline: String,
    /// Body of the `END { ... }` block, without the braces.
    pub end: String,
}

// =============================================================================
// Column Layout
// =============================================================================

/// 1-indexed column positions of a VCF-like record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// INFO column (`key[=value]` entries separated by `;`).
    pub info_col: usize,
}

impl ColumnLayout {
    /// Standard VCF layout: INFO is column 8.
    pub const DEFAULT_INFO_COL: usize = 8;

    pub fn new(info_col: usize) -> Self {
        Self { info_col }
    }

    /// FORMAT column, right after INFO.
    pub fn format_col(&self) -> usize {
        self.info_col + 1
    }

    /// First sample column, right after FORMAT.
    pub fn first_sample_col(&self) -> usize {
        self.info_col + 2
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INFO_COL)
    }
}

// =============================================================================
// Field References
// =============================================================================

/// Part of a sample column a reference asks for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subfield {
    /// The whole colon-separated column.
    All,
    /// One FORMAT key, e.g. `GT`.
    Named(String),
}

impl Subfield {
    pub fn name(&self) -> Option<&str> {
        match self {
            Subfield::All => None,
            Subfield::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for Subfield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subfield::All => f.write_str("ALL"),
            Subfield::Named(name) => f.write_str(name),
        }
    }
}

/// A symbolic reference found in the per-record text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldReference {
    /// `I$KEY`
    Annotation { key: String },
    /// `S$NAME`, `S$NAME$FMT`, `S$*`, `S$*$FMT`
    Sample {
        name: String,
        subfield: Subfield,
        wildcard: bool,
    },
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldReference::Annotation { key } => write!(f, "I${}", key),
            FieldReference::Sample { name, subfield, .. } => match subfield.name() {
                Some(field) => write!(f, "S${}${}", name, field),
                None => write!(f, "S${}", name),
            },
        }
    }
}

// =============================================================================
// Sample Descriptors
// =============================================================================

/// A parsed `S$` reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SampleDescriptor {
    /// Name exactly as written (`NA12878`, `HG-001.b`, `*`).
    pub raw_name: String,
    /// Name usable inside an awk identifier (`HG_001_b`).
    pub clean_name: String,
    /// Name with punctuation escaped for use in a match pattern (`HG\-001\.b`).
    pub escaped_name: String,
    pub subfield: Subfield,
}

impl SampleDescriptor {
    /// Build a descriptor from the token following `S$`.
    ///
    /// `NA12878` and `NA12878$GT` are valid; `NA12878$GT$DP` is not.
    pub fn parse(token: &str) -> ReferenceResult<Self> {
        let parts: Vec<&str> = token.split(SUBFIELD_SEPARATOR).collect();
        let (name, subfield) = match parts.as_slice() {
            [name] => (*name, Subfield::All),
            [name, field] => (*name, Subfield::Named((*field).to_string())),
            _ => {
                return Err(ReferenceError::invalid_sample(
                    token,
                    "more than one '$' separator",
                ))
            }
        };

        if name.is_empty() {
            return Err(ReferenceError::invalid_sample(token, "empty sample name"));
        }
        if name != WILDCARD && name.contains('*') {
            return Err(ReferenceError::invalid_sample(
                token,
                "'*' must stand alone as the sample name",
            ));
        }
        if let Subfield::Named(field) = &subfield {
            if field.is_empty() {
                return Err(ReferenceError::invalid_sample(token, "empty FORMAT key"));
            }
            if !field.chars().all(is_ident_char) {
                return Err(ReferenceError::invalid_sample(
                    token,
                    "FORMAT key must be letters, digits or '_'",
                ));
            }
        }

        Ok(Self::new(name, subfield))
    }

    pub fn new(raw_name: &str, subfield: Subfield) -> Self {
        let mut clean_name = raw_name.to_string();
        let mut escaped_name = raw_name.to_string();
        for gremlin in NAME_GREMLINS {
            clean_name = clean_name.replace(gremlin, "_");
            escaped_name = escaped_name.replace(gremlin, &format!("\\{}", gremlin));
        }
        if raw_name == WILDCARD {
            escaped_name = format!("\\{}", WILDCARD);
        }

        Self {
            raw_name: raw_name.to_string(),
            clean_name,
            escaped_name,
            subfield,
        }
    }

    /// `S$*` and `S$*$FMT` address every sample column.
    pub fn is_wildcard(&self) -> bool {
        self.raw_name == WILDCARD
    }

    /// Preferred awk variable name for this reference.
    ///
    /// Two descriptors can share a stem (`S$A-1` and `S$A.1`); the sample
    /// generator disambiguates those.
    pub fn variable_stem(&self) -> String {
        if self.is_wildcard() {
            format!("ALLSAMPLES_{}", self.subfield)
        } else {
            format!("SAMPLE_{}_{}", self.clean_name, self.subfield)
        }
    }

    pub fn to_reference(&self) -> FieldReference {
        FieldReference::Sample {
            name: self.raw_name.clone(),
            subfield: self.subfield.clone(),
            wildcard: self.is_wildcard(),
        }
    }
}

/// `[A-Za-z0-9_]`
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_layout() {
        let layout = ColumnLayout::default();
        assert_eq!(layout.info_col, 8);
        assert_eq!(layout.format_col(), 9);
        assert_eq!(layout.first_sample_col(), 10);

        let shifted = ColumnLayout::new(3);
        assert_eq!(shifted.format_col(), 4);
        assert_eq!(shifted.first_sample_col(), 5);
    }

    #[test]
    fn test_parse_whole_sample() {
        let desc = SampleDescriptor::parse("NA12878").unwrap();
        assert_eq!(desc.raw_name, "NA12878");
        assert_eq!(desc.subfield, Subfield::All);
        assert!(!desc.is_wildcard());
        assert_eq!(desc.variable_stem(), "SAMPLE_NA12878_ALL");
    }

    #[test]
    fn test_parse_subfield() {
        let desc = SampleDescriptor::parse("NA12878$GT").unwrap();
        assert_eq!(desc.subfield, Subfield::Named("GT".into()));
        assert_eq!(desc.variable_stem(), "SAMPLE_NA12878_GT");
    }

    #[test]
    fn test_clean_and_escape_punctuation() {
        let desc = SampleDescriptor::parse("HG-001.b$DP").unwrap();
        assert_eq!(desc.clean_name, "HG_001_b");
        assert_eq!(desc.escaped_name, r"HG\-001\.b");
        assert_eq!(desc.variable_stem(), "SAMPLE_HG_001_b_DP");
    }

    #[test]
    fn test_wildcard() {
        let desc = SampleDescriptor::parse("*$DP").unwrap();
        assert!(desc.is_wildcard());
        assert_eq!(desc.escaped_name, r"\*");
        assert_eq!(desc.variable_stem(), "ALLSAMPLES_DP");

        let all = SampleDescriptor::parse("*").unwrap();
        assert_eq!(all.variable_stem(), "ALLSAMPLES_ALL");
    }

    #[test]
    fn test_too_many_separators() {
        let err = SampleDescriptor::parse("NA12878$GT$DP").unwrap_err();
        assert!(matches!(err, ReferenceError::InvalidSampleSyntax { .. }));
    }

    #[test]
    fn test_malformed_names() {
        assert!(SampleDescriptor::parse("$GT").is_err());
        assert!(SampleDescriptor::parse("NA12878$").is_err());
        assert!(SampleDescriptor::parse("NA*$GT").is_err());
        assert!(SampleDescriptor::parse("NA12878$G-T").is_err());
    }

    #[test]
    fn test_reference_display() {
        let desc = SampleDescriptor::parse("NA1$GT").unwrap();
        assert_eq!(desc.to_reference().to_string(), "S$NA1$GT");

        let info = FieldReference::Annotation { key: "AF".into() };
        assert_eq!(info.to_string(), "I$AF");
    }
}
