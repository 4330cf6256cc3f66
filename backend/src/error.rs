//! Error types for the vawk preprocessor.
//!
//! This module defines a hierarchy of error types, one per stage:
//!
//! - [`SegmentError`] - BEGIN/END block extraction errors
//! - [`ReferenceError`] - Symbolic field reference errors
//! - [`EngineError`] - Errors starting or talking to the awk engine
//! - [`VawkError`] - Top-level errors returned to the CLI
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across stage boundaries.

use thiserror::Error;

// =============================================================================
// Segment Extraction Errors
// =============================================================================

/// Errors while splitting a script into BEGIN / per-record / END segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// A block opened with `{` never closed before the end of the script.
    #[error("unbalanced braces in {block} block starting at offset {offset}")]
    UnbalancedBlock { block: &'static str, offset: usize },
}

// =============================================================================
// Field Reference Errors
// =============================================================================

/// Errors in symbolic `I$` / `S$` references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// A sample reference that is not `S$NAME`, `S$NAME$FMT`, `S$*` or `S$*$FMT`.
    #[error("invalid sample reference 'S${token}': {reason} (format should be S$[ID]$[FMT])")]
    InvalidSampleSyntax { token: String, reason: String },
}

impl ReferenceError {
    pub fn invalid_sample(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSampleSyntax {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Engine Errors
// =============================================================================

/// Errors from the external awk engine process.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine binary could not be started.
    #[error("failed to start awk engine '{engine}': {source}")]
    Spawn {
        engine: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the engine output or writing ours failed.
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Top-level Errors
// =============================================================================

/// Top-level errors surfaced by the `vawk` binary.
#[derive(Debug, Error)]
pub enum VawkError {
    /// Script segmentation failed.
    #[error("{0}")]
    Segment(#[from] SegmentError),

    /// A symbolic reference was malformed.
    #[error("{0}")]
    Reference(#[from] ReferenceError),

    /// The engine could not be run.
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// No input file was given and stdin is a terminal.
    #[error("no VCF input given and stdin is a terminal")]
    MissingInput,
}

impl VawkError {
    /// Process exit status for this error.
    ///
    /// An engine that cannot be started maps to 127, like a shell's
    /// "command not found"; everything else is a plain failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            VawkError::Engine(EngineError::Spawn { .. }) => 127,
            _ => 1,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for segment extraction.
pub type SegmentResult<T> = Result<T, SegmentError>;

/// Result type for reference scanning.
pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// Result type for engine execution.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for the whole preprocessor.
pub type VawkResult<T> = Result<T, VawkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let seg_err = SegmentError::UnbalancedBlock {
            block: "BEGIN",
            offset: 3,
        };
        let top: VawkError = seg_err.into();
        assert!(top.to_string().contains("BEGIN"));
        assert_eq!(top.exit_code(), 1);

        let ref_err = ReferenceError::invalid_sample("NA1$GT$DP", "too many '$' separators");
        let top: VawkError = ref_err.into();
        assert!(top.to_string().contains("S$NA1$GT$DP"));
        assert_eq!(top.exit_code(), 1);
    }

    #[test]
    fn test_spawn_failure_exit_code() {
        let err = EngineError::Spawn {
            engine: "nawk".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("nawk"));

        let top: VawkError = err.into();
        assert_eq!(top.exit_code(), 127);
    }
}
