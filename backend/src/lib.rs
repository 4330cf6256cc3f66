//! # vawk - awk for VCF files
//!
//! vawk lets awk scripts address VCF columns by name. `I$AF` reads the `AF`
//! key of the INFO column, `S$NA12878$GT` reads the `GT` subfield of sample
//! `NA12878`, and `S$*$GT` collects `GT` across every sample. Scripts are
//! rewritten into plain awk and run by an external engine (gawk by default).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  vawk text  │────▶│   Parser    │────▶│  Transform  │────▶│   Runner    │
//! │ (shorthand) │     │ (segments)  │     │ (awk code)  │     │   (gawk)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vawk::{assemble, run, EngineConfig, Invocation, PipelineOptions};
//!
//! let program = assemble("{ if (I$AF>0.5) print $1,$2 }", &PipelineOptions::default())?;
//! let engine = EngineConfig::from_env();
//! let invocation = Invocation::new(engine.program, program.text, "calls.vcf");
//! let outcome = run(&invocation, &mut std::io::stdout().lock())?;
//! std::process::exit(outcome.exit_code());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Segments, column layout and field references
//! - [`parser`] - BEGIN/END extraction and reference scanning
//! - [`transform`] - Code generation and program assembly
//! - [`validation`] - Checks for leftover shorthand
//! - [`config`] - Engine selection
//! - [`runner`] - Engine execution

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Code generation
pub mod transform;

// Validation
pub mod validation;

// Execution
pub mod config;
pub mod runner;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    EngineError, EngineResult, ReferenceError, ReferenceResult, SegmentError, SegmentResult,
    VawkError, VawkResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{ColumnLayout, DslProgram, FieldReference, SampleDescriptor, Subfield};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{scan_annotation_keys, scan_references, scan_sample_descriptors};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{assemble, AssembledProgram, PipelineOptions};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_fully_resolved, unresolved_references};

// =============================================================================
// Re-exports - Execution
// =============================================================================

pub use config::{EngineConfig, DEFAULT_ENGINE, ENGINE_ENV_VAR};
pub use runner::{run, validate_assignment, Invocation, RunOutcome, STDIN_SENTINEL};
