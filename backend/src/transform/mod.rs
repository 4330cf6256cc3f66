//! Code generation.
//!
//! This module turns scanned references into awk code:
//! - Annotation: `I$KEY` lookups in the INFO column
//! - Samples: `S$NAME`, `S$NAME$FMT` and wildcard lookups in sample columns
//! - Rename: bounded replacement of references by generated variables
//! - DSL: Statement nodes and their awk rendering
//! - Pipeline: Program assembly

pub mod annotation;
pub mod dsl;
pub mod pipeline;
pub mod rename;
pub mod samples;

pub use annotation::AnnotationCode;
pub use pipeline::*;
pub use samples::{SampleBinding, SampleCode};
