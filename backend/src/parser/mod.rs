//! Script parsing: segment extraction and reference scanning.
//!
//! Turns the raw command-line script into a [`DslProgram`](crate::models::DslProgram)
//! and finds the symbolic field references in its per-record body.

pub mod references;
pub mod segments;

pub use references::{
    scan_annotation_keys, scan_references, scan_sample_descriptors, scan_sample_tokens,
};
pub use segments::{extract_block, Extracted};
