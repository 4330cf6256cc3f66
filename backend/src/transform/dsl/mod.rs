//! Intermediate representation for generated awk code.
//!
//! This module provides:
//! - `operations`: Generated statement nodes (what a record needs)
//! - `render`: awk syntax for those nodes
//! - `prologue`: The ordered per-record prologue
//!
//! ## Usage Flow
//!
//! ```text
//! references → generators → Statement nodes → Prologue → render → awk text
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use vawk::transform::dsl::{Prologue, Statement};
//! use vawk::ColumnLayout;
//!
//! let mut prologue = Prologue::new(&ColumnLayout::default(), false);
//! prologue.resets.push(Statement::Reset { var: "INFO_AF".into() });
//! println!("{}", prologue.render());
//! ```

pub mod operations;
pub mod prologue;
pub mod render;

// Re-exports for convenience
pub use operations::{KeyBinding, Statement};
pub use prologue::Prologue;
pub use render::{awk_string, render_block, FIELD_SEPARATOR};
