//! Common types and utilities shared by the structural runtime type system.
//!
//! This crate provides foundational types used across both halves of the
//! system (the descriptor runtime library and the annotation converter):
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, codes)
//! - Centralized recursion limits

pub mod diagnostics;
pub mod interner;
pub mod limits;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticCategory};
pub use interner::{Atom, Interner};
pub use span::Span;
