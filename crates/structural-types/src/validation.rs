//! Validation — accumulates structural-check failures keyed by identifier
//! path, composable across nested descriptors.
//!
//! `collectErrors` in `spec.md` §3/§7 returns "did-fail" and records
//! `(path, expected, actual)` tuples as a side effect. `Validation` is that
//! accumulator; `PathSegment` is a single step of an identifier path.

use std::fmt;

/// One step of a path into a checked value: a property name, an array
/// index, a parameter name, the literal `return`, or a union-branch index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Property(String),
    Index(usize),
    Param(String),
    Return,
    UnionBranch(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Property(name) => write!(f, ".{name}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Param(name) => write!(f, "({name})"),
            PathSegment::Return => write!(f, ".return"),
            PathSegment::UnionBranch(i) => write!(f, "<branch {i}>"),
        }
    }
}

/// A single structural mismatch: where it happened, what was expected, and
/// what was actually found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationRecord {
    pub path: Vec<PathSegment>,
    pub expected: String,
    pub actual: String,
}

impl ValidationRecord {
    /// Render the path the way `spec.md`'s seeded scenarios do, e.g.
    /// `kids[0].kids[0]` — a bare identifier has no leading separator.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.path.iter().enumerate() {
            match segment {
                PathSegment::Property(name) if i == 0 => out.push_str(name),
                PathSegment::Param(name) if i == 0 => out.push_str(name),
                _ => out.push_str(&segment.to_string()),
            }
        }
        out
    }
}

impl fmt::Display for ValidationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at `{}`: expected {}, got {}",
            self.path_string(),
            self.expected,
            self.actual
        )
    }
}

/// Accumulates `ValidationRecord`s during one `collectErrors` pass.
#[derive(Default, Debug, Clone)]
pub struct Validation {
    records: Vec<ValidationRecord>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, path: &[PathSegment], expected: impl Into<String>, actual: impl Into<String>) {
        self.records.push(ValidationRecord {
            path: path.to_vec(),
            expected: expected.into(),
            actual: actual.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ValidationRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ValidationRecord> {
        self.records
    }
}

/// A runtime structural-check failure, thrown by `TypeContext::assert`-mode
/// checkpoints. Aggregates every record collected during the failing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub records: Vec<ValidationRecord>,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "type check failed ({} error(s)):", self.records.len())?;
        for record in &self.records {
            writeln!(f, "  {record}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TypeError {}
