//! MapError: Unified error type for mesh-cmap public APIs
//!
//! Topological mutators validate their preconditions and report violations
//! through this type instead of corrupting the map. Legitimate refusals
//! (e.g. deleting a boundary vertex) are *not* errors; they are reported as
//! `Ok(false)` / `Ok(None)` by the operation itself.

use crate::topology::dart::Dart;
use crate::topology::orbit::Orbit;
use thiserror::Error;

/// Unified error type for combinatorial-map operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    /// A mutator was called with darts that do not satisfy its required
    /// relationship (e.g. `split_face` with darts of different faces).
    #[error("Precondition violated in `{op}`: {reason}")]
    PreconditionViolated {
        op: &'static str,
        reason: &'static str,
    },
    /// A dart or container line that does not exist (never allocated or
    /// already freed).
    #[error("Invalid handle: {what} `{index}` is not allocated")]
    InvalidHandle { what: &'static str, index: u32 },
    /// More concurrent markers than the bit pool of one orbit/thread slot
    /// supports.
    #[error("Mark pool exhausted for orbit {orbit:?} on thread slot {thread}")]
    MarkPoolExhausted { orbit: Orbit, thread: usize },
    /// A thread slot index outside the configured range.
    #[error("Thread slot {thread} out of range (map has {slots} slots)")]
    InvalidThreadSlot { thread: usize, slots: usize },
    /// A consistency check found a broken relation.
    #[error("Malformed map at dart {dart}: {reason}")]
    Malformed { dart: Dart, reason: String },
    /// An attribute with this name already exists on the orbit.
    #[error("Attribute `{name}` already exists on orbit {orbit:?}")]
    DuplicateAttribute { orbit: Orbit, name: String },
    /// No attribute with this name on the orbit.
    #[error("Unknown attribute `{name}` on orbit {orbit:?}")]
    UnknownAttribute { orbit: Orbit, name: String },
    /// The attribute exists but holds values of another type.
    #[error("Attribute `{name}` holds `{found}`, requested `{expected}`")]
    AttributeTypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A persisted column names a value type the registry does not know.
    #[error("Attribute type `{0}` is not registered")]
    UnknownAttributeType(String),
    /// Underlying reader/writer failure.
    #[error("I/O error: {0}")]
    Io(String),
    /// The byte stream does not follow the map file layout.
    #[error("Format error: {0}")]
    Format(String),
}

impl MapError {
    #[inline]
    pub(crate) fn precondition(op: &'static str, reason: &'static str) -> Self {
        MapError::PreconditionViolated { op, reason }
    }

    #[inline]
    pub(crate) fn malformed(dart: Dart, reason: impl Into<String>) -> Self {
        MapError::Malformed {
            dart,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for MapError {
    fn from(e: std::io::Error) -> Self {
        MapError::Io(e.to_string())
    }
}

impl From<bincode::Error> for MapError {
    fn from(e: bincode::Error) -> Self {
        MapError::Format(e.to_string())
    }
}
