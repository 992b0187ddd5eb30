//! Invariant hooks for combinatorial maps.
//!
//! [`DebugInvariants::validate_invariants`] runs
//! [`GenericMap::validate_topology`](crate::topology::GenericMap::validate_topology)
//! and then
//! [`GenericMap::validate_embeddings`](crate::topology::GenericMap::validate_embeddings).
//! Loading a map always runs both and returns the failure. With the
//! `check-invariants` feature the outermost topological edit also
//! re-validates the relations and panics on the first broken one; without
//! it the hooks compile to nothing.

use crate::map_error::MapError;

/// Relation and embedding checks of a map.
pub trait DebugInvariants {
    /// Panics on a broken invariant when `check-invariants` is enabled.
    fn debug_assert_invariants(&self);
    /// Relations first, then embeddings; returns the first failure.
    fn validate_invariants(&self) -> Result<(), MapError>;
}

/// Runs a fallible map check and panics with `ctx` when it fails. Expands
/// to nothing unless `check-invariants` (or `strict-invariants`) is on.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(feature = "check-invariants")]
        if let Err(e) = $expr {
            panic!(concat!("[cmap invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
