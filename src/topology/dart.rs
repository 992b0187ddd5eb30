//! `Dart`: the atomic, oriented incidence element of a combinatorial map
//!
//! A dart is an opaque index into the DART attribute container. Every
//! relation (`phi1`, `phi2`, `phi3`) maps darts to darts, and every cell
//! (vertex, edge, face, volume) is an orbit of darts.
//!
//! This module provides:
//! - A transparent `Dart` newtype around `u32` with one canonical
//!   conversion to a storage index ([`Dart::index`]).
//! - The distinguished [`Dart::NIL`] sentinel used as traversal end marker.
//! - Implementations of common traits (`Debug`, `Display`, ordering,
//!   hashing, serde, bytemuck) so darts can be stored in columns and maps.

use std::fmt;

/// Handle to one dart of a map.
///
/// # Memory layout
/// `repr(transparent)` over `u32`, so relation columns of darts can be
/// reinterpreted as raw bytes for persistence.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[repr(transparent)]
pub struct Dart(u32);

impl Dart {
    /// The invalid dart. Returned by traversors once they are exhausted.
    pub const NIL: Dart = Dart(u32::MAX);

    /// Wraps a raw container line index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Dart(index)
    }

    /// Wraps a `usize` storage index.
    ///
    /// # Panics
    /// Panics if `index` does not fit in the dart index space.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index).expect("dart index exceeds u32 range");
        assert!(raw != u32::MAX, "dart index collides with NIL");
        Dart(raw)
    }

    /// Raw line index in the DART container.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Storage index used for every per-dart column.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// `true` for the [`Dart::NIL`] sentinel.
    #[inline]
    pub const fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for Dart {
    fn default() -> Self {
        Dart::NIL
    }
}

impl fmt::Debug for Dart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("Dart(NIL)")
        } else {
            f.debug_tuple("Dart").field(&self.0).finish()
        }
    }
}

impl fmt::Display for Dart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("NIL")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
