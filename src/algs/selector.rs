//! Dart selectors: composable predicates restricting traversals to part of
//! a map.
//!
//! A [`Selector`] is a small expression tree. Leaves test the boundary mark,
//! the state of an external marker or an arbitrary closure; inner nodes
//! combine them with `&`, `|` and `!`:
//!
//! ```
//! use mesh_cmap::prelude::*;
//!
//! let map = Map2::new();
//! let marker = DartMarker::new(&map)?;
//! let sel = Selector::NoBoundary & !Selector::marked(&marker);
//! # let _ = sel;
//! # Ok::<(), MapError>(())
//! ```
//!
//! Selectors are values: cloning one clones the whole tree, and borrowed
//! markers stay borrowed for the selector's lifetime.

use crate::topology::dart::Dart;
use crate::topology::generic_map::GenericMap;
use crate::topology::marker::Marker;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

/// Predicate over darts.
#[derive(Clone, Default)]
pub enum Selector<'a> {
    /// Accepts every dart.
    #[default]
    All,
    /// Accepts darts that do not carry the boundary mark.
    NoBoundary,
    /// Accepts boundary darts only.
    Boundary,
    /// Accepts darts marked by the marker.
    Marked(&'a dyn Marker),
    /// Accepts darts not marked by the marker.
    Unmarked(&'a dyn Marker),
    Not(Box<Selector<'a>>),
    And(Box<Selector<'a>>, Box<Selector<'a>>),
    Or(Box<Selector<'a>>, Box<Selector<'a>>),
    Custom(Arc<dyn Fn(Dart) -> bool + Send + Sync + 'a>),
}

impl<'a> Selector<'a> {
    pub fn marked(marker: &'a dyn Marker) -> Self {
        Selector::Marked(marker)
    }

    pub fn unmarked(marker: &'a dyn Marker) -> Self {
        Selector::Unmarked(marker)
    }

    /// Wraps a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Dart) -> bool + Send + Sync + 'a,
    {
        Selector::Custom(Arc::new(f))
    }

    /// `true` if `d` is in scope.
    pub fn select(&self, map: &GenericMap, d: Dart) -> bool {
        match self {
            Selector::All => true,
            Selector::NoBoundary => !map.is_boundary_marked(d),
            Selector::Boundary => map.is_boundary_marked(d),
            Selector::Marked(m) => m.is_marked(d),
            Selector::Unmarked(m) => !m.is_marked(d),
            Selector::Not(s) => !s.select(map, d),
            Selector::And(a, b) => a.select(map, d) && b.select(map, d),
            Selector::Or(a, b) => a.select(map, d) || b.select(map, d),
            Selector::Custom(f) => f(d),
        }
    }

    /// `true` for the trivial selector, which lets traversals skip the call.
    #[inline]
    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }
}

impl<'a> BitAnd for Selector<'a> {
    type Output = Selector<'a>;

    fn bitand(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Selector::All, s) | (s, Selector::All) => s,
            (a, b) => Selector::And(Box::new(a), Box::new(b)),
        }
    }
}

impl<'a> BitOr for Selector<'a> {
    type Output = Selector<'a>;

    fn bitor(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Selector::All, _) | (_, Selector::All) => Selector::All,
            (a, b) => Selector::Or(Box::new(a), Box::new(b)),
        }
    }
}

impl<'a> Not for Selector<'a> {
    type Output = Selector<'a>;

    fn not(self) -> Self::Output {
        match self {
            Selector::NoBoundary => Selector::Boundary,
            Selector::Boundary => Selector::NoBoundary,
            Selector::Marked(m) => Selector::Unmarked(m),
            Selector::Unmarked(m) => Selector::Marked(m),
            Selector::Not(s) => *s,
            s => Selector::Not(Box::new(s)),
        }
    }
}

impl fmt::Debug for Selector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str("All"),
            Selector::NoBoundary => f.write_str("NoBoundary"),
            Selector::Boundary => f.write_str("Boundary"),
            Selector::Marked(_) => f.write_str("Marked(..)"),
            Selector::Unmarked(_) => f.write_str("Unmarked(..)"),
            Selector::Not(s) => f.debug_tuple("Not").field(s).finish(),
            Selector::And(a, b) => f.debug_tuple("And").field(a).field(b).finish(),
            Selector::Or(a, b) => f.debug_tuple("Or").field(a).field(b).finish(),
            Selector::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
