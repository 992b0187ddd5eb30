//! Cell traversors: one representative dart per cell, each cell exactly once.
//!
//! A [`TraversorCell`] scans darts in storage order and keeps a
//! [`CellMarker`] of the cells it already returned. When the orbit is
//! embedded the marker works on container lines (one bit per cell);
//! otherwise it marks every dart of each visited cell.
//!
//! Two usage styles are supported:
//!
//! ```
//! use mesh_cmap::prelude::*;
//!
//! let mut map = Map2::new();
//! map.new_face(4)?;
//! let mut t = TraversorV::new(&map)?;
//! let mut n = 0;
//! let mut d = t.begin();
//! while d != t.end() {
//!     n += 1;
//!     d = t.next();
//! }
//! assert_eq!(n, 4);
//! assert_eq!(TraversorV::new(&map)?.count(), 4);
//! # Ok::<(), MapError>(())
//! ```
//!
//! Boundary darts are skipped unless [`TraversorCell::include_boundary`] is
//! set, so cells made only of boundary darts (the synthetic boundary faces
//! of a surface, the boundary volumes of a 3-map) are not reported.
//! Mutating the map during a traversal is impossible: the traversor holds a
//! shared borrow.

use crate::algs::selector::Selector;
use crate::map_error::MapError;
use crate::topology::dart::Dart;
use crate::topology::generic_map::{CombinatorialMap, GenericMap};
use crate::topology::marker::{CellMarker, Marker};
use crate::topology::orbit::Orbit;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    At(Dart),
    Exhausted,
}

/// Enumerates the cells of one orbit.
pub struct TraversorCell<'a> {
    map: &'a GenericMap,
    orbit: Orbit,
    marker: CellMarker<'a>,
    selector: Selector<'a>,
    include_boundary: bool,
    state: State,
}

impl<'a> TraversorCell<'a> {
    /// Traversor over the cells of `orbit`, using the marks of thread slot 0.
    pub fn new<M: CombinatorialMap + ?Sized>(map: &'a M, orbit: Orbit) -> Result<Self, MapError> {
        Self::on_thread(map, orbit, 0)
    }

    /// Same as [`new`](Self::new) with marks leased from `thread`.
    pub fn on_thread<M: CombinatorialMap + ?Sized>(
        map: &'a M,
        orbit: Orbit,
        thread: usize,
    ) -> Result<Self, MapError> {
        let map = map.generic();
        Ok(Self {
            map,
            orbit,
            marker: CellMarker::on_thread(map, orbit, thread)?,
            selector: Selector::All,
            include_boundary: false,
            state: State::Uninitialized,
        })
    }

    /// Restricts the traversal to darts accepted by `selector`.
    pub fn with_selector(mut self, selector: Selector<'a>) -> Self {
        self.selector = selector;
        self
    }

    /// Also reports cells reached through boundary darts.
    pub fn include_boundary(mut self, yes: bool) -> Self {
        self.include_boundary = yes;
        self
    }

    #[inline]
    pub fn orbit(&self) -> Orbit {
        self.orbit
    }

    /// First cell representative, or [`end`](Self::end). Calling it again
    /// forgets every visited cell and starts over.
    pub fn begin(&mut self) -> Dart {
        if self.state != State::Uninitialized {
            self.marker.unmark_all();
        }
        self.scan(self.map.begin())
    }

    /// Representative of the next unvisited cell, or [`end`](Self::end).
    pub fn next(&mut self) -> Dart {
        match self.state {
            State::Uninitialized => self.begin(),
            State::At(d) => self.scan(self.map.next(d)),
            State::Exhausted => Dart::NIL,
        }
    }

    #[inline]
    pub fn end(&self) -> Dart {
        Dart::NIL
    }

    fn accepts(&self, d: Dart) -> bool {
        if !self.include_boundary && self.map.is_boundary_marked(d) {
            return false;
        }
        !self.marker.is_marked(d) && (self.selector.is_all() || self.selector.select(self.map, d))
    }

    fn scan(&mut self, mut d: Dart) -> Dart {
        while !d.is_nil() {
            if self.accepts(d) {
                self.marker.mark(d);
                self.state = State::At(d);
                return d;
            }
            d = self.map.next(d);
        }
        self.state = State::Exhausted;
        Dart::NIL
    }
}

impl Iterator for TraversorCell<'_> {
    type Item = Dart;

    fn next(&mut self) -> Option<Dart> {
        let d = TraversorCell::next(self);
        (!d.is_nil()).then_some(d)
    }
}

macro_rules! orbit_traversor {
    ($(#[$doc:meta])* $name:ident, $orbit:expr) => {
        $(#[$doc])*
        pub struct $name<'a>(TraversorCell<'a>);

        impl<'a> $name<'a> {
            pub fn new<M: CombinatorialMap + ?Sized>(map: &'a M) -> Result<Self, MapError> {
                TraversorCell::new(map, $orbit).map(Self)
            }

            pub fn on_thread<M: CombinatorialMap + ?Sized>(map: &'a M, thread: usize) -> Result<Self, MapError> {
                TraversorCell::on_thread(map, $orbit, thread).map(Self)
            }

            pub fn with_selector(self, selector: Selector<'a>) -> Self {
                Self(self.0.with_selector(selector))
            }

            pub fn include_boundary(self, yes: bool) -> Self {
                Self(self.0.include_boundary(yes))
            }

            #[inline]
            pub fn begin(&mut self) -> Dart {
                self.0.begin()
            }

            #[inline]
            pub fn next(&mut self) -> Dart {
                self.0.next()
            }

            #[inline]
            pub fn end(&self) -> Dart {
                Dart::NIL
            }
        }

        impl Iterator for $name<'_> {
            type Item = Dart;

            #[inline]
            fn next(&mut self) -> Option<Dart> {
                Iterator::next(&mut self.0)
            }
        }
    };
}

orbit_traversor!(
    /// One dart per vertex.
    TraversorV,
    Orbit::Vertex
);
orbit_traversor!(
    /// One dart per edge.
    TraversorE,
    Orbit::Edge
);
orbit_traversor!(
    /// One dart per face.
    TraversorF,
    Orbit::Face
);
orbit_traversor!(
    /// One dart per volume.
    TraversorW,
    Orbit::Volume
);

/// Calls `f` on one dart of every selected cell of `orbit` until it returns
/// `true`. Returns whether the walk was stopped early.
pub fn foreach_cell<M, F>(map: &M, orbit: Orbit, selector: Selector<'_>, mut f: F) -> Result<bool, MapError>
where
    M: CombinatorialMap + ?Sized,
    F: FnMut(Dart) -> bool,
{
    let mut t = TraversorCell::new(map, orbit)?.with_selector(selector);
    let mut d = t.begin();
    while d != t.end() {
        if f(d) {
            return Ok(true);
        }
        d = t.next();
    }
    Ok(false)
}

/// Calls `f` on every selected live dart until it returns `true`.
pub fn foreach_dart<M, F>(map: &M, selector: &Selector<'_>, f: F) -> bool
where
    M: CombinatorialMap + ?Sized,
    F: FnMut(Dart) -> bool,
{
    let g = map.generic();
    g.darts().filter(|&d| selector.select(g, d)).any(f)
}

/// Number of cells of `orbit` outside the boundary.
pub fn count_cells<M: CombinatorialMap + ?Sized>(map: &M, orbit: Orbit) -> Result<usize, MapError> {
    Ok(TraversorCell::new(map, orbit)?.count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::map1::Map1;
    use crate::topology::map2::Map2;

    #[test]
    fn quad_cells() {
        let mut map = Map2::new();
        map.new_face(4).unwrap();
        assert_eq!(TraversorV::new(&map).unwrap().count(), 4);
        assert_eq!(TraversorE::new(&map).unwrap().count(), 4);
        assert_eq!(TraversorF::new(&map).unwrap().count(), 1);
        assert_eq!(TraversorW::new(&map).unwrap().count(), 1);
        let with_boundary = TraversorF::new(&map).unwrap().include_boundary(true);
        assert_eq!(with_boundary.count(), 2);
    }

    #[test]
    fn begin_restarts() {
        let mut map = Map1::new();
        map.new_cycle(3).unwrap();
        map.new_cycle(5).unwrap();
        let mut t = TraversorCell::new(&map, Orbit::Face).unwrap();
        let first = t.begin();
        assert!(!first.is_nil());
        assert!(!t.next().is_nil());
        assert!(t.next().is_nil());
        assert!(t.next().is_nil());
        assert_eq!(t.begin(), first);
        assert_eq!(t.count(), 1);
    }

    #[test]
    fn markers_are_returned() {
        let mut map = Map2::new();
        map.new_face(3).unwrap();
        {
            let _t = TraversorE::new(&map).unwrap();
            assert_eq!(map.generic().nb_leased_marks(Orbit::Dart, 0), 2);
        }
        assert_eq!(map.generic().nb_leased_marks(Orbit::Dart, 0), 1);
    }

    #[test]
    fn embedded_orbit_uses_lines() {
        let mut map = Map2::new();
        let a = map.new_face(3).unwrap();
        let b = map.new_face(3).unwrap();
        map.sew_faces(a, b).unwrap();
        map.init_orbit_embedding(Orbit::Vertex);
        let t = TraversorV::new(&map).unwrap();
        assert_eq!(map.generic().nb_leased_marks(Orbit::Vertex, 0), 1);
        assert_eq!(t.count(), 4);
    }

    #[test]
    fn foreach_cell_stops_early() {
        let mut map = Map2::new();
        map.new_face(6).unwrap();
        let mut seen = 0;
        let stopped = foreach_cell(&map, Orbit::Vertex, Selector::All, |_| {
            seen += 1;
            seen == 2
        })
        .unwrap();
        assert!(stopped);
        assert_eq!(seen, 2);
        assert_eq!(count_cells(&map, Orbit::Edge).unwrap(), 6);
        let mut boundary = 0;
        foreach_dart(&map, &Selector::Boundary, |_| {
            boundary += 1;
            false
        });
        assert_eq!(boundary, 6);
    }
}
