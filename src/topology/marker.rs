//! Dart and cell markers: scoped leases of one mark bit.
//!
//! A marker borrows the map, leases a bit from the pool of one
//! `(orbit, thread)` slot and returns it when dropped. Because markers hold
//! `&GenericMap`, the map cannot be mutated while any marker is alive, and
//! a bit can never outlive its lease.
//!
//! Three clean-up policies exist for both families:
//! - plain (`DartMarker`, `CellMarker`): clears the bit on every line at
//!   drop, O(capacity);
//! - `*Store`: remembers what it marked and clears only that, O(marked);
//! - `*NoUnmark`: the caller unmarks everything before drop; debug builds
//!   assert the column is clean.
//!
//! A [`CellMarker`] on an orbit without embedding marks every dart of the
//! cell instead, so both cases answer the same questions.

use hashbrown::HashSet;

use crate::data::marker_set::{Mark, MarkColumn};
use crate::map_error::MapError;
use crate::topology::dart::Dart;
use crate::topology::generic_map::{CombinatorialMap, EMBNULL, GenericMap};
use crate::topology::orbit::Orbit;

/// Operations shared by every marker.
pub trait Marker: Sync {
    fn mark(&mut self, d: Dart);
    fn unmark(&mut self, d: Dart);
    fn is_marked(&self, d: Dart) -> bool;
    /// Marks every dart of the `orbit` of `d`.
    fn mark_orbit(&mut self, orbit: Orbit, d: Dart);
    fn unmark_orbit(&mut self, orbit: Orbit, d: Dart);
    /// Marks every live dart (or cell).
    fn mark_all(&mut self);
    fn unmark_all(&mut self);
}

struct Lease<'a> {
    map: &'a GenericMap,
    orbit: Orbit,
    thread: usize,
    mark: Mark,
}

impl<'a> Lease<'a> {
    fn new(map: &'a GenericMap, orbit: Orbit, thread: usize) -> Result<Self, MapError> {
        let mark = map.lease_mark(orbit, thread)?;
        Ok(Self {
            map,
            orbit,
            thread,
            mark,
        })
    }

    #[inline]
    fn column(&self) -> &'a MarkColumn {
        self.map.mark_column(self.orbit, self.thread)
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.map.release_mark(self.orbit, self.thread, self.mark);
    }
}

enum Cleanup {
    All,
    Store(Vec<u32>),
    Caller,
}

impl Cleanup {
    #[inline]
    fn record(&mut self, line: u32) {
        if let Cleanup::Store(v) = self {
            v.push(line);
        }
    }

    fn finish(&mut self, lease: &Lease<'_>, what: &str) {
        let col = lease.column();
        match self {
            Cleanup::All => col.unmark_all(lease.mark),
            Cleanup::Store(lines) => {
                for l in lines.drain(..) {
                    col.unmark(l as usize, lease.mark);
                }
            }
            Cleanup::Caller => {
                let clean = col.is_all_unmarked(lease.mark);
                if !clean {
                    log::warn!("{what} dropped with marked lines");
                }
                if !std::thread::panicking() {
                    debug_assert!(clean, "{what} dropped with marked lines");
                }
            }
        }
    }
}

struct DartCore<'a> {
    lease: Lease<'a>,
    cleanup: Cleanup,
    what: &'static str,
}

impl<'a> DartCore<'a> {
    fn new(map: &'a GenericMap, thread: usize, cleanup: Cleanup, what: &'static str) -> Result<Self, MapError> {
        Ok(Self {
            lease: Lease::new(map, Orbit::Dart, thread)?,
            cleanup,
            what,
        })
    }

    fn mark(&mut self, d: Dart) {
        self.lease.column().mark(d.index(), self.lease.mark);
        self.cleanup.record(d.get());
    }

    fn unmark(&mut self, d: Dart) {
        self.lease.column().unmark(d.index(), self.lease.mark);
    }

    fn is_marked(&self, d: Dart) -> bool {
        self.lease.column().is_marked(d.index(), self.lease.mark)
    }

    fn mark_orbit(&mut self, orbit: Orbit, d: Dart) {
        let map = self.lease.map;
        map.foreach_dart_of_orbit(orbit, d, |x| {
            self.mark(x);
            false
        });
    }

    fn unmark_orbit(&mut self, orbit: Orbit, d: Dart) {
        let map = self.lease.map;
        map.foreach_dart_of_orbit(orbit, d, |x| {
            self.unmark(x);
            false
        });
    }

    fn mark_all(&mut self) {
        let map = self.lease.map;
        for d in map.darts() {
            self.mark(d);
        }
    }

    fn unmark_all(&mut self) {
        match &mut self.cleanup {
            Cleanup::Store(v) => {
                let col = self.lease.column();
                for l in v.drain(..) {
                    col.unmark(l as usize, self.lease.mark);
                }
            }
            _ => self.lease.column().unmark_all(self.lease.mark),
        }
    }
}

impl Drop for DartCore<'_> {
    fn drop(&mut self) {
        self.cleanup.finish(&self.lease, self.what);
    }
}

struct CellCore<'a> {
    lease: Lease<'a>,
    orbit: Orbit,
    by_line: bool,
    cleanup: Cleanup,
    what: &'static str,
}

impl<'a> CellCore<'a> {
    fn new(
        map: &'a GenericMap,
        orbit: Orbit,
        thread: usize,
        cleanup: Cleanup,
        what: &'static str,
    ) -> Result<Self, MapError> {
        let by_line = map.is_orbit_embedded(orbit);
        let slot = if by_line { orbit } else { Orbit::Dart };
        Ok(Self {
            lease: Lease::new(map, slot, thread)?,
            orbit,
            by_line,
            cleanup,
            what,
        })
    }

    fn set(&mut self, d: Dart, on: bool) {
        let col = self.lease.column();
        let mark = self.lease.mark;
        if self.by_line {
            let line = self.lease.map.embedding(self.orbit, d);
            if line == EMBNULL {
                return;
            }
            if on {
                col.mark(line as usize, mark);
                self.cleanup.record(line);
            } else {
                col.unmark(line as usize, mark);
            }
        } else {
            let map = self.lease.map;
            let cleanup = &mut self.cleanup;
            map.foreach_dart_of_orbit(self.orbit, d, |x| {
                if on {
                    col.mark(x.index(), mark);
                    cleanup.record(x.get());
                } else {
                    col.unmark(x.index(), mark);
                }
                false
            });
        }
    }

    fn is_marked(&self, d: Dart) -> bool {
        let idx = if self.by_line {
            let line = self.lease.map.embedding(self.orbit, d);
            if line == EMBNULL {
                return false;
            }
            line as usize
        } else {
            d.index()
        };
        self.lease.column().is_marked(idx, self.lease.mark)
    }

    fn mark_all(&mut self) {
        let col = self.lease.column();
        let mark = self.lease.mark;
        let container = self.lease.map.container(if self.by_line { self.orbit } else { Orbit::Dart });
        for l in container.lines() {
            col.mark(l as usize, mark);
            self.cleanup.record(l);
        }
    }

    fn unmark_all(&mut self) {
        match &mut self.cleanup {
            Cleanup::Store(v) => {
                let col = self.lease.column();
                for l in v.drain(..) {
                    col.unmark(l as usize, self.lease.mark);
                }
            }
            _ => self.lease.column().unmark_all(self.lease.mark),
        }
    }
}

impl Drop for CellCore<'_> {
    fn drop(&mut self) {
        self.cleanup.finish(&self.lease, self.what);
    }
}

macro_rules! dart_marker {
    ($(#[$doc:meta])* $name:ident, $cleanup:expr) => {
        $(#[$doc])*
        pub struct $name<'a>(DartCore<'a>);

        impl<'a> $name<'a> {
            /// Leases a dart mark on thread slot 0.
            pub fn new<M: CombinatorialMap + ?Sized>(map: &'a M) -> Result<Self, MapError> {
                Self::on_thread(map, 0)
            }

            /// Leases a dart mark on `thread`.
            pub fn on_thread<M: CombinatorialMap + ?Sized>(
                map: &'a M,
                thread: usize,
            ) -> Result<Self, MapError> {
                DartCore::new(map.generic(), thread, $cleanup, stringify!($name)).map(Self)
            }
        }

        impl Marker for $name<'_> {
            #[inline]
            fn mark(&mut self, d: Dart) {
                self.0.mark(d)
            }
            #[inline]
            fn unmark(&mut self, d: Dart) {
                self.0.unmark(d)
            }
            #[inline]
            fn is_marked(&self, d: Dart) -> bool {
                self.0.is_marked(d)
            }
            fn mark_orbit(&mut self, orbit: Orbit, d: Dart) {
                self.0.mark_orbit(orbit, d)
            }
            fn unmark_orbit(&mut self, orbit: Orbit, d: Dart) {
                self.0.unmark_orbit(orbit, d)
            }
            fn mark_all(&mut self) {
                self.0.mark_all()
            }
            fn unmark_all(&mut self) {
                self.0.unmark_all()
            }
        }
    };
}

macro_rules! cell_marker {
    ($(#[$doc:meta])* $name:ident, $cleanup:expr) => {
        $(#[$doc])*
        pub struct $name<'a>(CellCore<'a>);

        impl<'a> $name<'a> {
            /// Leases a mark for cells of `orbit` on thread slot 0.
            pub fn new<M: CombinatorialMap + ?Sized>(map: &'a M, orbit: Orbit) -> Result<Self, MapError> {
                Self::on_thread(map, orbit, 0)
            }

            pub fn on_thread<M: CombinatorialMap + ?Sized>(
                map: &'a M,
                orbit: Orbit,
                thread: usize,
            ) -> Result<Self, MapError> {
                CellCore::new(map.generic(), orbit, thread, $cleanup, stringify!($name)).map(Self)
            }

            #[inline]
            pub fn orbit(&self) -> Orbit {
                self.0.orbit
            }
        }

        impl Marker for $name<'_> {
            #[inline]
            fn mark(&mut self, d: Dart) {
                self.0.set(d, true)
            }
            #[inline]
            fn unmark(&mut self, d: Dart) {
                self.0.set(d, false)
            }
            #[inline]
            fn is_marked(&self, d: Dart) -> bool {
                self.0.is_marked(d)
            }
            /// Same as [`mark`](Marker::mark) when `orbit` is the marker's
            /// orbit; other orbits mark each of their darts' cells.
            fn mark_orbit(&mut self, orbit: Orbit, d: Dart) {
                if orbit == self.0.orbit {
                    self.0.set(d, true);
                } else {
                    for x in self.0.lease.map.orbit_darts(orbit, d) {
                        self.0.set(x, true);
                    }
                }
            }
            fn unmark_orbit(&mut self, orbit: Orbit, d: Dart) {
                if orbit == self.0.orbit {
                    self.0.set(d, false);
                } else {
                    for x in self.0.lease.map.orbit_darts(orbit, d) {
                        self.0.set(x, false);
                    }
                }
            }
            fn mark_all(&mut self) {
                self.0.mark_all()
            }
            fn unmark_all(&mut self) {
                self.0.unmark_all()
            }
        }
    };
}

dart_marker!(
    /// Marks individual darts; clears its whole column when dropped.
    DartMarker,
    Cleanup::All
);
dart_marker!(
    /// Marks individual darts and remembers them, so dropping costs only the
    /// number of marked darts.
    DartMarkerStore,
    Cleanup::Store(Vec::new())
);
dart_marker!(
    /// Marks individual darts; the caller must unmark them all before drop.
    DartMarkerNoUnmark,
    Cleanup::Caller
);
cell_marker!(
    /// Marks whole cells; clears its whole column when dropped.
    CellMarker,
    Cleanup::All
);
cell_marker!(
    /// Marks whole cells and remembers them.
    CellMarkerStore,
    Cleanup::Store(Vec::new())
);
cell_marker!(
    /// Marks whole cells; the caller must unmark them all before drop.
    CellMarkerNoUnmark,
    Cleanup::Caller
);

impl DartMarkerStore<'_> {
    /// Darts marked so far (possibly with repetitions and already
    /// unmarked entries).
    pub fn marked_darts(&self) -> impl Iterator<Item = Dart> + '_ {
        let lines: &[u32] = match &self.0.cleanup {
            Cleanup::Store(v) => v,
            _ => &[],
        };
        lines.iter().map(|&l| Dart::new(l))
    }
}

/// Internal visited-set over the lines of one orbit container, used by
/// surgery that mutates the map while the set is alive.
///
/// It holds no borrow: every call takes the map, and [`release`] must be
/// called before the map is compacted. When the mark pool of the slot is
/// exhausted the set falls back to a hash set.
///
/// [`release`]: ScratchMarks::release
pub(crate) struct ScratchMarks {
    orbit: Orbit,
    mark: Option<Mark>,
    marked: Vec<u32>,
    spill: HashSet<u32>,
}

impl ScratchMarks {
    pub(crate) fn new(map: &GenericMap, orbit: Orbit) -> Self {
        let mark = match map.lease_mark(orbit, 0) {
            Ok(m) => Some(m),
            Err(e) => {
                log::trace!("scratch set on {orbit} spills to a hash set: {e}");
                None
            }
        };
        Self {
            orbit,
            mark,
            marked: Vec::new(),
            spill: HashSet::new(),
        }
    }

    /// Adds `line`; returns `false` if it was already present.
    pub(crate) fn insert(&mut self, map: &GenericMap, line: u32) -> bool {
        match self.mark {
            Some(m) => {
                let col = map.mark_column(self.orbit, 0);
                if col.is_marked(line as usize, m) {
                    return false;
                }
                col.mark(line as usize, m);
                self.marked.push(line);
                true
            }
            None => self.spill.insert(line),
        }
    }

    #[inline]
    pub(crate) fn contains(&self, map: &GenericMap, line: u32) -> bool {
        match self.mark {
            Some(m) => map.mark_column(self.orbit, 0).is_marked(line as usize, m),
            None => self.spill.contains(&line),
        }
    }

    #[inline]
    pub(crate) fn insert_dart(&mut self, map: &GenericMap, d: Dart) -> bool {
        self.insert(map, d.get())
    }

    #[inline]
    pub(crate) fn contains_dart(&self, map: &GenericMap, d: Dart) -> bool {
        self.contains(map, d.get())
    }

    /// Clears every line it marked and returns the mark to the pool.
    pub(crate) fn release(self, map: &GenericMap) {
        if let Some(m) = self.mark {
            let col = map.mark_column(self.orbit, 0);
            for l in self.marked {
                if (l as usize) < col.len() {
                    col.unmark(l as usize, m);
                }
            }
            map.release_mark(self.orbit, 0, m);
        }
    }
}

/// Visited darts of a read-only walk; released on drop.
pub(crate) struct VisitedDarts<'a> {
    map: &'a GenericMap,
    marks: Option<ScratchMarks>,
}

impl<'a> VisitedDarts<'a> {
    pub(crate) fn new(map: &'a GenericMap) -> Self {
        Self {
            map,
            marks: Some(ScratchMarks::new(map, Orbit::Dart)),
        }
    }

    /// Adds `d`; returns `false` if it was already visited.
    #[inline]
    pub(crate) fn insert(&mut self, d: Dart) -> bool {
        match &mut self.marks {
            Some(s) => s.insert_dart(self.map, d),
            None => false,
        }
    }

    #[inline]
    pub(crate) fn contains(&self, d: Dart) -> bool {
        self.marks.as_ref().is_some_and(|s| s.contains_dart(self.map, d))
    }
}

impl Drop for VisitedDarts<'_> {
    fn drop(&mut self) {
        if let Some(s) = self.marks.take() {
            s.release(self.map);
        }
    }
}
