//! GenericMap: dart storage, relations, marks and embeddings shared by
//! every map dimension.
//!
//! A `GenericMap` owns
//! - one [`AttributeContainer`] per [`Orbit`]; the `Dart` container is the
//!   dart allocator itself,
//! - the relation columns (`phi1`, `phi_1`, then `phi2` and `phi3` depending
//!   on [`MapKind`]), indexed by dart,
//! - an optional embedding column per orbit mapping darts to lines of that
//!   orbit's container,
//! - one [`MarkerSet`] per `(orbit, thread slot)` pair.
//!
//! Mark words are atomics and mark pools sit behind a mutex, so markers and
//! traversors only need `&GenericMap`; every topological mutation needs
//! `&mut`. The dimension-specific operators live in `map1`, `map2` and
//! `map3` as further `impl GenericMap` blocks plus thin public wrappers.

use crate::data::attribute_container::AttributeContainer;
use crate::data::marker_set::{Mark, MarkColumn, MarkerSet};
use crate::data::multi_vector::{AttributeColumn, AttributeMultiVector, AttributeValue};
use crate::map_error::MapError;
use crate::topology::dart::Dart;
use crate::topology::orbit::{NB_ORBITS, Orbit};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Embedding value of a dart whose cell has no line yet.
pub const EMBNULL: u32 = u32::MAX;

pub(crate) const PHI1: usize = 0;
pub(crate) const PHI_1: usize = 1;
pub(crate) const PHI2: usize = 2;
pub(crate) const PHI3: usize = 3;

/// Reserved bit of the thread-0 dart marks flagging boundary darts.
pub(crate) const BOUNDARY_MARK: Mark = Mark::from_position(0);

/// Dimension of a map, which fixes its relations and orbit rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapKind {
    Map1,
    Map2,
    Map3,
}

impl MapKind {
    pub const fn dimension(self) -> usize {
        match self {
            MapKind::Map1 => 1,
            MapKind::Map2 => 2,
            MapKind::Map3 => 3,
        }
    }

    /// Number of stored relation columns (`phi1`, `phi_1`, ...).
    pub(crate) const fn nb_relations(self) -> usize {
        self.dimension() + 1
    }

    pub const fn name(self) -> &'static str {
        match self {
            MapKind::Map1 => "Map1",
            MapKind::Map2 => "Map2",
            MapKind::Map3 => "Map3",
        }
    }

    pub fn from_name(name: &str) -> Option<MapKind> {
        match name {
            "Map1" => Some(MapKind::Map1),
            "Map2" => Some(MapKind::Map2),
            "Map3" => Some(MapKind::Map3),
            _ => None,
        }
    }
}

/// Construction-time settings of a map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Number of independent mark pools per orbit (one per worker thread).
    pub thread_slots: usize,
    /// Number of darts to reserve room for.
    pub reserve_darts: usize,
    /// Run the consistency check after every mutator in debug builds.
    pub validate_after_ops: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            thread_slots: 1,
            reserve_darts: 0,
            validate_after_ops: false,
        }
    }
}

/// Typed token naming one attribute column of one orbit.
///
/// Handles do not borrow the map; values are read and written through
/// [`GenericMap::attribute`] and friends. A handle whose column has been
/// removed resolves to nothing.
pub struct AttributeHandle<T> {
    orbit: Orbit,
    column: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AttributeHandle<T> {
    #[inline]
    pub fn orbit(&self) -> Orbit {
        self.orbit
    }
}

impl<T> Clone for AttributeHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AttributeHandle<T> {}

impl<T> std::fmt::Debug for AttributeHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeHandle")
            .field("orbit", &self.orbit)
            .field("column", &self.column)
            .finish()
    }
}

/// Storage and bookkeeping shared by [`Map1`](crate::topology::map1::Map1),
/// [`Map2`](crate::topology::map2::Map2) and
/// [`Map3`](crate::topology::map3::Map3).
#[derive(Debug)]
pub struct GenericMap {
    kind: MapKind,
    config: MapConfig,
    pub(crate) containers: Vec<AttributeContainer>,
    pub(crate) relations: Vec<AttributeMultiVector<Dart>>,
    pub(crate) embeddings: Vec<Option<AttributeMultiVector<u32>>>,
    /// Indexed by `thread * NB_ORBITS + orbit`.
    marker_sets: Vec<Mutex<MarkerSet>>,
    op_depth: u32,
    pub(crate) dirty: Vec<Dart>,
}

impl GenericMap {
    pub fn new(kind: MapKind) -> Self {
        Self::with_config(kind, MapConfig::default())
    }

    pub fn with_config(kind: MapKind, config: MapConfig) -> Self {
        let slots = config.thread_slots.max(1);
        let mut containers: Vec<_> = (0..NB_ORBITS).map(|_| AttributeContainer::new(slots)).collect();
        containers[Orbit::Dart.index()].reserve(config.reserve_darts);
        let relations = ["phi1", "phi_1", "phi2", "phi3"]
            .into_iter()
            .take(kind.nb_relations())
            .map(|name| AttributeMultiVector::new(name, 0))
            .collect();
        let mut marker_sets: Vec<_> = (0..NB_ORBITS * slots)
            .map(|_| Mutex::new(MarkerSet::new()))
            .collect();
        marker_sets[Orbit::Dart.index()].get_mut().reserve(BOUNDARY_MARK);
        Self {
            kind,
            config: MapConfig {
                thread_slots: slots,
                ..config
            },
            containers,
            relations,
            embeddings: (0..NB_ORBITS).map(|_| None).collect(),
            marker_sets,
            op_depth: 0,
            dirty: Vec::new(),
        }
    }

    #[inline]
    pub fn kind(&self) -> MapKind {
        self.kind
    }

    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    #[inline]
    pub fn container(&self, orbit: Orbit) -> &AttributeContainer {
        &self.containers[orbit.index()]
    }

    // --- darts ---

    /// Number of live darts.
    #[inline]
    pub fn nb_darts(&self) -> usize {
        self.containers[Orbit::Dart.index()].size()
    }

    #[inline]
    pub fn is_dart(&self, d: Dart) -> bool {
        !d.is_nil() && self.containers[Orbit::Dart.index()].is_used(d.get())
    }

    /// First live dart in storage order, or [`end`](Self::end).
    #[inline]
    pub fn begin(&self) -> Dart {
        let c = &self.containers[Orbit::Dart.index()];
        Self::line_to_dart(c, c.begin())
    }

    /// Live dart following `d` in storage order, or [`end`](Self::end).
    #[inline]
    pub fn next(&self, d: Dart) -> Dart {
        let c = &self.containers[Orbit::Dart.index()];
        Self::line_to_dart(c, c.next(d.get()))
    }

    /// End sentinel of dart iteration.
    #[inline]
    pub fn end(&self) -> Dart {
        Dart::NIL
    }

    fn line_to_dart(c: &AttributeContainer, line: u32) -> Dart {
        if line == c.end() { Dart::NIL } else { Dart::new(line) }
    }

    /// All live darts in storage order.
    pub fn darts(&self) -> impl Iterator<Item = Dart> + '_ {
        self.containers[Orbit::Dart.index()].lines().map(Dart::new)
    }

    pub(crate) fn ensure_dart(&self, d: Dart, op: &'static str) -> Result<(), MapError> {
        if self.is_dart(d) {
            Ok(())
        } else {
            log::trace!("{op}: dart {d} is not allocated");
            Err(MapError::InvalidHandle {
                what: "dart",
                index: d.get(),
            })
        }
    }

    /// Allocates a dart fixed by every relation and without embedding.
    pub(crate) fn new_dart(&mut self) -> Dart {
        let line = self.containers[Orbit::Dart.index()].insert_line();
        let cap = self.containers[Orbit::Dart.index()].capacity();
        let d = Dart::new(line);
        for rel in &mut self.relations {
            if rel.len() < cap {
                rel.resize(cap);
            }
            rel.as_mut_slice()[d.index()] = d;
        }
        for emb in self.embeddings.iter_mut().flatten() {
            if emb.len() < cap {
                emb.resize(cap);
            }
            emb.as_mut_slice()[d.index()] = EMBNULL;
        }
        self.touch(d);
        d
    }

    /// Frees a dart, releasing its share of every embedded line. Relations
    /// pointing at `d` must have been detached by the caller.
    pub(crate) fn delete_dart(&mut self, d: Dart) {
        for orbit in Orbit::ALL.into_iter().skip(1) {
            let Some(emb) = self.embeddings[orbit.index()].as_mut() else {
                continue;
            };
            let line = std::mem::replace(&mut emb.as_mut_slice()[d.index()], EMBNULL);
            if line != EMBNULL && self.containers[orbit.index()].unref_line(line).is_err() {
                log::warn!("dart {d} held a dangling {orbit} embedding {line}");
            }
        }
        if self.containers[Orbit::Dart.index()].remove_line(d.get()).is_err() {
            log::warn!("dart {d} deleted twice");
        }
    }

    /// Frees every dart.
    pub fn clear(&mut self) {
        let kind = self.kind;
        let config = self.config.clone();
        *self = Self::with_config(kind, config);
    }

    // --- relations ---

    #[inline]
    fn debug_check_rel(&self, rel: usize, d: Dart) {
        debug_assert!(
            !d.is_nil() && d.index() < self.relations[rel].len(),
            "relation {rel} read on dart {d}, which was never allocated"
        );
    }

    /// Successor of `d` in its face.
    ///
    /// # Panics
    /// If `d` is [`Dart::NIL`] or beyond the dart storage. Freed darts are
    /// not detected; check [`is_dart`](Self::is_dart) first when `d` may
    /// be stale.
    #[inline]
    pub fn phi1(&self, d: Dart) -> Dart {
        self.debug_check_rel(PHI1, d);
        self.relations[PHI1].as_slice()[d.index()]
    }

    /// Predecessor of `d` in its face. Panics like [`phi1`](Self::phi1).
    #[inline]
    pub fn phi_1(&self, d: Dart) -> Dart {
        self.debug_check_rel(PHI_1, d);
        self.relations[PHI_1].as_slice()[d.index()]
    }

    /// # Panics
    /// On a `Map1`, which has no `phi2`, and on the darts
    /// [`phi1`](Self::phi1) rejects.
    #[inline]
    pub fn phi2(&self, d: Dart) -> Dart {
        self.debug_check_rel(PHI2, d);
        self.relations[PHI2].as_slice()[d.index()]
    }

    /// # Panics
    /// On a `Map1` or `Map2`, which have no `phi3`, and on the darts
    /// [`phi1`](Self::phi1) rejects.
    #[inline]
    pub fn phi3(&self, d: Dart) -> Dart {
        self.debug_check_rel(PHI3, d);
        self.relations[PHI3].as_slice()[d.index()]
    }

    #[inline]
    pub(crate) fn set_rel(&mut self, rel: usize, d: Dart, e: Dart) {
        self.relations[rel].as_mut_slice()[d.index()] = e;
    }

    /// Records a dart whose cells may have changed in the current operation.
    #[inline]
    pub(crate) fn touch(&mut self, d: Dart) {
        if self.has_embedded_cells() {
            self.dirty.push(d);
        }
    }

    pub(crate) fn has_embedded_cells(&self) -> bool {
        self.embeddings.iter().skip(1).any(Option::is_some)
    }

    // --- operation scope ---

    pub(crate) fn begin_op(&mut self) {
        self.op_depth += 1;
    }

    /// Closes an operation scope; the outermost one repairs embeddings.
    pub(crate) fn end_op(&mut self) {
        self.op_depth = self.op_depth.saturating_sub(1);
        if self.op_depth > 0 {
            return;
        }
        self.update_embeddings();
        if self.config.validate_after_ops && cfg!(debug_assertions) {
            if let Err(e) = self.validate_topology() {
                log::warn!("map corrupted by last operation: {e}");
                debug_assert!(false, "map corrupted by last operation: {e}");
            }
        }
        crate::debug_invariants!(self.validate_topology(), "after topological operation");
    }

    // --- marks ---

    #[inline]
    pub fn nb_thread_slots(&self) -> usize {
        self.config.thread_slots
    }

    /// Adds one mark pool per orbit for an additional worker thread and
    /// returns its slot index.
    pub fn add_thread_marker(&mut self) -> usize {
        for c in &mut self.containers {
            c.add_mark_column();
        }
        self.marker_sets
            .extend((0..NB_ORBITS).map(|_| Mutex::new(MarkerSet::new())));
        self.config.thread_slots += 1;
        log::debug!("added thread slot {}", self.config.thread_slots - 1);
        self.config.thread_slots - 1
    }

    fn marker_set(&self, orbit: Orbit, thread: usize) -> Result<&Mutex<MarkerSet>, MapError> {
        if thread >= self.config.thread_slots {
            return Err(MapError::InvalidThreadSlot {
                thread,
                slots: self.config.thread_slots,
            });
        }
        Ok(&self.marker_sets[thread * NB_ORBITS + orbit.index()])
    }

    /// Leases a mark of `orbit` on `thread`.
    pub(crate) fn lease_mark(&self, orbit: Orbit, thread: usize) -> Result<Mark, MapError> {
        let mark = self
            .marker_set(orbit, thread)?
            .lock()
            .get_new_mark()
            .ok_or(MapError::MarkPoolExhausted { orbit, thread })?;
        log::trace!("lease mark {} of {orbit} on thread {thread}", mark.position());
        Ok(mark)
    }

    pub(crate) fn release_mark(&self, orbit: Orbit, thread: usize, mark: Mark) {
        match self.marker_set(orbit, thread) {
            Ok(set) => {
                if !set.lock().release_mark(mark) {
                    log::warn!("mark {} of {orbit} released twice", mark.position());
                }
                log::trace!("release mark {} of {orbit} on thread {thread}", mark.position());
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    #[inline]
    pub(crate) fn mark_column(&self, orbit: Orbit, thread: usize) -> &MarkColumn {
        self.containers[orbit.index()].marks(thread)
    }

    /// Number of marks currently leased on `(orbit, thread)`.
    pub fn nb_leased_marks(&self, orbit: Orbit, thread: usize) -> u32 {
        self.marker_set(orbit, thread)
            .map(|s| s.lock().nb_used())
            .unwrap_or(0)
    }

    // --- boundary ---

    #[inline]
    pub fn is_boundary_marked(&self, d: Dart) -> bool {
        self.mark_column(Orbit::Dart, 0).is_marked(d.index(), BOUNDARY_MARK)
    }

    #[inline]
    pub(crate) fn mark_boundary(&self, d: Dart) {
        self.mark_column(Orbit::Dart, 0).mark(d.index(), BOUNDARY_MARK);
    }

    #[inline]
    pub(crate) fn unmark_boundary(&self, d: Dart) {
        self.mark_column(Orbit::Dart, 0).unmark(d.index(), BOUNDARY_MARK);
    }

    pub(crate) fn boundary_mark_orbit(&self, orbit: Orbit, d: Dart) {
        self.foreach_dart_of_orbit(orbit, d, |x| {
            self.mark_boundary(x);
            false
        });
    }

    pub(crate) fn boundary_unmark_orbit(&self, orbit: Orbit, d: Dart) {
        self.foreach_dart_of_orbit(orbit, d, |x| {
            self.unmark_boundary(x);
            false
        });
    }

    /// `true` if some dart of the `orbit` of `d` is boundary.
    pub fn is_boundary_orbit(&self, orbit: Orbit, d: Dart) -> bool {
        self.foreach_dart_of_orbit(orbit, d, |x| self.is_boundary_marked(x))
    }

    // --- attributes ---

    #[inline]
    pub fn is_orbit_embedded(&self, orbit: Orbit) -> bool {
        orbit == Orbit::Dart || self.embeddings[orbit.index()].is_some()
    }

    /// Line of the cell of `d` in the `orbit` container, or [`EMBNULL`].
    #[inline]
    pub fn embedding(&self, orbit: Orbit, d: Dart) -> u32 {
        if orbit == Orbit::Dart {
            return d.get();
        }
        self.embeddings[orbit.index()]
            .as_ref()
            .and_then(|e| e.get(d.index()).copied())
            .unwrap_or(EMBNULL)
    }

    /// Adds a typed attribute on `orbit`, embedding the orbit first if
    /// needed.
    pub fn add_attribute<T: AttributeValue>(
        &mut self,
        orbit: Orbit,
        name: &str,
    ) -> Result<AttributeHandle<T>, MapError> {
        self.init_orbit_embedding(orbit);
        let column = self.containers[orbit.index()]
            .add_column::<T>(name)
            .ok_or_else(|| MapError::DuplicateAttribute {
                orbit,
                name: name.to_string(),
            })?;
        Ok(AttributeHandle {
            orbit,
            column,
            _marker: PhantomData,
        })
    }

    /// Looks up an existing attribute by name and value type.
    pub fn get_attribute<T: AttributeValue>(
        &self,
        orbit: Orbit,
        name: &str,
    ) -> Result<AttributeHandle<T>, MapError> {
        let c = &self.containers[orbit.index()];
        let column = c.find_column(name).ok_or_else(|| MapError::UnknownAttribute {
            orbit,
            name: name.to_string(),
        })?;
        if c.column::<T>(column).is_none() {
            let found = c.column_dyn(column).map_or("?", |col| col.type_name());
            return Err(MapError::AttributeTypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
                found,
            });
        }
        Ok(AttributeHandle {
            orbit,
            column,
            _marker: PhantomData,
        })
    }

    /// Removes an attribute column. Embeddings stay in place.
    pub fn remove_attribute<T>(&mut self, handle: AttributeHandle<T>) -> bool {
        self.containers[handle.orbit.index()].remove_column(handle.column)
    }

    /// Value attached to the cell of `d`.
    pub fn attribute<T: AttributeValue>(&self, handle: &AttributeHandle<T>, d: Dart) -> Option<&T> {
        let line = self.embedding(handle.orbit, d);
        if line == EMBNULL {
            return None;
        }
        self.attribute_line(handle, line)
    }

    /// Mutable value attached to the cell of `d`. A cell without a line gets
    /// a fresh one first.
    pub fn attribute_mut<T: AttributeValue>(
        &mut self,
        handle: &AttributeHandle<T>,
        d: Dart,
    ) -> Option<&mut T> {
        if !self.is_dart(d) {
            return None;
        }
        let mut line = self.embedding(handle.orbit, d);
        if line == EMBNULL {
            line = self.set_orbit_embedding_on_new_cell(handle.orbit, d);
        }
        self.attribute_line_mut(handle, line)
    }

    /// Value stored on container line `line`, bypassing topology.
    pub fn attribute_line<T: AttributeValue>(
        &self,
        handle: &AttributeHandle<T>,
        line: u32,
    ) -> Option<&T> {
        self.containers[handle.orbit.index()]
            .column::<T>(handle.column)?
            .get(line as usize)
    }

    pub fn attribute_line_mut<T: AttributeValue>(
        &mut self,
        handle: &AttributeHandle<T>,
        line: u32,
    ) -> Option<&mut T> {
        self.containers[handle.orbit.index()]
            .column_mut::<T>(handle.column)?
            .get_mut(line as usize)
    }

    /// Allocated lines of the container behind `handle`.
    pub fn attribute_lines<T>(&self, handle: &AttributeHandle<T>) -> impl Iterator<Item = u32> + '_ {
        self.containers[handle.orbit.index()].lines()
    }
}

impl Clone for GenericMap {
    /// Clones topology, embeddings and attributes. Mark pools of the clone
    /// start empty apart from the boundary mark.
    fn clone(&self) -> Self {
        let mut out = Self::with_config(self.kind, self.config.clone());
        out.containers = self.containers.clone();
        out.relations = self.relations.clone();
        out.embeddings = self.embeddings.clone();
        for d in self.darts() {
            if self.is_boundary_marked(d) {
                out.mark_boundary(d);
            }
        }
        out
    }
}

/// Common interface of `Map1`, `Map2` and `Map3`.
///
/// Implementors only expose their [`GenericMap`]; every storage-level query
/// is provided on top of it.
pub trait CombinatorialMap {
    fn generic(&self) -> &GenericMap;
    fn generic_mut(&mut self) -> &mut GenericMap;

    /// Full consistency check of the relations. Logs and returns `false` on
    /// the first violation.
    fn check(&self) -> bool {
        match self.generic().validate_topology() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("check failed: {e}");
                false
            }
        }
    }

    /// Runs `f` as one topological operation: embeddings touched by `f` are
    /// repaired when the outermost operation returns.
    fn edit<R, F>(&mut self, f: F) -> Result<R, MapError>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<R, MapError>,
    {
        self.generic_mut().begin_op();
        let r = f(self);
        self.generic_mut().end_op();
        r
    }

    fn kind(&self) -> MapKind {
        self.generic().kind()
    }

    fn dimension(&self) -> usize {
        self.generic().dimension()
    }

    fn nb_darts(&self) -> usize {
        self.generic().nb_darts()
    }

    fn phi1(&self, d: Dart) -> Dart {
        self.generic().phi1(d)
    }

    fn phi_1(&self, d: Dart) -> Dart {
        self.generic().phi_1(d)
    }

    fn begin(&self) -> Dart {
        self.generic().begin()
    }

    fn next(&self, d: Dart) -> Dart {
        self.generic().next(d)
    }

    fn end(&self) -> Dart {
        Dart::NIL
    }

    fn is_boundary_marked(&self, d: Dart) -> bool {
        self.generic().is_boundary_marked(d)
    }

    fn foreach_dart_of_orbit<F>(&self, orbit: Orbit, d: Dart, f: F) -> bool
    where
        F: FnMut(Dart) -> bool,
    {
        self.generic().foreach_dart_of_orbit(orbit, d, f)
    }

    fn foreach_dart_of_vertex<F: FnMut(Dart) -> bool>(&self, d: Dart, f: F) -> bool {
        self.foreach_dart_of_orbit(Orbit::Vertex, d, f)
    }

    fn foreach_dart_of_edge<F: FnMut(Dart) -> bool>(&self, d: Dart, f: F) -> bool {
        self.foreach_dart_of_orbit(Orbit::Edge, d, f)
    }

    fn foreach_dart_of_face<F: FnMut(Dart) -> bool>(&self, d: Dart, f: F) -> bool {
        self.foreach_dart_of_orbit(Orbit::Face, d, f)
    }

    fn foreach_dart_of_volume<F: FnMut(Dart) -> bool>(&self, d: Dart, f: F) -> bool {
        self.foreach_dart_of_orbit(Orbit::Volume, d, f)
    }

    fn is_orbit_embedded(&self, orbit: Orbit) -> bool {
        self.generic().is_orbit_embedded(orbit)
    }

    fn embedding(&self, orbit: Orbit, d: Dart) -> u32 {
        self.generic().embedding(orbit, d)
    }

    /// Gives every cell of `orbit` its own container line.
    fn init_orbit_embedding(&mut self, orbit: Orbit) {
        self.generic_mut().init_orbit_embedding(orbit)
    }

    fn add_attribute<T: AttributeValue>(
        &mut self,
        orbit: Orbit,
        name: &str,
    ) -> Result<AttributeHandle<T>, MapError> {
        self.generic_mut().add_attribute(orbit, name)
    }

    fn get_attribute<T: AttributeValue>(
        &self,
        orbit: Orbit,
        name: &str,
    ) -> Result<AttributeHandle<T>, MapError> {
        self.generic().get_attribute(orbit, name)
    }

    fn attribute<T: AttributeValue>(&self, handle: &AttributeHandle<T>, d: Dart) -> Option<&T> {
        self.generic().attribute(handle, d)
    }

    fn attribute_mut<T: AttributeValue>(
        &mut self,
        handle: &AttributeHandle<T>,
        d: Dart,
    ) -> Option<&mut T> {
        self.generic_mut().attribute_mut(handle, d)
    }

    fn add_thread_marker(&mut self) -> usize {
        self.generic_mut().add_thread_marker()
    }

    /// Removes holes from every container; see [`GenericMap::compact`].
    fn compact(&mut self) {
        self.generic_mut().compact()
    }
}

impl CombinatorialMap for GenericMap {
    fn generic(&self) -> &GenericMap {
        self
    }

    fn generic_mut(&mut self) -> &mut GenericMap {
        self
    }
}
