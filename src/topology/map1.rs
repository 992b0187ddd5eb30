//! Map1: oriented cycles of darts under `phi1`.
//!
//! The cycle primitives defined here (`phi1_sew`, `cut1`, `split_cycle`...)
//! are shared by the higher dimensions, which build every face surgery
//! from them.

use crate::map_error::MapError;
use crate::topology::dart::Dart;
use crate::topology::generic_map::{CombinatorialMap, GenericMap, MapConfig, MapKind, PHI_1, PHI1};
use crate::topology::orbit::Orbit;

impl GenericMap {
    /// Exchanges the `phi1` successors of `d` and `e`.
    ///
    /// On two distinct cycles this merges them; on one cycle it splits it.
    pub(crate) fn phi1_sew(&mut self, d: Dart, e: Dart) {
        let f = self.phi1(d);
        let g = self.phi1(e);
        self.set_rel(PHI1, d, g);
        self.set_rel(PHI1, e, f);
        self.set_rel(PHI_1, g, d);
        self.set_rel(PHI_1, f, e);
        for x in [d, e, f, g] {
            self.touch(x);
        }
    }

    /// Takes `phi1(d)` out of its cycle, leaving it as a fixed point.
    pub(crate) fn phi1_unsew(&mut self, d: Dart) {
        let e = self.phi1(d);
        let f = self.phi1(e);
        self.set_rel(PHI1, d, f);
        self.set_rel(PHI_1, f, d);
        self.set_rel(PHI1, e, e);
        self.set_rel(PHI_1, e, e);
        for x in [d, e, f] {
            self.touch(x);
        }
    }

    /// Allocates a cycle of `n` darts.
    pub(crate) fn new_cycle(&mut self, n: usize) -> Dart {
        let d = self.new_dart();
        for _ in 1..n {
            let e = self.new_dart();
            self.phi1_sew(d, e);
        }
        d
    }

    /// Frees every dart of the cycle of `d`.
    pub(crate) fn delete_cycle(&mut self, d: Dart) {
        for x in self.orbit_darts(Orbit::Face2, d) {
            self.delete_dart(x);
        }
    }

    /// Number of darts in the cycle of `d`.
    pub(crate) fn cycle_degree(&self, d: Dart) -> usize {
        let mut n = 1;
        let mut x = self.phi1(d);
        while x != d {
            n += 1;
            x = self.phi1(x);
        }
        n
    }

    pub(crate) fn same_cycle(&self, d: Dart, e: Dart) -> bool {
        let mut x = d;
        loop {
            if x == e {
                return true;
            }
            x = self.phi1(x);
            if x == d {
                return false;
            }
        }
    }

    /// Inserts a new dart right after `d`. The new dart inherits the
    /// boundary state of `d`.
    pub(crate) fn cut1(&mut self, d: Dart) -> Dart {
        let e = self.new_dart();
        if self.is_boundary_marked(d) {
            self.mark_boundary(e);
        }
        self.phi1_sew(d, e);
        e
    }

    /// Removes `phi1(d)`; the two edges ending and starting there merge.
    pub(crate) fn uncut1(&mut self, d: Dart) {
        let e = self.phi1(d);
        self.phi1_unsew(d);
        self.delete_dart(e);
    }

    /// Removes `d`; its two end points merge.
    pub(crate) fn collapse1(&mut self, d: Dart) {
        let p = self.phi_1(d);
        self.phi1_unsew(p);
        self.delete_dart(d);
    }

    /// Splits the cycle of `d` and `e` between `phi_1(d)`/`d` and
    /// `phi_1(e)`/`e`. Also merges two distinct cycles.
    #[inline]
    pub(crate) fn split_cycle(&mut self, d: Dart, e: Dart) {
        let (dd, ee) = (self.phi_1(d), self.phi_1(e));
        self.phi1_sew(dd, ee);
    }

    /// Reverses the orientation of the cycle of `d`.
    pub(crate) fn reverse_cycle1(&mut self, d: Dart) {
        for x in self.orbit_darts(Orbit::Face2, d) {
            let (n, p) = (self.phi1(x), self.phi_1(x));
            self.set_rel(PHI1, x, p);
            self.set_rel(PHI_1, x, n);
            self.touch(x);
        }
    }
}

/// A 1-dimensional map: a set of oriented polygons.
#[derive(Debug, Clone)]
pub struct Map1 {
    map: GenericMap,
}

impl Default for Map1 {
    fn default() -> Self {
        Self::new()
    }
}

impl CombinatorialMap for Map1 {
    fn generic(&self) -> &GenericMap {
        &self.map
    }

    fn generic_mut(&mut self) -> &mut GenericMap {
        &mut self.map
    }
}

impl Map1 {
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    pub fn with_config(config: MapConfig) -> Self {
        Self {
            map: GenericMap::with_config(MapKind::Map1, config),
        }
    }

    pub(crate) fn from_generic(map: GenericMap) -> Self {
        Self { map }
    }

    /// Creates a cycle of `nb_edges` darts and returns one of them.
    pub fn new_cycle(&mut self, nb_edges: usize) -> Result<Dart, MapError> {
        if nb_edges == 0 {
            return Err(MapError::precondition("new_cycle", "a cycle needs at least one edge"));
        }
        self.edit(|m| Ok(m.map.new_cycle(nb_edges)))
    }

    /// Alias of [`new_cycle`](Self::new_cycle).
    pub fn new_face(&mut self, nb_edges: usize) -> Result<Dart, MapError> {
        self.new_cycle(nb_edges)
    }

    pub fn delete_cycle(&mut self, d: Dart) -> Result<(), MapError> {
        self.map.ensure_dart(d, "delete_cycle")?;
        self.edit(|m| {
            m.map.delete_cycle(d);
            Ok(())
        })
    }

    /// Alias of [`delete_cycle`](Self::delete_cycle).
    pub fn delete_face(&mut self, d: Dart) -> Result<(), MapError> {
        self.delete_cycle(d)
    }

    /// Inserts a dart after `d`, cutting its edge in two. Edge attributes
    /// are copied onto both halves.
    pub fn cut_edge(&mut self, d: Dart) -> Result<Dart, MapError> {
        self.map.ensure_dart(d, "cut_edge")?;
        self.edit(|m| {
            let e = m.map.cut1(d);
            for orbit in [Orbit::Edge, Orbit::Edge1, Orbit::Edge2] {
                m.map.inherit_cell(orbit, d, e);
            }
            Ok(e)
        })
    }

    /// Removes `phi1(d)`, merging the edges of `d` and `phi1(d)`.
    pub fn uncut_edge(&mut self, d: Dart) -> Result<(), MapError> {
        self.map.ensure_dart(d, "uncut_edge")?;
        if self.map.phi1(d) == d {
            return Err(MapError::precondition("uncut_edge", "cycle has a single edge"));
        }
        self.edit(|m| {
            m.map.uncut1(d);
            Ok(())
        })
    }

    /// Removes the dart following `d`; the end points of that edge merge.
    pub fn collapse_edge(&mut self, d: Dart) -> Result<(), MapError> {
        self.map.ensure_dart(d, "collapse_edge")?;
        if self.map.phi1(d) == d {
            return Err(MapError::precondition("collapse_edge", "cycle has a single edge"));
        }
        self.edit(|m| {
            let e = m.map.phi1(d);
            m.map.collapse1(e);
            Ok(())
        })
    }

    /// Splits one cycle into two: the first runs from `d` to `phi_1(e)`,
    /// the second from `e` to `phi_1(d)`.
    pub fn split_cycle(&mut self, d: Dart, e: Dart) -> Result<(), MapError> {
        self.map.ensure_dart(d, "split_cycle")?;
        self.map.ensure_dart(e, "split_cycle")?;
        if d == e || !self.map.same_cycle(d, e) {
            return Err(MapError::precondition("split_cycle", "darts must be distinct darts of one cycle"));
        }
        self.edit(|m| {
            m.map.split_cycle(d, e);
            Ok(())
        })
    }

    /// Merges two distinct cycles, splicing `e`'s cycle in before `d`.
    pub fn merge_cycles(&mut self, d: Dart, e: Dart) -> Result<(), MapError> {
        self.map.ensure_dart(d, "merge_cycles")?;
        self.map.ensure_dart(e, "merge_cycles")?;
        if self.map.same_cycle(d, e) {
            return Err(MapError::precondition("merge_cycles", "darts belong to the same cycle"));
        }
        self.edit(|m| {
            m.map.split_cycle(d, e);
            Ok(())
        })
    }

    /// Splits the face of `d` and `e` by cutting one new dart in front of
    /// each and closing each half with it. Returns the two new darts; the
    /// first closes the half containing `d`.
    pub fn split_face(&mut self, d: Dart, e: Dart) -> Result<(Dart, Dart), MapError> {
        self.map.ensure_dart(d, "split_face")?;
        self.map.ensure_dart(e, "split_face")?;
        if d == e || !self.map.same_cycle(d, e) {
            return Err(MapError::precondition("split_face", "darts must be distinct darts of one face"));
        }
        self.edit(|m| {
            let g = &mut m.map;
            let (dd, ee) = (g.phi_1(d), g.phi_1(e));
            let x = g.cut1(dd);
            let y = g.cut1(ee);
            g.phi1_sew(dd, ee);
            Ok((x, y))
        })
    }

    /// Joins the cycles of `d` and `e` with a new pair of darts, one
    /// inserted before `d`, the other before `e`. Returns them.
    pub fn link_vertices(&mut self, d: Dart, e: Dart) -> Result<(Dart, Dart), MapError> {
        self.map.ensure_dart(d, "link_vertices")?;
        self.map.ensure_dart(e, "link_vertices")?;
        if self.map.same_cycle(d, e) {
            return Err(MapError::precondition("link_vertices", "darts belong to the same cycle"));
        }
        self.edit(|m| {
            let g = &mut m.map;
            let (dd, ee) = (g.phi_1(d), g.phi_1(e));
            let x = g.new_dart();
            let y = g.new_dart();
            g.phi1_sew(dd, x);
            g.phi1_sew(ee, y);
            g.phi1_sew(x, y);
            Ok((x, y))
        })
    }

    /// Reverses the orientation of the cycle of `d`.
    pub fn reverse_cycle(&mut self, d: Dart) -> Result<(), MapError> {
        self.map.ensure_dart(d, "reverse_cycle")?;
        self.edit(|m| {
            m.map.reverse_cycle1(d);
            Ok(())
        })
    }

    /// Number of edges of the cycle of `d`.
    pub fn cycle_degree(&self, d: Dart) -> usize {
        self.map.cycle_degree(d)
    }

    pub fn face_degree(&self, d: Dart) -> usize {
        self.map.cycle_degree(d)
    }

    pub fn same_cycle(&self, d: Dart, e: Dart) -> bool {
        self.map.same_cycle(d, e)
    }

    pub fn is_cycle_triangle(&self, d: Dart) -> bool {
        self.map.phi1(self.map.phi1(self.map.phi1(d))) == d && self.map.phi1(d) != d
    }
}
