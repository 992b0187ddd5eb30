//! Map2: oriented surfaces. `phi2` pairs the two darts of each edge.
//!
//! Open surfaces are closed by boundary faces: every dart that has no real
//! neighbour is `phi2`-sewn to a dart of a synthetic face whose darts carry
//! the boundary mark. Sewing two faces splices those boundary faces away;
//! unsewing re-creates them. `phi2` fixed points only appear in meshes
//! built explicitly without boundary (`new_face_with(n, false)`), and are
//! closed with [`Map2::close_hole`] / [`Map2::close_map`].
//!
//! The surgeries are implemented on [`GenericMap`] so that `Map3` can
//! reuse them inside each volume.

use crate::map_error::MapError;
use crate::topology::dart::Dart;
use crate::topology::generic_map::{CombinatorialMap, GenericMap, MapConfig, MapKind, PHI2};
use crate::topology::marker::VisitedDarts;
use crate::topology::orbit::Orbit;

impl GenericMap {
    pub(crate) fn phi2_sew(&mut self, d: Dart, e: Dart) {
        self.set_rel(PHI2, d, e);
        self.set_rel(PHI2, e, d);
        self.touch(d);
        self.touch(e);
    }

    pub(crate) fn phi2_unsew(&mut self, d: Dart) {
        let e = self.phi2(d);
        self.set_rel(PHI2, d, d);
        self.set_rel(PHI2, e, e);
        self.touch(d);
        self.touch(e);
    }

    /// `alpha1(d) = phi2(phi_1(d))` on surfaces: next dart around the
    /// origin of `d`.
    #[inline]
    pub(crate) fn alpha1_2(&self, d: Dart) -> Dart {
        self.phi2(self.phi_1(d))
    }

    /// `alpha_1(d) = phi1(phi2(d))` on surfaces.
    #[inline]
    pub(crate) fn alpha_1_2(&self, d: Dart) -> Dart {
        self.phi1(self.phi2(d))
    }

    /// Creates a face of `n` edges, optionally capped by a boundary face.
    pub(crate) fn new_face2(&mut self, n: usize, with_boundary: bool) -> Dart {
        let d = self.new_cycle(n);
        if with_boundary {
            let mut e = self.new_cycle(n);
            self.boundary_mark_orbit(Orbit::Face2, e);
            let mut it = d;
            for _ in 0..n {
                self.phi2_sew(it, e);
                it = self.phi1(it);
                e = self.phi_1(e);
            }
        }
        d
    }

    /// Boundary dart starting at the vertex of `d`, if any.
    pub(crate) fn find_boundary_edge_of_vertex(&self, d: Dart) -> Option<Dart> {
        let mut found = None;
        self.foreach_dart_of_orbit(Orbit::Vertex2, d, |x| {
            if self.is_boundary_marked(x) {
                found = Some(x);
                true
            } else {
                false
            }
        });
        found
    }

    /// Sews two real faces along `d` and `e`, both currently facing the
    /// boundary, and splices the two boundary edges out.
    pub(crate) fn sew_faces2(&mut self, d: Dart, e: Dart) {
        let dd = self.phi2(d);
        let ee = self.phi2(e);
        self.phi2_unsew(d);
        self.phi2_unsew(e);
        self.phi1_sew(dd, ee);
        for x in [dd, ee] {
            if self.phi1(x) != x {
                let p = self.phi_1(x);
                self.phi1_unsew(p);
            }
        }
        self.delete_dart(dd);
        self.delete_dart(ee);
        self.phi2_sew(d, e);
    }

    /// Detaches the faces of `d` and `phi2(d)` and caps both sides with a
    /// new boundary edge linked into the boundary around each end vertex.
    pub(crate) fn unsew_faces2(&mut self, d: Dart) {
        let dd = self.phi2(d);
        let e = self.new_cycle(2);
        let ee = self.phi1(e);
        self.mark_boundary(e);
        self.mark_boundary(ee);
        let f = self.find_boundary_edge_of_vertex(d);
        let ff = self.find_boundary_edge_of_vertex(dd);
        if let Some(f) = f {
            let p = self.phi_1(f);
            self.phi1_sew(e, p);
        }
        if let Some(ff) = ff {
            let p = self.phi_1(ff);
            self.phi1_sew(ee, p);
        }
        self.phi2_unsew(d);
        self.phi2_sew(d, e);
        self.phi2_sew(dd, ee);
    }

    /// Cuts the edge of `d` on both sides. Returns the new dart following
    /// `d`.
    pub(crate) fn cut_edge2(&mut self, d: Dart) -> Dart {
        let e = self.phi2(d);
        if e == d {
            return self.cut1(d);
        }
        self.phi2_unsew(d);
        let nd = self.cut1(d);
        let ne = self.cut1(e);
        self.phi2_sew(d, ne);
        self.phi2_sew(e, nd);
        nd
    }

    /// Inverse of [`cut_edge2`](Self::cut_edge2) applied to `d`.
    pub(crate) fn uncut_edge2(&mut self, d: Dart) {
        let nd = self.phi1(d);
        let ne = self.phi2(d);
        if ne == d {
            self.uncut1(d);
            return;
        }
        let e = self.phi2(nd);
        self.phi2_unsew(d);
        self.phi2_unsew(e);
        self.uncut1(d);
        self.uncut1(e);
        self.phi2_sew(d, e);
    }

    /// Removes a 2-gon, sewing its two neighbours to each other.
    pub(crate) fn collapse_degenerated_face(&mut self, d: Dart) {
        let e = self.phi1(d);
        if e == d {
            log::warn!("face of dart {d} degenerated to one edge; left in place");
            return;
        }
        if self.phi1(e) != d {
            return;
        }
        let d2 = self.phi2(d);
        let e2 = self.phi2(e);
        if d2 != d {
            self.phi2_unsew(d);
        }
        if e2 != e {
            self.phi2_unsew(e);
        }
        if d2 != d && e2 != e {
            self.phi2_sew(d2, e2);
        }
        self.delete_cycle(d);
    }

    /// Contracts the edge of `d` to a point. Returns a dart of the
    /// resulting vertex, preferring a non-boundary one.
    pub(crate) fn collapse_edge2(&mut self, d: Dart, del_degenerate: bool) -> Option<Dart> {
        let e = self.phi2(d);
        let mut sides = vec![d];
        if e != d {
            self.phi2_unsew(d);
            sides.insert(0, e);
        }
        let mut candidates = Vec::with_capacity(4);
        for x in sides {
            let f = self.phi1(x);
            let p = self.phi_1(x);
            candidates.push(f);
            let around = self.phi2(p);
            if around != p {
                candidates.push(around);
            }
            self.collapse1(x);
            if del_degenerate && f != x {
                match self.cycle_degree(f) {
                    1 => log::warn!("face of dart {f} degenerated to one edge; left in place"),
                    2 => self.collapse_degenerated_face(f),
                    _ => {}
                }
            }
        }
        let alive: Vec<Dart> = candidates.into_iter().filter(|&c| self.is_dart(c)).collect();
        alive
            .iter()
            .copied()
            .find(|&c| !self.is_boundary_marked(c))
            .or_else(|| alive.first().copied())
    }

    /// Splits the face of `d` and `e` with a new edge from the origin of
    /// `d` to the origin of `e`.
    pub(crate) fn split_face2(&mut self, d: Dart, e: Dart) {
        let dd = self.phi_1(d);
        let ee = self.phi_1(e);
        self.cut1(dd);
        self.cut1(ee);
        let x = self.phi1(dd);
        let y = self.phi1(ee);
        self.phi1_sew(dd, ee);
        self.phi2_sew(x, y);
    }

    /// Merges the faces on both sides of the edge of `d` and removes the
    /// edge.
    pub(crate) fn merge_faces2(&mut self, d: Dart) {
        let e = self.phi2(d);
        self.phi2_unsew(d);
        let e1 = self.phi1(e);
        self.split_cycle(d, e1);
        let d1 = self.phi1(d);
        self.split_cycle(e, d1);
        self.delete_cycle(d);
    }

    /// Splits the vertex shared by `d` and `e` with a new edge.
    pub(crate) fn split_vertex2(&mut self, d: Dart, e: Dart) {
        let dd = self.phi2(d);
        let ee = self.phi2(e);
        self.cut1(dd);
        self.cut1(ee);
        let x = self.phi1(dd);
        let y = self.phi1(ee);
        self.phi2_sew(x, y);
    }

    /// Removes the vertex of `d`, merging its incident faces.
    pub(crate) fn delete_vertex2(&mut self, d: Dart) {
        let mut vit = d;
        loop {
            let f = self.phi_1(self.phi2(vit));
            self.phi1_sew(vit, f);
            vit = self.alpha1_2(vit);
            if vit == d {
                break;
            }
        }
        self.delete_cycle(d);
    }

    /// Rotates the edge of `d` forward inside its two faces.
    pub(crate) fn flip_edge2(&mut self, d: Dart) {
        let e = self.phi2(d);
        let d_next = self.phi1(d);
        let e_next = self.phi1(e);
        let d_prev = self.phi_1(d);
        let e_prev = self.phi_1(e);
        self.phi1_sew(d, e_prev);
        self.phi1_sew(e, d_prev);
        self.phi1_sew(d, d_next);
        self.phi1_sew(e, e_next);
    }

    /// Rotates the edge of `d` backward inside its two faces.
    pub(crate) fn flip_back_edge2(&mut self, d: Dart) {
        let e = self.phi2(d);
        let d_prev = self.phi_1(d);
        let e_prev = self.phi_1(e);
        self.phi1_sew(d, e_prev);
        self.phi1_sew(e, d_prev);
        let a = self.phi_1(e_prev);
        self.phi1_sew(d, a);
        let b = self.phi_1(d_prev);
        self.phi1_sew(e, b);
    }

    /// Fuses the faces of `d` and `e` (same degree, opposite walk) by
    /// sewing their neighbours to each other, then deletes both faces.
    pub(crate) fn merge_volumes2(&mut self, d: Dart, e: Dart) {
        let mut fd = d;
        let mut fe = e;
        loop {
            let fd2 = self.phi2(fd);
            let fe2 = self.phi2(fe);
            if fd2 != fe {
                self.phi2_unsew(fd);
                self.phi2_unsew(fe);
                if fd2 != fd && fe2 != fe {
                    self.phi2_sew(fd2, fe2);
                }
                self.phi2_sew(fd, fe);
            }
            fd = self.phi1(fd);
            fe = self.phi_1(fe);
            if fd == d {
                break;
            }
        }
        self.delete_cycle(d);
        self.delete_cycle(e);
    }

    /// Caps the hole bordered by the `phi2`-fixed dart `d` with a new face.
    /// Returns the first dart of the cap and its degree.
    pub(crate) fn close_hole2(&mut self, d: Dart) -> Result<(Dart, usize), MapError> {
        let first = self.new_dart();
        self.phi2_sew(d, first);
        let mut prev = first;
        let mut x = d;
        let mut count = 1usize;
        let limit = self.nb_darts();
        loop {
            let mut y = self.phi_1(x);
            let mut turns = 0usize;
            while y != d && self.phi2(y) != y {
                y = self.phi_1(self.phi2(y));
                turns += 1;
                if turns > limit {
                    return Err(MapError::malformed(x, "hole border does not close"));
                }
            }
            if y == d {
                break;
            }
            let next = self.new_dart();
            self.phi2_sew(y, next);
            self.phi1_sew(prev, next);
            prev = next;
            x = y;
            count += 1;
        }
        Ok((first, count))
    }

    /// Deletes every dart of the connected component of `d`.
    pub(crate) fn delete_cc(&mut self, d: Dart) {
        for x in self.orbit_darts(Orbit::Volume, d) {
            self.delete_dart(x);
        }
    }

    pub(crate) fn vertex_degree2(&self, d: Dart) -> usize {
        let mut n = 0;
        let mut open = false;
        let mut x = d;
        loop {
            n += 1;
            let p = self.phi_1(x);
            let y = self.phi2(p);
            if y == p {
                open = true;
                break;
            }
            x = y;
            if x == d {
                break;
            }
        }
        if open {
            // Walk the other side of the open fan.
            let mut x = d;
            loop {
                let t = self.phi2(x);
                if t == x {
                    break;
                }
                x = self.phi1(t);
                n += 1;
            }
            n += 1;
        }
        n
    }

    /// `true` if any dart of the face of `d` is sewn to the boundary (or
    /// unsewn).
    pub(crate) fn is_face_incident_to_boundary2(&self, d: Dart) -> bool {
        self.foreach_dart_of_orbit(Orbit::Face2, d, |x| {
            let y = self.phi2(x);
            y == x || self.is_boundary_marked(y)
        })
    }
}

/// A 2-dimensional map: an orientable surface mesh.
#[derive(Debug, Clone)]
pub struct Map2 {
    map: GenericMap,
}

impl Default for Map2 {
    fn default() -> Self {
        Self::new()
    }
}

impl CombinatorialMap for Map2 {
    fn generic(&self) -> &GenericMap {
        &self.map
    }

    fn generic_mut(&mut self) -> &mut GenericMap {
        &mut self.map
    }
}

impl Map2 {
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    pub fn with_config(config: MapConfig) -> Self {
        Self {
            map: GenericMap::with_config(MapKind::Map2, config),
        }
    }

    pub(crate) fn from_generic(map: GenericMap) -> Self {
        Self { map }
    }

    fn require(&self, d: Dart, op: &'static str) -> Result<(), MapError> {
        self.map.ensure_dart(d, op)
    }

    // --- relations ---

    #[inline]
    pub fn phi2(&self, d: Dart) -> Dart {
        self.map.phi2(d)
    }

    #[inline]
    pub fn alpha0(&self, d: Dart) -> Dart {
        self.map.phi2(d)
    }

    #[inline]
    pub fn alpha1(&self, d: Dart) -> Dart {
        self.map.alpha1_2(d)
    }

    #[inline]
    pub fn alpha_1(&self, d: Dart) -> Dart {
        self.map.alpha_1_2(d)
    }

    // --- construction ---

    /// Creates a face of `nb_edges` edges closed by a boundary face.
    pub fn new_face(&mut self, nb_edges: usize) -> Result<Dart, MapError> {
        self.new_face_with(nb_edges, true)
    }

    /// Creates a face, capped by a boundary face only if `with_boundary`.
    pub fn new_face_with(&mut self, nb_edges: usize, with_boundary: bool) -> Result<Dart, MapError> {
        if nb_edges == 0 {
            return Err(MapError::precondition("new_face", "a face needs at least one edge"));
        }
        self.edit(|m| Ok(m.map.new_face2(nb_edges, with_boundary)))
    }

    /// Deletes the face of `d`, unsewing it from its neighbours first.
    pub fn delete_face(&mut self, d: Dart) -> Result<(), MapError> {
        self.require(d, "delete_face")?;
        if self.map.is_boundary_marked(d) {
            return Err(MapError::precondition("delete_face", "dart belongs to a boundary face"));
        }
        self.edit(|m| {
            let g = &mut m.map;
            let mut it = d;
            loop {
                let it2 = g.phi2(it);
                if it2 != it && !g.is_boundary_marked(it2) {
                    g.unsew_faces2(it);
                }
                it = g.phi1(it);
                if it == d {
                    break;
                }
            }
            let dd = g.phi2(d);
            g.delete_cycle(d);
            if dd != d {
                g.delete_cycle(dd);
            }
            Ok(())
        })
    }

    /// Deletes the whole connected component of `d`, boundary included.
    pub fn delete_cc(&mut self, d: Dart) -> Result<(), MapError> {
        self.require(d, "delete_cc")?;
        self.edit(|m| {
            m.map.delete_cc(d);
            Ok(())
        })
    }

    /// Sews the faces of `d` and `e` along their edges. Both edges must
    /// currently face the boundary.
    pub fn sew_faces(&mut self, d: Dart, e: Dart) -> Result<(), MapError> {
        self.sew_faces_with(d, e, true)
    }

    /// Like [`sew_faces`](Self::sew_faces); with `with_boundary == false`
    /// both darts must be `phi2` fixed points and are sewn directly.
    pub fn sew_faces_with(&mut self, d: Dart, e: Dart, with_boundary: bool) -> Result<(), MapError> {
        self.require(d, "sew_faces")?;
        self.require(e, "sew_faces")?;
        if d == e {
            return Err(MapError::precondition("sew_faces", "cannot sew a dart to itself"));
        }
        let g = &self.map;
        if with_boundary {
            if g.is_boundary_marked(d) || g.is_boundary_marked(e) {
                return Err(MapError::precondition("sew_faces", "darts must not be boundary darts"));
            }
            if !g.is_boundary_marked(g.phi2(d)) || !g.is_boundary_marked(g.phi2(e)) {
                return Err(MapError::precondition("sew_faces", "both edges must face the boundary"));
            }
            self.edit(|m| {
                m.map.sew_faces2(d, e);
                Ok(())
            })
        } else {
            if g.phi2(d) != d || g.phi2(e) != e {
                return Err(MapError::precondition("sew_faces", "both darts must be phi2 fixed points"));
            }
            self.edit(|m| {
                m.map.phi2_sew(d, e);
                Ok(())
            })
        }
    }

    /// Detaches the two faces of the edge of `d`, re-capping both with
    /// boundary. The edge must not already face the boundary.
    pub fn unsew_faces(&mut self, d: Dart) -> Result<(), MapError> {
        self.unsew_faces_with(d, true)
    }

    pub fn unsew_faces_with(&mut self, d: Dart, with_boundary: bool) -> Result<(), MapError> {
        self.require(d, "unsew_faces")?;
        if self.is_boundary_edge(d) {
            return Err(MapError::precondition("unsew_faces", "edge already faces the boundary"));
        }
        self.edit(|m| {
            if with_boundary {
                m.map.unsew_faces2(d);
            } else {
                m.map.phi2_unsew(d);
            }
            Ok(())
        })
    }

    // --- surgery ---

    /// Cuts the edge of `d` in two, adding a vertex of degree 2. Returns
    /// the new dart following `d`.
    pub fn cut_edge(&mut self, d: Dart) -> Result<Dart, MapError> {
        self.require(d, "cut_edge")?;
        self.edit(|m| Ok(m.map.cut_edge2(d)))
    }

    /// Removes the degree-2 vertex at the end of `d`.
    pub fn uncut_edge(&mut self, d: Dart) -> Result<bool, MapError> {
        self.require(d, "uncut_edge")?;
        let nd = self.map.phi1(d);
        if nd == d || self.vertex_degree(nd) != 2 {
            return Ok(false);
        }
        self.edit(|m| {
            m.map.uncut_edge2(d);
            Ok(true)
        })
    }

    /// Contracts the edge of `d`. Returns a dart of the merged vertex, or
    /// `None` if the whole neighbourhood disappeared.
    pub fn collapse_edge(&mut self, d: Dart, del_degenerate_faces: bool) -> Result<Option<Dart>, MapError> {
        self.require(d, "collapse_edge")?;
        if self.map.is_boundary_marked(d) {
            return Err(MapError::precondition("collapse_edge", "dart belongs to a boundary face"));
        }
        self.edit(|m| Ok(m.map.collapse_edge2(d, del_degenerate_faces)))
    }

    /// Splits the face of `d` and `e` with a new edge joining their
    /// origins. Returns the new dart in front of `d`.
    pub fn split_face(&mut self, d: Dart, e: Dart) -> Result<Dart, MapError> {
        self.require(d, "split_face")?;
        self.require(e, "split_face")?;
        if d == e || !self.map.same_cycle(d, e) {
            return Err(MapError::precondition("split_face", "darts must be distinct darts of one face"));
        }
        if self.map.is_boundary_marked(d) {
            return Err(MapError::precondition("split_face", "cannot split a boundary face"));
        }
        self.edit(|m| {
            let dd = m.map.phi_1(d);
            m.map.split_face2(d, e);
            Ok(m.map.phi1(dd))
        })
    }

    /// Merges the two faces of the edge of `d`. Refused on boundary edges
    /// and on edges with the same face on both sides.
    pub fn merge_faces(&mut self, d: Dart) -> Result<bool, MapError> {
        self.require(d, "merge_faces")?;
        if self.is_boundary_edge(d) || self.map.same_cycle(d, self.map.phi2(d)) {
            return Ok(false);
        }
        self.edit(|m| {
            m.map.merge_faces2(d);
            Ok(true)
        })
    }

    /// Splits the vertex shared by `d` and `e` into two joined by a new
    /// edge.
    pub fn split_vertex(&mut self, d: Dart, e: Dart) -> Result<(), MapError> {
        self.require(d, "split_vertex")?;
        self.require(e, "split_vertex")?;
        if d == e || !self.same_oriented_vertex(d, e) {
            return Err(MapError::precondition("split_vertex", "darts must be distinct darts of one vertex"));
        }
        if self.map.phi2(d) == d || self.map.phi2(e) == e {
            return Err(MapError::precondition("split_vertex", "spokes must be sewn"));
        }
        self.edit(|m| {
            m.map.split_vertex2(d, e);
            Ok(())
        })
    }

    /// Deletes the vertex of `d`, merging all its faces. Refused on
    /// boundary vertices.
    pub fn delete_vertex(&mut self, d: Dart) -> Result<bool, MapError> {
        self.require(d, "delete_vertex")?;
        if self.is_boundary_vertex(d) {
            return Ok(false);
        }
        self.edit(|m| {
            m.map.delete_vertex2(d);
            Ok(true)
        })
    }

    /// Rotates the edge of `d` to the next diagonal of its two faces.
    /// Refused on boundary edges.
    pub fn flip_edge(&mut self, d: Dart) -> Result<bool, MapError> {
        self.require(d, "flip_edge")?;
        if self.is_boundary_edge(d) {
            return Ok(false);
        }
        self.edit(|m| {
            m.map.flip_edge2(d);
            Ok(true)
        })
    }

    /// Inverse of [`flip_edge`](Self::flip_edge).
    pub fn flip_back_edge(&mut self, d: Dart) -> Result<bool, MapError> {
        self.require(d, "flip_back_edge")?;
        if self.is_boundary_edge(d) {
            return Ok(false);
        }
        self.edit(|m| {
            m.map.flip_back_edge2(d);
            Ok(true)
        })
    }

    /// Detaches the two triangles of the edge of `d` from their neighbours
    /// by sewing those neighbours to each other. The pair keeps dangling
    /// (unsewn) outer edges until [`insert_triangle_pair`] re-inserts it.
    ///
    /// [`insert_triangle_pair`]: Self::insert_triangle_pair
    pub fn extract_triangle_pair(&mut self, d: Dart) -> Result<(), MapError> {
        self.require(d, "extract_triangle_pair")?;
        let g = &self.map;
        let e = g.phi2(d);
        if e == d || g.is_face_incident_to_boundary2(d) || g.is_face_incident_to_boundary2(e) {
            return Err(MapError::precondition("extract_triangle_pair", "triangles must be interior"));
        }
        if g.cycle_degree(d) != 3 || g.cycle_degree(e) != 3 {
            return Err(MapError::precondition("extract_triangle_pair", "faces must be triangles"));
        }
        self.edit(|m| {
            let g = &mut m.map;
            for x in [d, e] {
                let x1 = g.phi2(g.phi1(x));
                let x2 = g.phi2(g.phi_1(x));
                g.phi2_unsew(x1);
                g.phi2_unsew(x2);
                g.phi2_sew(x1, x2);
            }
            Ok(())
        })
    }

    /// Re-inserts an extracted triangle pair at the vertex shared by `v1`
    /// and `v2`: the triangle of `d` is wedged in front of `v1`, the one of
    /// `phi2(d)` in front of `v2`.
    pub fn insert_triangle_pair(&mut self, d: Dart, v1: Dart, v2: Dart) -> Result<(), MapError> {
        for x in [d, v1, v2] {
            self.require(x, "insert_triangle_pair")?;
        }
        if v1 == v2 || !self.same_oriented_vertex(v1, v2) {
            return Err(MapError::precondition("insert_triangle_pair", "v1 and v2 must be distinct darts of one vertex"));
        }
        let g = &self.map;
        let e = g.phi2(d);
        if e == d || g.cycle_degree(d) != 3 || g.cycle_degree(e) != 3 {
            return Err(MapError::precondition("insert_triangle_pair", "d must join two triangles"));
        }
        self.edit(|m| {
            let g = &mut m.map;
            let vv1 = g.phi2(v1);
            g.phi2_unsew(v1);
            let (a, b) = (g.phi_1(d), g.phi1(d));
            g.phi2_sew(a, v1);
            g.phi2_sew(b, vv1);
            let vv2 = g.phi2(v2);
            g.phi2_unsew(v2);
            let (a, b) = (g.phi_1(e), g.phi1(e));
            g.phi2_sew(a, v2);
            g.phi2_sew(b, vv2);
            Ok(())
        })
    }

    /// Fuses the volumes of faces `d` and `e` by identifying the two faces.
    /// Refused (`false`) when the faces have different degrees.
    pub fn merge_volumes(&mut self, d: Dart, e: Dart) -> Result<bool, MapError> {
        self.require(d, "merge_volumes")?;
        self.require(e, "merge_volumes")?;
        if self.map.same_cycle(d, e) {
            return Err(MapError::precondition("merge_volumes", "darts belong to the same face"));
        }
        if self.map.cycle_degree(d) != self.map.cycle_degree(e) {
            return Ok(false);
        }
        self.edit(|m| {
            m.map.merge_volumes2(d, e);
            Ok(true)
        })
    }

    /// Caps the hole bordered by the `phi2`-fixed dart `d`.
    ///
    /// Returns the number of edges of the cap. Without `for_boundary`, a
    /// two-sided cap is collapsed away (its two neighbours get sewn) and 0
    /// is returned.
    pub fn close_hole(&mut self, d: Dart, for_boundary: bool) -> Result<usize, MapError> {
        self.require(d, "close_hole")?;
        if self.map.phi2(d) != d {
            return Err(MapError::precondition("close_hole", "dart must be a phi2 fixed point"));
        }
        self.edit(|m| {
            let (cap, n) = m.map.close_hole2(d)?;
            if for_boundary {
                m.map.boundary_mark_orbit(Orbit::Face2, cap);
            } else if n == 2 {
                m.map.collapse_degenerated_face(cap);
                return Ok(0);
            }
            Ok(n)
        })
    }

    /// Closes every hole with a boundary face. Returns the number of holes.
    pub fn close_map(&mut self) -> Result<usize, MapError> {
        self.edit(|m| {
            let open: Vec<Dart> = m.map.darts().filter(|&d| m.map.phi2(d) == d).collect();
            let mut holes = 0;
            for d in open {
                if m.map.phi2(d) == d {
                    let (cap, _) = m.map.close_hole2(d)?;
                    m.map.boundary_mark_orbit(Orbit::Face2, cap);
                    holes += 1;
                }
            }
            log::debug!("closed {holes} holes");
            Ok(holes)
        })
    }

    // --- queries ---

    /// Number of edges around the vertex of `d`, boundary edges included.
    pub fn vertex_degree(&self, d: Dart) -> usize {
        self.map.vertex_degree2(d)
    }

    pub fn face_degree(&self, d: Dart) -> usize {
        self.map.cycle_degree(d)
    }

    /// Number of non-boundary faces of the connected component of `d`.
    pub fn volume_degree(&self, d: Dart) -> usize {
        let mut seen = VisitedDarts::new(&self.map);
        let mut faces = 0;
        for x in self.map.orbit_darts(Orbit::Volume, d) {
            if seen.contains(x) || self.map.is_boundary_marked(x) {
                continue;
            }
            faces += 1;
            self.map.foreach_dart_of_orbit(Orbit::Face2, x, |y| {
                seen.insert(y);
                false
            });
        }
        faces
    }

    pub fn same_oriented_vertex(&self, d: Dart, e: Dart) -> bool {
        self.map.same_orbit(Orbit::Vertex2, d, e)
    }

    /// Same vertex regardless of orientation; on orientable surfaces this
    /// is [`same_oriented_vertex`](Self::same_oriented_vertex).
    pub fn same_vertex(&self, d: Dart, e: Dart) -> bool {
        self.same_oriented_vertex(d, e)
    }

    pub fn same_oriented_face(&self, d: Dart, e: Dart) -> bool {
        self.map.same_cycle(d, e)
    }

    pub fn is_boundary_vertex(&self, d: Dart) -> bool {
        self.map.foreach_dart_of_orbit(Orbit::Vertex2, d, |x| {
            self.map.is_boundary_marked(x) || self.map.phi2(x) == x
        })
    }

    pub fn is_boundary_edge(&self, d: Dart) -> bool {
        let e = self.map.phi2(d);
        e == d || self.map.is_boundary_marked(d) || self.map.is_boundary_marked(e)
    }

    /// `true` if the face of `d` touches the boundary along an edge.
    pub fn is_boundary_face(&self, d: Dart) -> bool {
        self.map.is_face_incident_to_boundary2(d)
    }

    /// Boundary dart starting at the vertex of `d`.
    pub fn find_boundary_edge_of_vertex(&self, d: Dart) -> Option<Dart> {
        self.map.find_boundary_edge_of_vertex(d)
    }

    /// `true` if every non-boundary face is a triangle.
    pub fn is_triangular(&self) -> bool {
        self.map
            .darts()
            .filter(|&d| !self.map.is_boundary_marked(d))
            .all(|d| self.map.cycle_degree(d) == 3)
    }
}
