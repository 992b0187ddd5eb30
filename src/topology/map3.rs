//! Map3: volume meshes. `phi3` pairs the two mirrored faces shared by
//! adjacent volumes, walking them in opposite directions so that
//! `phi1(phi3(d)) == phi3(phi_1(d))`.
//!
//! As in two dimensions, "no neighbour" is represented by boundary volumes
//! whose darts carry the boundary mark. Inside one volume, the surface
//! surgeries of [`map2`](super::map2) apply unchanged and are reused here;
//! the 3-D operators add the `phi3` bookkeeping across volumes.

use crate::map_error::MapError;
use crate::topology::dart::Dart;
use crate::topology::generic_map::{CombinatorialMap, GenericMap, MapConfig, MapKind, PHI3};
use crate::topology::marker::{ScratchMarks, VisitedDarts};
use crate::topology::orbit::Orbit;

impl GenericMap {
    pub(crate) fn phi3_sew(&mut self, d: Dart, e: Dart) {
        self.set_rel(PHI3, d, e);
        self.set_rel(PHI3, e, d);
        self.touch(d);
        self.touch(e);
    }

    pub(crate) fn phi3_unsew(&mut self, d: Dart) {
        let e = self.phi3(d);
        self.set_rel(PHI3, d, d);
        self.set_rel(PHI3, e, e);
        self.touch(d);
        self.touch(e);
    }

    /// Sews the faces of `d` and `e` dart by dart, walking them in opposite
    /// directions.
    pub(crate) fn phi3_sew_faces(&mut self, d: Dart, e: Dart) {
        let mut fd = d;
        let mut fe = e;
        loop {
            self.phi3_sew(fd, fe);
            fd = self.phi1(fd);
            fe = self.phi_1(fe);
            if fd == d {
                break;
            }
        }
    }

    /// `alpha2(d) = phi3(phi2(d))`: next volume around the edge of `d`.
    #[inline]
    pub(crate) fn alpha2_3(&self, d: Dart) -> Dart {
        self.phi3(self.phi2(d))
    }

    /// Darts of the edge of `d` oriented like `d`, one per volume around
    /// the edge. Fails if the edge is not closed by `phi2`/`phi3`.
    pub(crate) fn edge_ring(&self, d: Dart, op: &'static str) -> Result<Vec<Dart>, MapError> {
        let mut ring = vec![d];
        let mut x = d;
        loop {
            let x2 = self.phi2(x);
            if x2 == x || self.phi3(x2) == x2 {
                return Err(MapError::precondition(op, "edge is not closed"));
            }
            x = self.phi3(x2);
            if x == d {
                return Ok(ring);
            }
            if ring.len() > self.nb_darts() {
                return Err(MapError::malformed(d, "edge ring does not close"));
            }
            ring.push(x);
        }
    }

    /// Boundary dart of the edge of `d`, if any volume around it is a
    /// boundary volume.
    pub(crate) fn find_boundary_face_of_edge(&self, d: Dart) -> Option<Dart> {
        let mut x = d;
        let mut steps = 0usize;
        loop {
            if self.is_boundary_marked(x) {
                return Some(x);
            }
            let x2 = self.phi2(x);
            if x2 == x || self.phi3(x2) == x2 {
                return None;
            }
            x = self.phi3(x2);
            steps += 1;
            if x == d || steps > self.nb_darts() {
                return None;
            }
        }
    }

    /// Replaces the boundary volumes capping the faces of `d` and `e` by a
    /// direct `phi3` link between the two faces.
    pub(crate) fn sew_volumes3(&mut self, d: Dart, e: Dart) {
        let dd = self.phi3(d);
        let ee = self.phi3(e);
        let mut fd = dd;
        let mut fe = ee;
        loop {
            let fd2 = self.phi2(fd);
            let fe2 = self.phi2(fe);
            if fd2 != fe {
                self.phi2_unsew(fd);
                self.phi2_unsew(fe);
                self.phi2_sew(fd2, fe2);
                self.phi2_sew(fd, fe);
            }
            self.phi3_unsew(fd);
            self.phi3_unsew(fe);
            fd = self.phi1(fd);
            fe = self.phi_1(fe);
            if fd == dd {
                break;
            }
        }
        self.delete_cc(dd);
        self.phi3_sew_faces(d, e);
    }

    /// Detaches the face of `d` from its mirror and caps both sides with a
    /// new boundary face stitched into the surrounding boundary volumes.
    pub(crate) fn unsew_volumes3(&mut self, d: Dart) {
        let n = self.cycle_degree(d);
        let d3 = self.phi3(d);
        let b1 = self.new_cycle(n);
        let b2 = self.new_cycle(n);
        self.boundary_mark_orbit(Orbit::Face2, b1);
        self.boundary_mark_orbit(Orbit::Face2, b2);
        let mut f1 = d;
        let mut f2 = d3;
        let mut fb1 = b1;
        let mut fb2 = b2;
        loop {
            match self.find_boundary_face_of_edge(f1) {
                Some(f) => {
                    let g = self.phi2(f);
                    self.phi2_unsew(f);
                    self.phi2_sew(fb1, f);
                    self.phi2_sew(fb2, g);
                }
                None => self.phi2_sew(fb1, fb2),
            }
            self.phi3_unsew(f1);
            self.phi3_sew(f1, fb1);
            self.phi3_sew(f2, fb2);
            f1 = self.phi1(f1);
            f2 = self.phi_1(f2);
            fb1 = self.phi_1(fb1);
            fb2 = self.phi1(fb2);
            if fb1 == b1 {
                break;
            }
        }
    }

    /// Cuts the edge of `d` in every volume around it. Returns the new dart
    /// following `d`.
    pub(crate) fn cut_edge3(&mut self, ring: &[Dart]) -> Dart {
        let mut nd = ring[0];
        for (i, &x) in ring.iter().enumerate() {
            let n = self.cut_edge2(x);
            if i == 0 {
                nd = n;
            }
        }
        for &x in ring {
            let d3 = self.phi3(x);
            self.phi3_unsew(x);
            let a = self.phi1(d3);
            let b = self.phi1(x);
            self.phi3_sew(x, a);
            self.phi3_sew(d3, b);
        }
        nd
    }

    pub(crate) fn uncut_edge3(&mut self, ring: &[Dart]) {
        for &x in ring {
            let n = self.phi1(x);
            let partner = self.phi3(n);
            self.phi3_unsew(x);
            self.phi3_unsew(n);
            self.phi3_sew(x, partner);
        }
        for &x in ring {
            self.uncut_edge2(x);
        }
    }

    /// Splits the face of `d` and `e` and its mirror, and sews the two new
    /// edges across.
    pub(crate) fn split_face3(&mut self, d: Dart, e: Dart) {
        let d3 = self.phi3(d);
        if d3 == d {
            self.split_face2(d, e);
            return;
        }
        let dd = self.phi1(d3);
        let ee = self.phi1(self.phi3(e));
        self.split_face2(d, e);
        self.split_face2(dd, ee);
        let (a, b) = (self.phi_1(d), self.phi_1(ee));
        self.phi3_sew(a, b);
        let (a, b) = (self.phi_1(e), self.phi_1(dd));
        self.phi3_sew(a, b);
    }

    /// Volume made only of two faces sewn to each other along every edge.
    fn is_flat_volume(&self, d: Dart) -> bool {
        let e = self.phi2(d);
        if e == d || self.same_cycle(d, e) || self.cycle_degree(d) != self.cycle_degree(e) {
            return false;
        }
        let mut x = d;
        loop {
            let x2 = self.phi2(x);
            if x2 == x || !self.same_cycle(x2, e) {
                return false;
            }
            x = self.phi1(x);
            if x == d {
                return true;
            }
        }
    }

    /// Removes a flat volume, sewing the volumes on both of its sides to
    /// each other. When both sides are boundary, the two boundary faces are
    /// merged away instead.
    fn collapse_flat_volume(&mut self, d: Dart) {
        let darts = self.orbit_darts(Orbit::Volume, d);
        let mut inside = ScratchMarks::new(self, Orbit::Dart);
        for &x in &darts {
            inside.insert_dart(self, x);
        }
        let outside = |m: &GenericMap, x: Dart| {
            let y = m.phi3(x);
            (y != x && !inside.contains_dart(m, y)).then_some(y)
        };
        let face: Vec<Dart> = self.orbit_darts(Orbit::Face2, d);
        let shell = match (outside(self, d), outside(self, self.phi2(d))) {
            (Some(d3), Some(e3)) if self.is_boundary_marked(d3) && self.is_boundary_marked(e3) => Some((d3, e3)),
            _ => None,
        };
        if let Some((d3, e3)) = shell {
            for &a in &face {
                let b = self.phi2(a);
                self.phi3_unsew(a);
                self.phi3_unsew(b);
            }
            self.merge_volumes2(e3, d3);
        } else {
            for a in face {
                let b = self.phi2(a);
                let a3 = outside(self, a);
                let b3 = outside(self, b);
                if a3.is_some() {
                    self.phi3_unsew(a);
                }
                if b3.is_some() {
                    self.phi3_unsew(b);
                }
                if let (Some(a3), Some(b3)) = (a3, b3) {
                    self.phi3_sew(a3, b3);
                }
            }
        }
        inside.release(self);
        for x in darts {
            self.delete_dart(x);
        }
    }

    /// Contracts the edge of `d` in every volume around it. Returns a dart
    /// of the resulting vertex.
    pub(crate) fn collapse_edge3(&mut self, ring: &[Dart], del_degenerate: bool) -> Option<Dart> {
        // Each collapsed dart goes away together with its phi3 mirror, which
        // is collapsed in the neighbouring volume of the ring.
        let mut survivors = Vec::with_capacity(ring.len());
        for &x in ring {
            if let Some(r) = self.collapse_edge2(x, true) {
                survivors.push(r);
            }
        }
        if del_degenerate {
            for &s in &survivors {
                if self.is_dart(s) && !self.is_boundary_marked(s) && self.is_flat_volume(s) {
                    log::trace!("removing flat volume at dart {s}");
                    self.collapse_flat_volume(s);
                }
            }
        }
        let alive: Vec<Dart> = survivors.into_iter().filter(|&s| self.is_dart(s)).collect();
        alive
            .iter()
            .copied()
            .find(|&s| !self.is_boundary_marked(s))
            .or_else(|| alive.first().copied())
    }

    /// Splits the vertex shared by the darts of `vd` along the loop of
    /// volumes they describe.
    pub(crate) fn split_vertex3(&mut self, vd: &[Dart], partners: &[Dart]) {
        let n = vd.len();
        let mut xs = Vec::with_capacity(n);
        let mut ys = Vec::with_capacity(n);
        for (&d, &e) in vd.iter().zip(partners) {
            let dd = self.phi2(d);
            let ee = self.phi2(e);
            let x = self.cut1(dd);
            let y = self.cut1(ee);
            self.phi2_sew(x, y);
            xs.push(x);
            ys.push(y);
        }
        for i in 0..n {
            self.phi3_sew(xs[(i + 1) % n], ys[i]);
        }
    }

    /// Deletes the vertex of `d`, merging every volume around it. Returns a
    /// dart of the merged volume.
    pub(crate) fn delete_vertex3(&mut self, d: Dart) -> Option<Dart> {
        let mut faces: Vec<Dart> = Vec::new();
        {
            let mut seen = VisitedDarts::new(self);
            for x in self.orbit_darts(Orbit::Vertex, d) {
                if seen.contains(x) {
                    continue;
                }
                for y in self.orbit_darts(Orbit::Face, x) {
                    seen.insert(y);
                }
                faces.push(x);
            }
        }
        let mut res = None;
        for f in faces {
            let end = self.phi_1(f);
            let mut fit = self.phi1(f);
            while fit != end {
                let d2 = self.phi2(fit);
                let d3 = self.phi3(fit);
                let d32 = self.phi2(d3);
                if res.is_none() {
                    res = Some(d2);
                }
                self.phi2_unsew(d2);
                self.phi2_unsew(d32);
                self.phi2_sew(d2, d32);
                self.phi2_sew(fit, d3);
                fit = self.phi1(fit);
            }
        }
        self.delete_cc(d);
        res.filter(|&r| self.is_dart(r))
    }

    /// Caps the hole bordered by the `phi3`-fixed face of `d` with a new
    /// volume. Returns the number of faces of the cap.
    pub(crate) fn close_hole3(&mut self, d: Dart, for_boundary: bool) -> Result<usize, MapError> {
        let mut hole = ScratchMarks::new(self, Orbit::Dart);
        let res = self.close_marked_hole(d, for_boundary, &mut hole);
        hole.release(self);
        res
    }

    fn close_marked_hole(&mut self, d: Dart, for_boundary: bool, hole: &mut ScratchMarks) -> Result<usize, MapError> {
        let limit = self.nb_darts();
        let mut border: Vec<Dart> = Vec::new();
        let mut faces = vec![d];
        for x in self.orbit_darts(Orbit::Face2, d) {
            hole.insert_dart(self, x);
            border.push(x);
        }
        let mut i = 0;
        while i < faces.len() {
            let f = faces[i];
            i += 1;
            for x in self.orbit_darts(Orbit::Face2, f) {
                let y = self.hole_neighbour(x, hole, limit)?;
                if !hole.contains_dart(self, y) {
                    for z in self.orbit_darts(Orbit::Face2, y) {
                        hole.insert_dart(self, z);
                        border.push(z);
                    }
                    faces.push(y);
                }
            }
        }
        for &f in &faces {
            let n = self.cycle_degree(f);
            let cap = self.new_cycle(n);
            self.phi3_sew_faces(f, cap);
            if for_boundary {
                self.boundary_mark_orbit(Orbit::Face2, cap);
            }
        }
        for &x in &border {
            let c = self.phi3(x);
            if self.phi2(c) != c {
                continue;
            }
            let y = self.hole_neighbour(x, hole, limit)?;
            let c2 = self.phi3(y);
            self.phi2_sew(c, c2);
        }
        Ok(faces.len())
    }

    /// Hole dart sharing the edge of the hole dart `x`, found by turning
    /// around the edge through the volumes already sewn.
    fn hole_neighbour(&self, x: Dart, hole: &ScratchMarks, limit: usize) -> Result<Dart, MapError> {
        let mut y = self.phi2(x);
        if y == x {
            return Err(MapError::precondition("close_hole", "volumes around the hole are not closed"));
        }
        let mut turns = 0usize;
        while !hole.contains_dart(self, y) && self.phi3(y) != y {
            y = self.phi2(self.phi3(y));
            turns += 1;
            if turns > limit {
                return Err(MapError::malformed(x, "hole border does not close"));
            }
        }
        Ok(y)
    }

    /// Builds an open prism: `n` quads around, an `n`-gon on top and one at
    /// the bottom. Returns a dart of the top face.
    pub(crate) fn build_prism(&mut self, n: usize) -> Dart {
        let quads: Vec<Dart> = (0..n).map(|_| self.new_face2(4, false)).collect();
        let opposite: Vec<Dart> = quads.iter().map(|&q| self.phi1(self.phi1(q))).collect();
        for i in 0..n {
            let a = self.phi_1(quads[i]);
            let b = self.phi1(quads[(i + 1) % n]);
            self.phi2_sew(a, b);
        }
        let mut top = self.new_face2(n, false);
        let mut bottom = self.new_face2(n, false);
        let res = top;
        for i in 0..n {
            self.phi2_sew(quads[i], top);
            self.phi2_sew(opposite[i], bottom);
            top = self.phi1(top);
            bottom = self.phi_1(bottom);
        }
        res
    }

    /// Builds an open pyramid over an `n`-gon. Returns a dart of the base.
    pub(crate) fn build_pyramid(&mut self, n: usize) -> Dart {
        let tris: Vec<Dart> = (0..n).map(|_| self.new_face2(3, false)).collect();
        for i in 0..n {
            let a = self.phi_1(tris[i]);
            let b = self.phi1(tris[(i + 1) % n]);
            self.phi2_sew(a, b);
        }
        let mut base = self.new_face2(n, false);
        let res = base;
        for &t in &tris {
            self.phi2_sew(t, base);
            base = self.phi1(base);
        }
        res
    }
}

/// A 3-dimensional map: an orientable volume mesh.
#[derive(Debug, Clone)]
pub struct Map3 {
    map: GenericMap,
}

impl Default for Map3 {
    fn default() -> Self {
        Self::new()
    }
}

impl CombinatorialMap for Map3 {
    fn generic(&self) -> &GenericMap {
        &self.map
    }

    fn generic_mut(&mut self) -> &mut GenericMap {
        &mut self.map
    }
}

impl Map3 {
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    pub fn with_config(config: MapConfig) -> Self {
        Self {
            map: GenericMap::with_config(MapKind::Map3, config),
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
    pub fn phi3(&self, d: Dart) -> Dart {
        self.map.phi3(d)
    }

    #[inline]
    pub fn alpha0(&self, d: Dart) -> Dart {
        self.map.phi3(d)
    }

    #[inline]
    pub fn alpha1(&self, d: Dart) -> Dart {
        self.map.phi1(self.map.phi3(d))
    }

    #[inline]
    pub fn alpha_1(&self, d: Dart) -> Dart {
        self.map.phi3(self.map.phi_1(d))
    }

    #[inline]
    pub fn alpha2(&self, d: Dart) -> Dart {
        self.map.alpha2_3(d)
    }

    #[inline]
    pub fn alpha_2(&self, d: Dart) -> Dart {
        self.map.phi2(self.map.phi3(d))
    }

    // --- raw construction ---

    /// Creates an isolated face with every `phi2`/`phi3` fixed.
    pub fn new_face(&mut self, nb_edges: usize) -> Result<Dart, MapError> {
        if nb_edges == 0 {
            return Err(MapError::precondition("new_face", "a face needs at least one edge"));
        }
        self.edit(|m| Ok(m.map.new_face2(nb_edges, false)))
    }

    /// Sews two `phi2`-fixed darts, assembling a volume face by face.
    pub fn sew_faces(&mut self, d: Dart, e: Dart) -> Result<(), MapError> {
        self.require(d, "sew_faces")?;
        self.require(e, "sew_faces")?;
        if d == e || self.map.phi2(d) != d || self.map.phi2(e) != e {
            return Err(MapError::precondition("sew_faces", "darts must be distinct phi2 fixed points"));
        }
        self.edit(|m| {
            m.map.phi2_sew(d, e);
            Ok(())
        })
    }

    /// Prism over an `n`-gon, closed by a boundary volume. Returns a dart of
    /// one of its two `n`-gons.
    pub fn new_prism(&mut self, n: usize) -> Result<Dart, MapError> {
        if n < 3 {
            return Err(MapError::precondition("new_prism", "base needs at least three edges"));
        }
        self.edit(|m| {
            let d = m.map.build_prism(n);
            m.map.close_hole3(d, true)?;
            Ok(d)
        })
    }

    /// Pyramid over an `n`-gon, closed by a boundary volume. Returns a dart
    /// of the base.
    pub fn new_pyramid(&mut self, n: usize) -> Result<Dart, MapError> {
        if n < 3 {
            return Err(MapError::precondition("new_pyramid", "base needs at least three edges"));
        }
        self.edit(|m| {
            let d = m.map.build_pyramid(n);
            m.map.close_hole3(d, true)?;
            Ok(d)
        })
    }

    pub fn new_hexahedron(&mut self) -> Result<Dart, MapError> {
        self.new_prism(4)
    }

    pub fn new_tetrahedron(&mut self) -> Result<Dart, MapError> {
        self.new_pyramid(3)
    }

    // --- sewing ---

    /// Sews the volumes of faces `d` and `e`, both capped by boundary.
    pub fn sew_volumes(&mut self, d: Dart, e: Dart) -> Result<(), MapError> {
        self.sew_volumes_with(d, e, true)
    }

    /// Like [`sew_volumes`](Self::sew_volumes); with `with_boundary ==
    /// false` both faces must be `phi3`-fixed and are sewn directly.
    pub fn sew_volumes_with(&mut self, d: Dart, e: Dart, with_boundary: bool) -> Result<(), MapError> {
        self.require(d, "sew_volumes")?;
        self.require(e, "sew_volumes")?;
        let g = &self.map;
        if g.same_cycle(d, e) {
            return Err(MapError::precondition("sew_volumes", "darts belong to the same face"));
        }
        if g.cycle_degree(d) != g.cycle_degree(e) {
            return Err(MapError::precondition("sew_volumes", "faces have different degrees"));
        }
        if with_boundary {
            if g.is_boundary_marked(d) || g.is_boundary_marked(e) {
                return Err(MapError::precondition("sew_volumes", "darts must not be boundary darts"));
            }
            if !g.is_boundary_marked(g.phi3(d)) || !g.is_boundary_marked(g.phi3(e)) {
                return Err(MapError::precondition("sew_volumes", "both faces must face the boundary"));
            }
            self.edit(|m| {
                m.map.sew_volumes3(d, e);
                Ok(())
            })
        } else {
            let open = |x: Dart| g.foreach_dart_of_orbit(Orbit::Face2, x, |y| g.phi3(y) != y);
            if open(d) || open(e) {
                return Err(MapError::precondition("sew_volumes", "both faces must be phi3 fixed"));
            }
            self.edit(|m| {
                m.map.phi3_sew_faces(d, e);
                Ok(())
            })
        }
    }

    /// Detaches the volumes sharing the face of `d`, re-capping both sides
    /// with boundary.
    pub fn unsew_volumes(&mut self, d: Dart) -> Result<(), MapError> {
        self.require(d, "unsew_volumes")?;
        if self.is_boundary_face(d) {
            return Err(MapError::precondition("unsew_volumes", "face already faces the boundary"));
        }
        self.edit(|m| {
            m.map.unsew_volumes3(d);
            Ok(())
        })
    }

    // --- surgery ---

    /// Cuts the edge of `d` in every volume around it. Returns the new dart
    /// following `d`.
    pub fn cut_edge(&mut self, d: Dart) -> Result<Dart, MapError> {
        self.require(d, "cut_edge")?;
        let ring = self.map.edge_ring(d, "cut_edge")?;
        self.edit(|m| Ok(m.map.cut_edge3(&ring)))
    }

    /// Removes the degree-2 vertex at the end of `d` in every volume.
    pub fn uncut_edge(&mut self, d: Dart) -> Result<bool, MapError> {
        self.require(d, "uncut_edge")?;
        if self.vertex_degree(self.map.phi1(d)) != 2 {
            return Ok(false);
        }
        let ring = self.map.edge_ring(d, "uncut_edge")?;
        self.edit(|m| {
            m.map.uncut_edge3(&ring);
            Ok(true)
        })
    }

    /// Splits the face of `d` and `e` and its mirror with a new edge.
    pub fn split_face(&mut self, d: Dart, e: Dart) -> Result<(), MapError> {
        self.require(d, "split_face")?;
        self.require(e, "split_face")?;
        if d == e || !self.map.same_cycle(d, e) {
            return Err(MapError::precondition("split_face", "darts must be distinct darts of one face"));
        }
        self.edit(|m| {
            m.map.split_face3(d, e);
            Ok(())
        })
    }

    /// Splits the vertex shared by the darts of `vd`, one per volume of a
    /// closed loop around the vertex: inside the volume of `vd[i]`, the
    /// vertex is split between `vd[i]` and the dart facing `vd[i + 1]`.
    pub fn split_vertex(&mut self, vd: &[Dart]) -> Result<(), MapError> {
        if vd.is_empty() {
            return Err(MapError::precondition("split_vertex", "path is empty"));
        }
        for &d in vd {
            self.require(d, "split_vertex")?;
        }
        let g = &self.map;
        let mut partners = Vec::with_capacity(vd.len());
        for (i, &d) in vd.iter().enumerate() {
            if !g.same_orbit(Orbit::Vertex, vd[0], d) {
                return Err(MapError::precondition("split_vertex", "darts must share one vertex"));
            }
            let next = vd[(i + 1) % vd.len()];
            let spoke = g.phi2(next);
            let mirror = g.phi3(spoke);
            if spoke == next || mirror == spoke {
                return Err(MapError::precondition("split_vertex", "volumes around the vertex are not closed"));
            }
            let e = g.phi2(g.phi_1(mirror));
            if e == d || !g.same_orbit(Orbit::Vertex2, d, e) {
                return Err(MapError::precondition("split_vertex", "consecutive darts must be in adjacent volumes"));
            }
            partners.push(e);
        }
        self.edit(|m| {
            m.map.split_vertex3(vd, &partners);
            Ok(())
        })
    }

    /// Contracts the edge of `d` in every volume around it. With
    /// `del_degenerate_volumes`, volumes flattened to two faces are removed.
    pub fn collapse_edge(&mut self, d: Dart, del_degenerate_volumes: bool) -> Result<Option<Dart>, MapError> {
        self.require(d, "collapse_edge")?;
        if self.map.is_boundary_marked(d) {
            return Err(MapError::precondition("collapse_edge", "dart belongs to a boundary volume"));
        }
        let ring = self.map.edge_ring(d, "collapse_edge")?;
        self.edit(|m| Ok(m.map.collapse_edge3(&ring, del_degenerate_volumes)))
    }

    /// Deletes the vertex of `d`, merging all its volumes. Refused
    /// (`None`) on boundary vertices.
    pub fn delete_vertex(&mut self, d: Dart) -> Result<Option<Dart>, MapError> {
        self.require(d, "delete_vertex")?;
        if self.is_boundary_vertex(d) {
            return Ok(None);
        }
        let g = &self.map;
        let open = g.foreach_dart_of_orbit(Orbit::Vertex, d, |x| g.phi3(x) == x || g.phi2(x) == x);
        if open {
            return Err(MapError::precondition("delete_vertex", "volumes around the vertex are not closed"));
        }
        self.edit(|m| Ok(m.map.delete_vertex3(d)))
    }

    /// Merges the two volumes sharing the face of `d`. Refused on boundary
    /// faces.
    pub fn merge_volumes(&mut self, d: Dart) -> Result<bool, MapError> {
        self.require(d, "merge_volumes")?;
        if self.is_boundary_face(d) {
            return Ok(false);
        }
        self.edit(|m| {
            let e = m.map.phi3(d);
            m.map.merge_volumes2(d, e);
            Ok(true)
        })
    }

    /// Deletes the volume of `d`, leaving boundary where it touched other
    /// volumes.
    pub fn delete_volume(&mut self, d: Dart) -> Result<(), MapError> {
        self.require(d, "delete_volume")?;
        if self.map.is_boundary_marked(d) {
            return Err(MapError::precondition("delete_volume", "dart belongs to a boundary volume"));
        }
        self.edit(|m| {
            let mut faces = Vec::new();
            {
                let mut seen = VisitedDarts::new(&m.map);
                for x in m.map.orbit_darts(Orbit::Volume, d) {
                    if !seen.contains(x) {
                        for y in m.map.orbit_darts(Orbit::Face2, x) {
                            seen.insert(y);
                        }
                        faces.push(x);
                    }
                }
            }
            for f in faces {
                let f3 = m.map.phi3(f);
                if f3 != f && !m.map.is_boundary_marked(f3) {
                    m.map.unsew_volumes3(f);
                }
            }
            let dd = m.map.phi3(d);
            m.map.delete_cc(d);
            if dd != d && m.map.is_dart(dd) {
                m.map.delete_cc(dd);
            }
            Ok(())
        })
    }

    /// Caps the hole of the `phi3`-fixed face of `d` with one volume.
    /// Returns the number of faces of that volume.
    pub fn close_hole(&mut self, d: Dart, for_boundary: bool) -> Result<usize, MapError> {
        self.require(d, "close_hole")?;
        if self.map.phi3(d) != d {
            return Err(MapError::precondition("close_hole", "dart must be a phi3 fixed point"));
        }
        self.edit(|m| m.map.close_hole3(d, for_boundary))
    }

    /// Closes every hole with a boundary volume. Returns the number of
    /// holes.
    pub fn close_map(&mut self) -> Result<usize, MapError> {
        self.edit(|m| {
            let open: Vec<Dart> = m.map.darts().filter(|&d| m.map.phi3(d) == d).collect();
            let mut holes = 0;
            for d in open {
                if m.map.phi3(d) == d {
                    m.map.close_hole3(d, true)?;
                    holes += 1;
                }
            }
            log::debug!("closed {holes} holes");
            Ok(holes)
        })
    }

    // --- queries ---

    /// Number of edges incident to the vertex of `d`.
    pub fn vertex_degree(&self, d: Dart) -> usize {
        let darts = self.map.orbit_darts(Orbit::Vertex, d);
        let mut seen = VisitedDarts::new(&self.map);
        let mut n = 0;
        for x in darts {
            if seen.contains(x) {
                continue;
            }
            n += 1;
            for y in self.map.orbit_darts(Orbit::Edge, x) {
                seen.insert(y);
            }
        }
        n
    }

    /// Number of non-boundary volumes around the vertex of `d`.
    pub fn vertex_volume_degree(&self, d: Dart) -> usize {
        let darts = self.map.orbit_darts(Orbit::Vertex, d);
        let mut seen = VisitedDarts::new(&self.map);
        let mut n = 0;
        for x in darts {
            if seen.contains(x) {
                continue;
            }
            if !self.map.is_boundary_marked(x) {
                n += 1;
            }
            for y in self.map.orbit_darts(Orbit::Volume, x) {
                seen.insert(y);
            }
        }
        n
    }

    /// Number of non-boundary volumes around the edge of `d`.
    pub fn edge_degree(&self, d: Dart) -> usize {
        let mut n = 0;
        let mut x = d;
        let mut steps = 0usize;
        loop {
            if !self.map.is_boundary_marked(x) {
                n += 1;
            }
            let x2 = self.map.phi2(x);
            if x2 == x || self.map.phi3(x2) == x2 {
                break;
            }
            x = self.map.phi3(x2);
            steps += 1;
            if x == d || steps > self.map.nb_darts() {
                break;
            }
        }
        n
    }

    pub fn face_degree(&self, d: Dart) -> usize {
        self.map.cycle_degree(d)
    }

    pub fn same_vertex(&self, d: Dart, e: Dart) -> bool {
        self.map.same_orbit(Orbit::Vertex, d, e)
    }

    pub fn same_oriented_face(&self, d: Dart, e: Dart) -> bool {
        self.map.same_cycle(d, e)
    }

    pub fn is_boundary_vertex(&self, d: Dart) -> bool {
        self.map.is_boundary_orbit(Orbit::Vertex, d)
    }

    pub fn is_boundary_edge(&self, d: Dart) -> bool {
        self.map.is_boundary_orbit(Orbit::Edge, d)
    }

    /// `true` if the face of `d` faces the boundary (or is unsewn).
    pub fn is_boundary_face(&self, d: Dart) -> bool {
        let e = self.map.phi3(d);
        e == d || self.map.is_boundary_marked(d) || self.map.is_boundary_marked(e)
    }

    /// `true` if some face of the volume of `d` faces the boundary.
    pub fn is_boundary_volume(&self, d: Dart) -> bool {
        self.map.foreach_dart_of_orbit(Orbit::Volume, d, |x| {
            let y = self.map.phi3(x);
            y == x || self.map.is_boundary_marked(y)
        })
    }

    /// `true` if some edge of the face of `d` touches the boundary.
    pub fn has_boundary_edge(&self, d: Dart) -> bool {
        self.map
            .foreach_dart_of_orbit(Orbit::Face2, d, |x| self.map.find_boundary_face_of_edge(x).is_some())
    }

    /// Boundary dart around the edge of `d`.
    pub fn find_boundary_face_of_edge(&self, d: Dart) -> Option<Dart> {
        self.map.find_boundary_face_of_edge(d)
    }
}
