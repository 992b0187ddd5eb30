#![allow(dead_code)]
use mesh_cmap::prelude::*;

/// Two triangles sewn along one edge. Returns the map and the two sewn darts.
pub fn two_triangles() -> (Map2, Dart, Dart) {
    let mut map = Map2::new();
    let a = map.new_face(3).unwrap();
    let b = map.new_face(3).unwrap();
    map.sew_faces(a, b).unwrap();
    (map, a, b)
}

/// A `w x h` grid of quads sewn into a disk. Returns the map and one dart
/// per quad, row by row; each dart runs along the bottom side of its quad.
pub fn quad_grid(w: usize, h: usize) -> (Map2, Vec<Dart>) {
    let mut map = Map2::new();
    let quads: Vec<Dart> = (0..w * h).map(|_| map.new_face(4).unwrap()).collect();
    for j in 0..h {
        for i in 0..w {
            let q = quads[j * w + i];
            if i + 1 < w {
                let r = quads[j * w + i + 1];
                let right = map.phi1(q);
                let left = map.phi_1(r);
                map.sew_faces(right, left).unwrap();
            }
            if j + 1 < h {
                let t = quads[(j + 1) * w + i];
                let top = map.phi1(map.phi1(q));
                map.sew_faces(top, t).unwrap();
            }
        }
    }
    (map, quads)
}

/// Live darts outside the boundary, in storage order.
pub fn inner_darts<M: CombinatorialMap>(map: &M) -> Vec<Dart> {
    map.generic()
        .darts()
        .filter(|&d| !map.is_boundary_marked(d))
        .collect()
}

/// `(V, E, F)` counted by the traversors.
pub fn cell_counts<M: CombinatorialMap>(map: &M) -> (usize, usize, usize) {
    (
        TraversorV::new(map).unwrap().count(),
        TraversorE::new(map).unwrap().count(),
        TraversorF::new(map).unwrap().count(),
    )
}

/// Number of cells of `orbit` found by walking the darts, whatever the
/// embedding says.
pub fn walked_cells<M: CombinatorialMap>(map: &M, orbit: Orbit) -> usize {
    let mut seen = DartMarkerStore::new(map).unwrap();
    let mut n = 0;
    for d in map.generic().darts() {
        if !seen.is_marked(d) {
            n += 1;
            seen.mark_orbit(orbit, d);
        }
    }
    n
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
