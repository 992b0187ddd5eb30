mod util;
use mesh_cmap::prelude::*;
use proptest::prelude::*;
use util::*;

#[test]
fn single_quad() {
    let mut map = Map2::new();
    let d = map.new_face(4).unwrap();
    assert_eq!(cell_counts(&map), (4, 4, 1));
    assert_eq!(map.vertex_degree(d), 2);
    assert!(map.is_boundary_vertex(d));
    assert!(map.is_boundary_face(d));
    assert!(map.check());
}

#[test]
fn two_sewn_triangles() {
    let (map, a, b) = two_triangles();
    assert_eq!(map.nb_darts(), 10);
    assert_eq!(cell_counts(&map), (4, 5, 2));
    assert_eq!(map.phi2(a), b);
    assert!(!map.is_boundary_edge(a));
    assert_eq!(map.volume_degree(a), 2);
    assert!(map.is_triangular());
    assert!(map.check());
}

#[test]
fn collapse_outer_edge_removes_degenerate_face() {
    let (mut map, a, _) = two_triangles();
    let kept = map.collapse_edge(map.phi1(a), true).unwrap();
    assert!(kept.is_some());
    assert_eq!(TraversorV::new(&map).unwrap().count(), 3);
    assert_eq!(TraversorF::new(&map).unwrap().count(), 1);
    assert!(map.is_triangular());
    assert!(map.check());
}

#[test]
fn grid_counts_follow_euler() {
    let (map, quads) = quad_grid(3, 2);
    let (v, e, f) = cell_counts(&map);
    assert_eq!((v, e, f), (12, 17, 6));
    assert_eq!(v as isize - e as isize + f as isize, 1);
    let center = map.phi1(map.phi1(quads[0]));
    assert_eq!(map.vertex_degree(center), 4);
    assert!(!map.is_boundary_vertex(center));
    assert!(map.find_boundary_edge_of_vertex(center).is_none());
    assert!(map.find_boundary_edge_of_vertex(quads[0]).is_some());
    assert!(map.check());
}

#[test]
fn cut_edge_adds_degree_two_vertex() {
    let (mut map, quads) = quad_grid(2, 1);
    let d = map.phi1(quads[0]);
    let before = cell_counts(&map);
    let nd = map.cut_edge(d).unwrap();
    assert_eq!(map.phi1(d), nd);
    assert_eq!(map.vertex_degree(nd), 2);
    let (v, e, f) = cell_counts(&map);
    assert_eq!((v, e, f), (before.0 + 1, before.1 + 1, before.2));
    assert_eq!(map.face_degree(d), 5);
    assert_eq!(map.face_degree(map.phi2(d)), 5);
    assert!(map.check());

    assert!(map.uncut_edge(d).unwrap());
    assert_eq!(cell_counts(&map), before);
    assert!(map.check());
}

#[test]
fn uncut_refuses_real_vertices() {
    let (mut map, quads) = quad_grid(2, 2);
    let d = quads[0];
    let before = map.nb_darts();
    assert!(!map.uncut_edge(d).unwrap());
    assert_eq!(map.nb_darts(), before);
}

#[test]
fn split_then_merge_face() {
    let mut map = Map2::new();
    let d = map.new_face(4).unwrap();
    let e = map.phi1(map.phi1(d));
    let x = map.split_face(d, e).unwrap();
    assert_eq!(cell_counts(&map), (4, 5, 2));
    assert_eq!(map.face_degree(d), 3);
    assert_eq!(map.face_degree(e), 3);
    assert!(!map.same_oriented_face(d, e));
    assert!(map.same_oriented_face(d, x));
    assert!(map.merge_faces(x).unwrap());
    assert_eq!(cell_counts(&map), (4, 4, 1));
    assert!(map.check());
}

#[test]
fn split_face_preconditions() {
    let (mut map, a, b) = two_triangles();
    assert!(matches!(
        map.split_face(a, b),
        Err(MapError::PreconditionViolated { op: "split_face", .. })
    ));
    assert!(map.split_face(a, a).is_err());
    let boundary = map.phi2(map.phi1(a));
    assert!(map.split_face(boundary, map.phi1(map.phi1(boundary))).is_err());
    assert!(map.check());
}

#[test]
fn merge_refuses_boundary_edges() {
    let (mut map, a, _) = two_triangles();
    assert!(!map.merge_faces(map.phi1(a)).unwrap());
    assert_eq!(TraversorF::new(&map).unwrap().count(), 2);
}

#[test]
fn delete_inner_vertex_merges_its_faces() {
    let (mut map, quads) = quad_grid(2, 2);
    let center = map.phi1(map.phi1(quads[0]));
    assert_eq!(cell_counts(&map), (9, 12, 4));
    assert!(map.delete_vertex(center).unwrap());
    assert_eq!(cell_counts(&map), (8, 8, 1));
    assert_eq!(map.face_degree(quads[0]), 8);
    assert!(map.check());
}

#[test]
fn delete_boundary_vertex_is_refused() {
    let (mut map, quads) = quad_grid(2, 2);
    assert!(!map.delete_vertex(quads[0]).unwrap());
    assert_eq!(cell_counts(&map), (9, 12, 4));
}

#[test]
fn split_inner_vertex() {
    let (mut map, quads) = quad_grid(2, 2);
    let d = map.phi1(map.phi1(quads[0]));
    let e = map.alpha1(map.alpha1(d));
    assert!(map.same_vertex(d, e));
    map.split_vertex(d, e).unwrap();
    assert!(!map.same_vertex(d, e));
    assert_eq!(map.vertex_degree(d) + map.vertex_degree(e), 6);
    assert_eq!(cell_counts(&map), (10, 13, 4));
    assert!(map.check());
}

#[test]
fn flip_moves_the_diagonal() {
    let (mut map, a, b) = two_triangles();
    let old_origin = map.phi1(b);
    let degrees = |m: &Map2| {
        let mut v: Vec<usize> = TraversorV::new(m).unwrap().map(|d| m.vertex_degree(d)).collect();
        v.sort_unstable();
        v
    };
    assert_eq!(degrees(&map), vec![2, 2, 3, 3]);
    assert!(map.flip_edge(a).unwrap());
    assert_eq!(degrees(&map), vec![2, 2, 3, 3]);
    assert!(!map.same_vertex(a, old_origin));
    assert!(map.is_triangular());
    assert_eq!(cell_counts(&map), (4, 5, 2));
    assert!(map.check());
    assert!(map.flip_back_edge(a).unwrap());
    assert!(map.same_vertex(a, old_origin));
    assert!(map.check());
    assert!(!map.flip_edge(map.phi1(a)).unwrap());
}

#[test]
fn sew_unsew_round_trip() {
    let (mut map, a, b) = two_triangles();
    map.unsew_faces(a).unwrap();
    assert_eq!(map.nb_darts(), 12);
    assert_eq!(cell_counts(&map), (6, 6, 2));
    assert!(map.is_boundary_edge(a));
    assert!(matches!(
        map.unsew_faces(a),
        Err(MapError::PreconditionViolated { op: "unsew_faces", .. })
    ));
    assert!(map.check());

    map.sew_faces(a, b).unwrap();
    assert_eq!(map.nb_darts(), 10);
    assert_eq!(cell_counts(&map), (4, 5, 2));
    assert!(map.sew_faces(a, b).is_err());
    assert!(map.check());
}

#[test]
fn close_open_face() {
    let mut map = Map2::new();
    let d = map.new_face_with(5, false).unwrap();
    assert_eq!(map.phi2(d), d);
    assert_eq!(map.close_map().unwrap(), 1);
    assert!(map.is_boundary_marked(map.phi2(d)));
    assert_eq!(map.nb_darts(), 10);
    assert_eq!(cell_counts(&map), (5, 5, 1));
    assert_eq!(map.close_map().unwrap(), 0);
    assert!(map.check());
}

#[test]
fn delete_face_leaves_boundary() {
    let (mut map, a, b) = two_triangles();
    map.delete_face(a).unwrap();
    assert_eq!(TraversorF::new(&map).unwrap().count(), 1);
    assert!(map.is_boundary_edge(b));
    assert!(map.check());
    map.delete_cc(b).unwrap();
    assert_eq!(map.nb_darts(), 0);
}

#[test]
fn invalid_darts_are_reported() {
    let (mut map, _, _) = two_triangles();
    assert!(matches!(
        map.cut_edge(Dart::new(500)),
        Err(MapError::InvalidHandle { .. })
    ));
    assert!(map.check());
}

#[derive(Clone, Copy, Debug)]
enum Op {
    Cut,
    Split,
    Merge,
    Flip,
    DeleteVertex,
}

fn op_strategy() -> impl Strategy<Value = (Op, usize)> {
    (
        prop_oneof![
            Just(Op::Cut),
            Just(Op::Split),
            Just(Op::Merge),
            Just(Op::Flip),
            Just(Op::DeleteVertex),
        ],
        0usize..1000,
    )
}

/// `true` if every face around the vertex of `d` is a different face.
fn faces_around_distinct(map: &Map2, d: Dart) -> bool {
    let spokes = map.generic().orbit_darts(Orbit::Vertex, d);
    spokes
        .iter()
        .enumerate()
        .all(|(i, &x)| spokes[i + 1..].iter().all(|&y| !map.same_oriented_face(x, y)))
}

fn apply(map: &mut Map2, op: Op, pick: usize) {
    let darts = inner_darts(map);
    if darts.is_empty() {
        return;
    }
    let d = darts[pick % darts.len()];
    match op {
        Op::Cut => {
            map.cut_edge(d).unwrap();
        }
        Op::Split => {
            if map.face_degree(d) >= 4 {
                let e = map.phi1(map.phi1(d));
                map.split_face(d, e).unwrap();
            }
        }
        Op::Merge => {
            map.merge_faces(d).unwrap();
        }
        Op::Flip => {
            let e = map.phi2(d);
            if !map.is_boundary_marked(e) && map.face_degree(d) == 3 && map.face_degree(e) == 3 {
                map.flip_edge(d).unwrap();
            }
        }
        Op::DeleteVertex => {
            if map.vertex_degree(d) >= 3 && faces_around_distinct(map, d) {
                map.delete_vertex(d).unwrap();
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_surgery_keeps_map_valid(ops in prop::collection::vec(op_strategy(), 1..24)) {
        let (mut map, _) = quad_grid(3, 3);
        map.init_orbit_embedding(Orbit::Vertex);
        for (op, pick) in ops {
            apply(&mut map, op, pick);
            prop_assert!(map.check(), "{op:?} broke the relations");
            prop_assert!(map.generic().validate_embeddings().is_ok(), "{op:?} broke the embedding");
            let vertices = TraversorV::new(&map).unwrap().count();
            prop_assert_eq!(vertices, map.generic().container(Orbit::Vertex).size());
            let edges = TraversorE::new(&map).unwrap().count();
            prop_assert_eq!(edges, map.generic().nb_cells(Orbit::Edge));
        }
    }
}
