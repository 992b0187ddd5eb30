mod util;
use mesh_cmap::prelude::*;

fn counts(map: &Map3) -> (usize, usize, usize, usize) {
    (
        TraversorV::new(map).unwrap().count(),
        TraversorE::new(map).unwrap().count(),
        TraversorF::new(map).unwrap().count(),
        TraversorW::new(map).unwrap().count(),
    )
}

/// Two hexahedra glued along one quad. Returns a dart of each glued face.
fn two_hexahedra() -> (Map3, Dart, Dart) {
    let mut map = Map3::new();
    let a = map.new_hexahedron().unwrap();
    let b = map.new_hexahedron().unwrap();
    map.sew_volumes(a, b).unwrap();
    (map, a, b)
}

#[test]
fn single_hexahedron() {
    let mut map = Map3::new();
    let d = map.new_hexahedron().unwrap();
    assert_eq!(counts(&map), (8, 12, 6, 1));
    assert_eq!(map.face_degree(d), 4);
    assert!(map.is_boundary_face(d));
    assert!(map.is_boundary_vertex(d));
    assert!(map.is_boundary_volume(d));
    assert!(map.find_boundary_face_of_edge(d).is_some());
    assert!(map.check());
}

#[test]
fn glued_hexahedra() {
    let (map, a, b) = two_hexahedra();
    assert_eq!(map.nb_darts(), 2 * 48 - 8);
    assert_eq!(counts(&map), (12, 20, 11, 2));
    assert_eq!(map.phi3(a), b);
    assert!(!map.is_boundary_marked(map.phi3(a)));
    assert!(!map.is_boundary_face(a));
    assert_eq!(map.vertex_volume_degree(a), 2);
    assert_eq!(map.vertex_degree(a), 4);
    assert_eq!(map.edge_degree(a), 2);
    assert!(map.check());
}

#[test]
fn tetrahedron_and_pyramid() {
    let mut map = Map3::new();
    map.new_tetrahedron().unwrap();
    assert_eq!(counts(&map), (4, 6, 4, 1));
    let p = map.new_pyramid(4).unwrap();
    assert_eq!(map.face_degree(p), 4);
    assert_eq!(counts(&map), (4 + 5, 6 + 8, 4 + 5, 2));
    let q = map.new_prism(5).unwrap();
    assert_eq!(map.face_degree(q), 5);
    assert_eq!(TraversorW::new(&map).unwrap().count(), 3);
    assert!(map.check());
}

#[test]
fn constructor_preconditions() {
    let mut map = Map3::new();
    assert!(matches!(
        map.new_prism(2),
        Err(MapError::PreconditionViolated { op: "new_prism", .. })
    ));
    assert!(map.new_pyramid(1).is_err());
    assert_eq!(map.nb_darts(), 0);
}

#[test]
fn sew_requires_matching_faces() {
    let mut map = Map3::new();
    let t = map.new_tetrahedron().unwrap();
    let h = map.new_hexahedron().unwrap();
    assert!(matches!(
        map.sew_volumes(t, h),
        Err(MapError::PreconditionViolated { op: "sew_volumes", .. })
    ));
    assert!(map.sew_volumes(h, map.phi1(h)).is_err());
    assert!(map.check());
}

#[test]
fn unsew_restores_two_shells() {
    let (mut map, a, _) = two_hexahedra();
    map.unsew_volumes(a).unwrap();
    assert_eq!(map.nb_darts(), 2 * 48);
    assert_eq!(counts(&map), (16, 24, 12, 2));
    assert!(map.is_boundary_face(a));
    assert!(map.unsew_volumes(a).is_err());
    assert!(map.check());
}

#[test]
fn split_face_of_a_hexahedron() {
    let mut map = Map3::new();
    let d = map.new_hexahedron().unwrap();
    let e = map.phi1(map.phi1(d));
    map.split_face(d, e).unwrap();
    assert_eq!(counts(&map), (8, 13, 7, 1));
    assert_eq!(map.face_degree(d), 3);
    assert_eq!(map.face_degree(e), 3);
    assert!(map.check());
}

#[test]
fn merge_glued_volumes() {
    let (mut map, a, _) = two_hexahedra();
    assert!(map.merge_volumes(a).unwrap());
    assert_eq!(counts(&map), (12, 20, 10, 1));
    assert!(map.check());
}

#[test]
fn merge_refuses_boundary_faces() {
    let mut map = Map3::new();
    let d = map.new_hexahedron().unwrap();
    assert!(!map.merge_volumes(d).unwrap());
    assert_eq!(counts(&map), (8, 12, 6, 1));
}

#[test]
fn delete_one_of_two_volumes() {
    let (mut map, a, b) = two_hexahedra();
    map.delete_volume(map.phi1(a)).unwrap();
    assert_eq!(map.nb_darts(), 48);
    assert_eq!(counts(&map), (8, 12, 6, 1));
    assert!(map.is_boundary_face(b));
    assert!(map.check());
}

#[test]
fn cut_shared_edge_in_every_volume() {
    let (mut map, a, b) = two_hexahedra();
    let n = map.cut_edge(a).unwrap();
    assert_eq!(map.phi1(a), n);
    assert_eq!(map.vertex_degree(n), 2);
    assert_eq!(map.face_degree(a), 5);
    assert_eq!(map.face_degree(b), 5);
    assert_eq!(counts(&map), (13, 21, 11, 2));
    assert!(map.check());
    assert!(map.uncut_edge(a).unwrap());
    assert_eq!(counts(&map), (12, 20, 11, 2));
    assert!(map.check());
}

#[test]
fn delete_boundary_vertex_is_refused() {
    let (mut map, a, _) = two_hexahedra();
    assert_eq!(map.delete_vertex(a).unwrap(), None);
    assert_eq!(counts(&map), (12, 20, 11, 2));
}

/// Four raw triangles sewn into a tetrahedron with nothing around it.
/// Returns a dart of the base and a dart leaving the apex.
fn raw_tetrahedron(map: &mut Map3) -> (Dart, Dart) {
    let faces: Vec<Dart> = (0..4).map(|_| map.new_face(3).unwrap()).collect();
    // The base is sewn to the three sides, the sides to each other.
    let base = faces[0];
    let mut b = base;
    for &side in &faces[1..] {
        map.sew_faces(b, side).unwrap();
        b = map.phi_1(b);
    }
    for i in 1..4 {
        let s = faces[i];
        let next = faces[if i == 3 { 1 } else { i + 1 }];
        map.sew_faces(map.phi1(s), map.phi_1(next)).unwrap();
    }
    (base, map.phi_1(faces[1]))
}

#[test]
fn raw_faces_need_closing() {
    let mut map = Map3::new();
    raw_tetrahedron(&mut map);
    assert_eq!(map.close_map().unwrap(), 1);
    assert_eq!(map.nb_darts(), 24);
    assert_eq!(counts(&map), (4, 6, 4, 1));
    assert!(map.check());
}

#[test]
fn collapse_removes_flattened_glued_tetrahedra() {
    let mut map = Map3::new();
    let a = map.new_tetrahedron().unwrap();
    let b = map.new_tetrahedron().unwrap();
    map.sew_volumes(a, b).unwrap();
    map.init_orbit_embedding(Orbit::Vertex);
    assert_eq!(counts(&map), (5, 9, 7, 2));

    // The edge of `a` lies in both tetrahedra: each one flattens and goes
    // away, and the boundary closing them goes with it.
    let res = map.collapse_edge(a, true).unwrap();
    assert!(map.check());
    assert!(map.generic().validate_embeddings().is_ok());
    assert_eq!(TraversorW::new(&map).unwrap().count(), 0);
    assert_eq!(map.nb_darts(), 0);
    assert_eq!(res, None);
}

#[test]
fn split_vertex_around_glued_tetrahedra() {
    let mut map = Map3::new();
    let a = map.new_tetrahedron().unwrap();
    let b = map.new_tetrahedron().unwrap();
    map.sew_volumes(a, b).unwrap();
    let b = map.phi3(a);
    map.add_attribute::<u32>(Orbit::Vertex, "id").unwrap();
    assert_eq!(counts(&map), (5, 9, 7, 2));

    // One dart per volume around the origin of `b`: the first tetrahedron,
    // the second, then the boundary.
    let p = map.phi1(a);
    let q = map.phi2(map.phi_1(b));
    let r = map.phi2(map.phi3(q));
    assert!(map.is_boundary_marked(r));
    assert!(!map.is_boundary_marked(q));
    map.split_vertex(&[p, q, r]).unwrap();

    assert!(map.check());
    assert_eq!(counts(&map), (6, 10, 7, 2));
    assert!(!map.same_vertex(p, map.phi2(a)));
    assert_eq!(map.generic().nb_cells(Orbit::Vertex), 6);
    assert_eq!(util::walked_cells(&map, Orbit::Vertex), 6);
    assert!(map.generic().validate_embeddings().is_ok());
}

#[test]
fn split_vertex_needs_a_closed_loop() {
    let (mut map, a, _) = two_hexahedra();
    let p = map.phi1(a);
    assert!(matches!(
        map.split_vertex(&[p]),
        Err(MapError::PreconditionViolated { op: "split_vertex", .. })
    ));
    assert_eq!(counts(&map), (12, 20, 11, 2));
}

#[test]
fn delete_interior_vertex_merges_its_volumes() {
    let mut map = Map3::new();
    let (base1, apex) = raw_tetrahedron(&mut map);
    let (base2, _) = raw_tetrahedron(&mut map);
    map.sew_volumes_with(base1, base2, false).unwrap();
    // Cap the outside with a real volume, leaving no boundary at all.
    assert_eq!(map.close_hole(apex, false).unwrap(), 6);
    map.add_attribute::<u32>(Orbit::Vertex, "id").unwrap();
    assert_eq!(counts(&map), (5, 9, 7, 3));
    assert!(!map.is_boundary_vertex(apex));
    assert_eq!(map.vertex_volume_degree(apex), 2);

    let r = map.delete_vertex(apex).unwrap().expect("interior vertex is deleted");
    assert!(map.generic().is_dart(r));
    assert!(!map.generic().is_dart(apex));
    assert!(map.check());
    assert_eq!(counts(&map), (4, 6, 4, 2));
    assert_eq!(map.generic().nb_cells(Orbit::Vertex), 4);
    assert_eq!(util::walked_cells(&map, Orbit::Vertex), 4);
    assert!(map.generic().validate_embeddings().is_ok());
    // Only the boundary mark is still leased.
    assert_eq!(map.generic().nb_leased_marks(Orbit::Dart, 0), 1);
    assert_eq!(map.generic().nb_leased_marks(Orbit::Vertex, 0), 0);
}
