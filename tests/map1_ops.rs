mod util;
use mesh_cmap::prelude::*;

#[test]
fn cycles_are_faces() {
    let mut map = Map1::new();
    let a = map.new_cycle(3).unwrap();
    let b = map.new_cycle(5).unwrap();
    assert_eq!(map.nb_darts(), 8);
    assert_eq!(TraversorF::new(&map).unwrap().count(), 2);
    assert_eq!(TraversorV::new(&map).unwrap().count(), 8);
    assert_eq!(TraversorE::new(&map).unwrap().count(), 8);
    assert!(map.is_cycle_triangle(a));
    assert!(!map.is_cycle_triangle(b));
    assert!(!map.same_cycle(a, b));
    assert_eq!(map.generic().orbit_size(Orbit::Face, b), 5);
    assert!(map.check());
}

#[test]
fn split_copies_face_attributes() {
    let mut map = Map1::new();
    let d = map.new_cycle(6).unwrap();
    let area = map.add_attribute::<f64>(Orbit::Face, "area").unwrap();
    *map.attribute_mut(&area, d).unwrap() = 2.5;
    let e = map.phi1(map.phi1(map.phi1(d)));
    map.split_cycle(d, e).unwrap();
    assert_eq!(map.generic().container(Orbit::Face).size(), 2);
    assert_ne!(map.embedding(Orbit::Face, d), map.embedding(Orbit::Face, e));
    assert_eq!(map.attribute(&area, d), Some(&2.5));
    assert_eq!(map.attribute(&area, e), Some(&2.5));
    assert!(map.generic().validate_embeddings().is_ok());

    *map.attribute_mut(&area, e).unwrap() = 1.0;
    map.merge_cycles(d, e).unwrap();
    assert_eq!(map.generic().container(Orbit::Face).size(), 1);
    let merged = *map.attribute(&area, d).unwrap();
    assert!(merged == 2.5 || merged == 1.0);
    assert_eq!(map.attribute(&area, e), Some(&merged));
    assert!(map.generic().validate_embeddings().is_ok());
}

#[test]
fn new_darts_join_the_face_line() {
    let mut map = Map1::new();
    let d = map.new_cycle(3).unwrap();
    let label = map.add_attribute::<u32>(Orbit::Face, "label").unwrap();
    *map.attribute_mut(&label, d).unwrap() = 7;
    let n = map.cut_edge(d).unwrap();
    assert_eq!(map.attribute(&label, n), Some(&7));
    let (x, y) = map.split_face(d, map.phi1(map.phi1(d))).unwrap();
    assert_eq!(map.attribute(&label, x), Some(&7));
    assert_eq!(map.attribute(&label, y), Some(&7));
    assert_eq!(map.generic().container(Orbit::Face).size(), 2);
    assert!(map.generic().validate_embeddings().is_ok());
}

#[test]
fn cut_edge_copies_the_edge_value() {
    let mut map = Map1::new();
    let d = map.new_cycle(3).unwrap();
    let w = map.add_attribute::<u32>(Orbit::Edge, "weight").unwrap();
    for x in map.generic().orbit_darts(Orbit::Face, d) {
        *map.attribute_mut(&w, x).unwrap() = 7;
    }
    let n = map.cut_edge(d).unwrap();
    assert_eq!(map.attribute(&w, d), Some(&7));
    assert_eq!(map.attribute(&w, n), Some(&7));
    assert_ne!(map.embedding(Orbit::Edge, d), map.embedding(Orbit::Edge, n));
    assert_eq!(map.generic().nb_cells(Orbit::Edge), 4);
    assert_eq!(util::walked_cells(&map, Orbit::Edge), 4);
    // The halves are independent afterwards.
    *map.attribute_mut(&w, n).unwrap() = 3;
    assert_eq!(map.attribute(&w, d), Some(&7));
    assert!(map.generic().validate_embeddings().is_ok());
    assert!(map.check());
}

#[test]
fn link_and_collapse() {
    let mut map = Map1::new();
    let a = map.new_cycle(4).unwrap();
    let b = map.new_cycle(4).unwrap();
    let (x, y) = map.link_vertices(a, b).unwrap();
    assert!(map.same_cycle(a, b));
    assert_eq!(map.cycle_degree(a), 10);
    assert!(map.link_vertices(a, b).is_err());
    // Each collapse removes the dart after the one given.
    map.collapse_edge(map.phi_1(x)).unwrap();
    assert!(!map.generic().is_dart(x));
    assert!(map.generic().is_dart(y));
    map.collapse_edge(map.phi_1(y)).unwrap();
    assert_eq!(map.cycle_degree(a), 8);
    assert_eq!(map.nb_darts(), 8);
    assert!(map.check());
}

#[test]
fn reverse_twice_is_identity() {
    let mut map = Map1::new();
    let d = map.new_cycle(5).unwrap();
    let order: Vec<Dart> = map.generic().orbit_darts(Orbit::Face, d);
    map.reverse_cycle(d).unwrap();
    assert_eq!(map.phi_1(d), order[1]);
    map.reverse_cycle(d).unwrap();
    assert_eq!(map.generic().orbit_darts(Orbit::Face, d), order);
    assert!(map.check());
}

#[test]
fn delete_cycle_frees_darts() {
    let mut map = Map1::new();
    let a = map.new_cycle(3).unwrap();
    let b = map.new_cycle(4).unwrap();
    map.delete_cycle(a).unwrap();
    assert_eq!(map.nb_darts(), 4);
    assert!(map.delete_face(a).is_err());
    assert_eq!(map.cycle_degree(b), 4);
    assert!(map.check());
}
