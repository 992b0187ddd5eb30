mod util;
use mesh_cmap::data::NB_MARKS;
use mesh_cmap::prelude::*;
use util::*;

#[test]
fn cell_marker_bit_is_reused_clean() {
    let (mut map, quads) = quad_grid(2, 2);
    map.init_orbit_embedding(Orbit::Vertex);
    let center = map.phi1(map.phi1(quads[0]));
    let spokes = map.generic().orbit_darts(Orbit::Vertex, center);
    assert_eq!(spokes.len(), 4);
    {
        let mut cm = CellMarker::new(&map, Orbit::Vertex).unwrap();
        assert_eq!(map.generic().nb_leased_marks(Orbit::Vertex, 0), 1);
        cm.mark(center);
        assert!(spokes.iter().all(|&d| cm.is_marked(d)));
        assert!(!cm.is_marked(quads[0]));
    }
    assert_eq!(map.generic().nb_leased_marks(Orbit::Vertex, 0), 0);
    let cm = CellMarker::new(&map, Orbit::Vertex).unwrap();
    assert!(spokes.iter().all(|&d| !cm.is_marked(d)));
}

#[test]
fn cell_marker_without_embedding_marks_darts() {
    let (map, quads) = quad_grid(2, 1);
    let before = map.generic().nb_leased_marks(Orbit::Dart, 0);
    let mut cm = CellMarker::new(&map, Orbit::Face).unwrap();
    assert_eq!(map.generic().nb_leased_marks(Orbit::Dart, 0), before + 1);
    assert_eq!(map.generic().nb_leased_marks(Orbit::Face, 0), 0);
    cm.mark(quads[0]);
    let mut x = quads[0];
    for _ in 0..4 {
        assert!(cm.is_marked(x));
        x = map.phi1(x);
    }
    assert!(!cm.is_marked(quads[1]));
    cm.unmark(map.phi1(quads[0]));
    assert!(!cm.is_marked(quads[0]));
}

#[test]
fn dart_pool_exhaustion() {
    let map = Map2::new();
    // Slot 0 of the dart pool already holds the boundary mark.
    let held: Vec<DartMarker> = (1..NB_MARKS).map(|_| DartMarker::new(&map).unwrap()).collect();
    assert!(matches!(
        DartMarker::new(&map),
        Err(MapError::MarkPoolExhausted { orbit: Orbit::Dart, thread: 0 })
    ));
    drop(held);
    assert!(DartMarker::new(&map).is_ok());
}

#[test]
fn cell_pool_exhaustion() {
    let mut map = Map2::new();
    map.new_face(3).unwrap();
    map.init_orbit_embedding(Orbit::Edge);
    let held: Vec<CellMarkerStore> = (0..NB_MARKS)
        .map(|_| CellMarkerStore::new(&map, Orbit::Edge).unwrap())
        .collect();
    assert_eq!(held.len(), NB_MARKS as usize);
    assert!(matches!(
        CellMarker::new(&map, Orbit::Edge),
        Err(MapError::MarkPoolExhausted { orbit: Orbit::Edge, .. })
    ));
}

#[test]
fn thread_slots_have_their_own_pools() {
    let mut map = Map2::new();
    let d = map.new_face(4).unwrap();
    assert!(matches!(
        DartMarker::on_thread(&map, 1),
        Err(MapError::InvalidThreadSlot { thread: 1, slots: 1 })
    ));
    let slot = map.add_thread_marker();
    assert_eq!(slot, 1);
    let mut a = DartMarker::new(&map).unwrap();
    let b = DartMarker::on_thread(&map, slot).unwrap();
    assert_eq!(map.generic().nb_leased_marks(Orbit::Dart, 1), 1);
    a.mark(d);
    assert!(a.is_marked(d));
    assert!(!b.is_marked(d));
}

#[test]
fn store_marker_tracks_what_it_marked() {
    let (map, a, _) = two_triangles();
    let mut m = DartMarkerStore::new(&map).unwrap();
    m.mark_orbit(Orbit::Face, a);
    let mut marked: Vec<Dart> = m.marked_darts().collect();
    marked.dedup();
    assert_permutation(&marked, &map.generic().orbit_darts(Orbit::Face, a));
    m.unmark_all();
    assert!(!m.is_marked(a));
    assert_eq!(m.marked_darts().count(), 0);
}

#[test]
fn no_unmark_marker_is_cleaned_by_caller() {
    let (map, a, b) = two_triangles();
    {
        let mut m = DartMarkerNoUnmark::new(&map).unwrap();
        m.mark_orbit(Orbit::Edge, a);
        assert!(m.is_marked(b));
        m.unmark_orbit(Orbit::Edge, a);
    }
    let m = DartMarker::new(&map).unwrap();
    assert!(!m.is_marked(a));
    assert!(!m.is_marked(b));
}

#[test]
fn mark_all_then_drop_leaves_clean_column() {
    let (map, a, _) = two_triangles();
    {
        let mut m = CellMarkerNoUnmark::new(&map, Orbit::Vertex).unwrap();
        m.mark_all();
        assert!(m.is_marked(a));
        m.unmark_all();
    }
    {
        let mut m = DartMarker::new(&map).unwrap();
        m.mark_all();
        assert!(map.generic().darts().all(|d| m.is_marked(d)));
    }
    let m = DartMarker::new(&map).unwrap();
    assert!(map.generic().darts().all(|d| !m.is_marked(d)));
    // The boundary mark survives other markers being cleared.
    assert!(map.is_boundary_marked(map.phi2(map.phi1(a))));
}

#[test]
fn traversal_with_marker_selector() {
    let (map, quads) = quad_grid(3, 1);
    let mut done = CellMarker::new(&map, Orbit::Face).unwrap();
    done.mark(quads[1]);
    let todo: Vec<Dart> = TraversorF::new(&map)
        .unwrap()
        .with_selector(Selector::unmarked(&done))
        .collect();
    assert_eq!(todo.len(), 2);
    assert!(todo.iter().all(|&d| !done.is_marked(d)));
}
