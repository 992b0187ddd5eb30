mod util;
use mesh_cmap::io::binary::{from_bytes, to_bytes};
use mesh_cmap::io::{load_map_from_file, save_map_to_file};
use mesh_cmap::prelude::*;
use serde::{Deserialize, Serialize};
use serial_test::serial;
use util::*;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Material {
    name: String,
    density: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct NeverRegistered(u16);

fn temp_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("mesh-cmap-{}-{tag}.map", std::process::id()))
}

#[test]
#[serial]
fn surface_with_user_attribute_round_trips() {
    register_attribute_type::<Material>();
    let (mut map, quads) = quad_grid(2, 2);
    let pos = map.add_attribute::<[f64; 3]>(Orbit::Vertex, "position").unwrap();
    let mat = map.add_attribute::<Material>(Orbit::Face, "material").unwrap();
    for (i, &q) in quads.iter().enumerate() {
        *map.attribute_mut(&pos, q).unwrap() = [i as f64, 0.0, 1.0];
        *map.attribute_mut(&mat, q).unwrap() = Material {
            name: format!("m{i}"),
            density: 1.5 * i as f64,
        };
    }

    let mut buf = Vec::new();
    save_map(&map, &mut buf).unwrap();
    let back = load_map(buf.as_slice()).unwrap();
    assert_eq!(back.kind(), MapKind::Map2);
    let back = back.into_map2().unwrap();

    assert_eq!(back.nb_darts(), map.nb_darts());
    assert_eq!(cell_counts(&back), cell_counts(&map));
    assert!(back.check());
    assert!(back.generic().validate_embeddings().is_ok());
    let pos2 = back.get_attribute::<[f64; 3]>(Orbit::Vertex, "position").unwrap();
    let mat2 = back.get_attribute::<Material>(Orbit::Face, "material").unwrap();
    for &q in &quads {
        assert_eq!(back.attribute(&pos2, q), map.attribute(&pos, q));
        assert_eq!(back.attribute(&mat2, q), map.attribute(&mat, q));
        assert_eq!(back.is_boundary_marked(back.phi2(q)), map.is_boundary_marked(map.phi2(q)));
    }
}

#[test]
#[serial]
fn unregistered_type_is_reported() {
    let mut map = Map1::new();
    let d = map.new_cycle(3).unwrap();
    let h = map.add_attribute::<NeverRegistered>(Orbit::Face, "x").unwrap();
    *map.attribute_mut(&h, d).unwrap() = NeverRegistered(3);
    let bytes = to_bytes(&map).unwrap();
    assert!(matches!(
        from_bytes(&bytes),
        Err(MapError::UnknownAttributeType(name)) if name.contains("NeverRegistered")
    ));
}

#[test]
#[serial]
fn volume_map_round_trips_through_a_file() {
    let mut map = Map3::new();
    let a = map.new_hexahedron().unwrap();
    let b = map.new_tetrahedron().unwrap();
    let p = map.new_pyramid(4).unwrap();
    map.sew_volumes(a, p).unwrap();
    let _ = b;
    map.add_attribute::<f64>(Orbit::Volume, "volume").unwrap();

    let path = temp_path("volumes");
    save_map_to_file(&map, &path).unwrap();
    let back = load_map_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(back.kind(), MapKind::Map3);
    assert_eq!(
        TraversorW::new(&back).unwrap().count(),
        TraversorW::new(&map).unwrap().count()
    );
    let back = back.into_map3().unwrap();
    assert_eq!(back.phi3(a), p);
    assert!(back.check());
    assert!(back.get_attribute::<f64>(Orbit::Volume, "volume").is_ok());
    assert_eq!(
        back.generic().container(Orbit::Volume).size(),
        map.generic().container(Orbit::Volume).size()
    );
}

#[test]
fn wrong_map_kind_is_not_converted() {
    let mut map = Map1::new();
    map.new_cycle(2).unwrap();
    let back = from_bytes(&to_bytes(&map).unwrap()).unwrap();
    assert_eq!(back.kind(), MapKind::Map1);
    assert!(back.into_map2().is_none());
}

#[test]
fn missing_file_is_an_io_error() {
    let path = temp_path("does-not-exist");
    assert!(matches!(load_map_from_file(&path), Err(MapError::Io(_))));
}
