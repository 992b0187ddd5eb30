#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-cmap
//!
//! mesh-cmap is a topological kernel for polygonal surface and polyhedral
//! volume meshes based on oriented combinatorial maps. Meshes are made of
//! darts linked by the relations `phi1` (next dart in a face), `phi2`
//! (opposite dart across an edge) and `phi3` (opposite dart across a face).
//! Vertices, edges, faces and volumes are orbits of darts under those
//! relations.
//!
//! ## Features
//! - [`Map1`](topology::map1::Map1), [`Map2`](topology::map2::Map2) and
//!   [`Map3`](topology::map3::Map3) with the usual sewing and surgery
//!   operators (cut, split, merge, collapse, flip, close holes)
//! - Synthetic boundary faces/volumes instead of null neighbours
//! - Reference-counted per-cell attributes with automatic embedding repair
//!   after every topological operation
//! - Scoped dart and cell markers over a bounded per-thread bit pool
//! - Exactly-once cell traversors with composable selectors
//! - A binary file format and an optional `rayon` traversal helper
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! mesh-cmap = "0.1"
//! # features = ["rayon"]
//! ```
//!
//! ```
//! use mesh_cmap::prelude::*;
//!
//! let mut map = Map2::new();
//! let a = map.new_face(3)?;
//! let b = map.new_face(3)?;
//! map.sew_faces(a, b)?;
//! assert_eq!(TraversorF::new(&map)?.count(), 2);
//! assert_eq!(TraversorE::new(&map)?.count(), 5);
//! # Ok::<(), MapError>(())
//! ```

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod io;
pub mod map_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use map_error::MapError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    #[cfg(feature = "rayon")]
    pub use crate::algs::parallel::par_foreach_cell;
    pub use crate::algs::selector::Selector;
    pub use crate::algs::traversor::{TraversorCell, TraversorE, TraversorF, TraversorV, TraversorW};
    pub use crate::data::registry::register_attribute_type;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::io::binary::{load_map, save_map, AnyMap};
    pub use crate::map_error::MapError;
    pub use crate::topology::dart::Dart;
    pub use crate::topology::generic_map::{
        AttributeHandle, CombinatorialMap, EMBNULL, GenericMap, MapConfig, MapKind,
    };
    pub use crate::topology::map1::Map1;
    pub use crate::topology::map2::Map2;
    pub use crate::topology::map3::Map3;
    pub use crate::topology::marker::{
        CellMarker, CellMarkerNoUnmark, CellMarkerStore, DartMarker, DartMarkerNoUnmark,
        DartMarkerStore, Marker,
    };
    pub use crate::topology::orbit::Orbit;
}
