//! Combinatorial-map topology.
//!
//! This module provides darts, orbits and the maps themselves:
//! - [`GenericMap`] owns darts, relations, marks and embeddings for every
//!   dimension
//! - [`Map1`], [`Map2`] and [`Map3`] add the operators of their dimension
//! - markers give scoped, exclusive use of one mark bit
//!
//! Most users will build a [`Map2`] or [`Map3`] and walk it with the
//! traversors of [`crate::algs::traversor`].

pub mod dart;
pub mod embedding;
pub mod generic_map;
pub mod map1;
pub mod map2;
pub mod map3;
pub mod marker;
pub mod orbit;
pub mod validation;

pub use dart::Dart;
pub use generic_map::{AttributeHandle, CombinatorialMap, EMBNULL, GenericMap, MapConfig, MapKind};
pub use map1::Map1;
pub use map2::Map2;
pub use map3::Map3;
pub use marker::{
    CellMarker, CellMarkerNoUnmark, CellMarkerStore, DartMarker, DartMarkerNoUnmark, DartMarkerStore,
    Marker,
};
pub use orbit::Orbit;
