//! Data module: attribute containers, typed columns and mark bits.
//!
//! Everything a map stores per dart or per cell lives in an
//! [`AttributeContainer`]: a table of reference-counted lines holding any
//! number of typed columns plus one mark column per thread slot.

pub mod attribute_container;
pub mod marker_set;
pub mod multi_vector;
pub mod registry;

pub use attribute_container::AttributeContainer;
pub use marker_set::{Mark, MarkColumn, MarkerSet, NB_MARKS};
pub use multi_vector::{AttributeColumn, AttributeMultiVector, AttributeValue};
pub use registry::{is_registered, register_attribute_type};
