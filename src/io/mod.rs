//! Map persistence.
//!
//! [`binary`] reads and writes whole maps (topology, embeddings, boundary
//! marks and every attribute column) in a single self-describing file.

pub mod binary;

pub use binary::{AnyMap, load_map, load_map_from_file, save_map, save_map_to_file};
