//! Algorithms on top of the topology: traversors, selectors and the
//! optional parallel helpers.

pub mod selector;
pub mod traversor;

#[cfg(feature = "rayon")]
#[cfg_attr(docsrs, doc(cfg(feature = "rayon")))]
pub mod parallel;

pub use selector::Selector;
pub use traversor::{
    TraversorCell, TraversorE, TraversorF, TraversorV, TraversorW, count_cells, foreach_cell,
    foreach_dart,
};
